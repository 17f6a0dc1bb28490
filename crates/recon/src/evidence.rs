use std::fmt::Write;

use crate::model::{ComparisonOutcome, OutcomeBucket, ReconResult, ReconSummary};

/// Count outcomes per bucket.
pub fn compute_summary(outcomes: &[ComparisonOutcome], skipped_provenance: usize) -> ReconSummary {
    let mut summary = ReconSummary {
        total: outcomes.len(),
        skipped_provenance,
        ..ReconSummary::default()
    };

    for o in outcomes {
        match o.bucket {
            OutcomeBucket::Confirmed => summary.confirmed += 1,
            OutcomeBucket::Diverged => summary.diverged += 1,
            OutcomeBucket::ExtractionError => summary.extraction_errors += 1,
            OutcomeBucket::Unmatched => summary.unmatched += 1,
        }
    }

    summary
}

/// Labels of one bucket, in the order the outcomes were produced.
pub fn bucket_labels(outcomes: &[ComparisonOutcome], bucket: OutcomeBucket) -> Vec<String> {
    outcomes
        .iter()
        .filter(|o| o.bucket == bucket)
        .map(ComparisonOutcome::label)
        .collect()
}

/// Human-readable four-section report.
///
/// ```text
/// Confirmed: 1
///   s00009809/thp00001234
/// Diverged: 0
/// ...
/// ```
pub fn render_text(result: &ReconResult) -> String {
    let mut out = String::new();
    for bucket in OutcomeBucket::ALL {
        let labels = bucket_labels(&result.outcomes, bucket);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}: {}", bucket.title(), labels.len());
        for label in labels {
            let _ = writeln!(out, "  {label}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReconMeta;

    fn outcome(bucket: OutcomeBucket, cas: &str, record: Option<(&str, &str)>) -> ComparisonOutcome {
        let mut o = ComparisonOutcome::unmatched(cas);
        o.bucket = bucket;
        if let Some((species, rec)) = record {
            o.species_id = Some(species.into());
            o.record_id = Some(rec.into());
        }
        o
    }

    fn result(outcomes: Vec<ComparisonOutcome>) -> ReconResult {
        ReconResult {
            meta: ReconMeta {
                reference_bibliography: "b00014727".into(),
                threshold: 1e-3,
                bulk_species: 0,
                engine_version: "test".into(),
                run_at: "2026-01-01T00:00:00Z".into(),
            },
            summary: compute_summary(&outcomes, 0),
            outcomes,
        }
    }

    #[test]
    fn summary_counts() {
        let outcomes = vec![
            outcome(OutcomeBucket::Confirmed, "50-00-0", Some(("s1", "thp1"))),
            outcome(OutcomeBucket::Confirmed, "50-00-0", Some(("s1", "thp2"))),
            outcome(OutcomeBucket::Diverged, "64-17-5", Some(("s2", "thp7"))),
            outcome(OutcomeBucket::Unmatched, "7732-18-5", None),
        ];
        let summary = compute_summary(&outcomes, 3);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.confirmed, 2);
        assert_eq!(summary.diverged, 1);
        assert_eq!(summary.extraction_errors, 0);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.skipped_provenance, 3);
        assert_eq!(summary.count(OutcomeBucket::Confirmed), 2);
    }

    #[test]
    fn labels_keep_insertion_order() {
        let outcomes = vec![
            outcome(OutcomeBucket::Unmatched, "9-9-9", None),
            outcome(OutcomeBucket::Confirmed, "x", Some(("s2", "thp1"))),
            outcome(OutcomeBucket::Unmatched, "1-1-1", None),
        ];
        assert_eq!(
            bucket_labels(&outcomes, OutcomeBucket::Unmatched),
            vec!["9-9-9".to_string(), "1-1-1".to_string()]
        );
    }

    #[test]
    fn text_report_has_four_sections_in_order() {
        let text = render_text(&result(vec![
            outcome(OutcomeBucket::Unmatched, "7732-18-5", None),
            outcome(OutcomeBucket::Confirmed, "50-00-0", Some(("s00009809", "thp00001234"))),
        ]));
        assert_eq!(
            text,
            "Confirmed: 1\n  s00009809/thp00001234\nDiverged: 0\nExtractionError: 0\nUnmatched: 1\n  7732-18-5\n"
        );
    }
}
