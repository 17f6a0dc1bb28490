use serde::Serialize;

use crate::error::ExtractionError;

/// Number of terms in one NASA polynomial segment.
pub const TERMS: usize = 7;

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

/// Two-segment thermo polynomial: row 0 = low-T range, row 1 = high-T range.
///
/// Columns are the seven terms in document order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientMatrix {
    pub rows: [[f64; TERMS]; 2],
}

impl CoefficientMatrix {
    pub fn new(low: [f64; TERMS], high: [f64; TERMS]) -> Self {
        Self { rows: [low, high] }
    }

    /// Build from two parsed segments, rejecting any segment that is not
    /// exactly seven values long.
    pub fn from_segments(low: &[f64], high: &[f64]) -> Result<Self, ExtractionError> {
        Ok(Self::new(
            segment_array("low", low)?,
            segment_array("high", high)?,
        ))
    }

    pub fn low(&self) -> &[f64; TERMS] {
        &self.rows[0]
    }

    pub fn high(&self) -> &[f64; TERMS] {
        &self.rows[1]
    }

    /// Element-wise `self - other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut rows = [[0.0; TERMS]; 2];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[r][c] - other.rows[r][c];
            }
        }
        Self { rows }
    }
}

fn segment_array(segment: &str, values: &[f64]) -> Result<[f64; TERMS], ExtractionError> {
    <[f64; TERMS]>::try_from(values).map_err(|_| ExtractionError::CoefficientCount {
        segment: segment.into(),
        found: values.len(),
    })
}

/// Knobs that change how strictly coefficient documents are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Require each coefficient's own label (`a3`, `id="3"`) to match its position.
    pub verify_column_labels: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            verify_column_labels: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Report buckets, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBucket {
    Confirmed,
    Diverged,
    ExtractionError,
    Unmatched,
}

impl OutcomeBucket {
    pub const ALL: [OutcomeBucket; 4] = [
        Self::Confirmed,
        Self::Diverged,
        Self::ExtractionError,
        Self::Unmatched,
    ];

    /// Section heading used by the text report.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Diverged => "Diverged",
            Self::ExtractionError => "ExtractionError",
            Self::Unmatched => "Unmatched",
        }
    }
}

impl std::fmt::Display for OutcomeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Diverged => write!(f, "diverged"),
            Self::ExtractionError => write!(f, "extraction_error"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// One classified result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub bucket: OutcomeBucket,
    /// CAS of the bulk record, or the no-CAS sentinel.
    pub cas: String,
    /// Bulk phase this outcome concerns (`CH2O (G)`), when one was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_coefficients: Option<CoefficientMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_coefficients: Option<CoefficientMatrix>,
}

impl ComparisonOutcome {
    pub fn unmatched(cas: &str) -> Self {
        Self {
            bucket: OutcomeBucket::Unmatched,
            cas: cas.to_string(),
            bulk_phase: None,
            species_id: None,
            record_id: None,
            score: None,
            detail: None,
            bulk_coefficients: None,
            warehouse_coefficients: None,
        }
    }

    /// Report label: `<warehouse-id>/<record-id>` for compared records,
    /// `<cas>/<phase>` for bulk-side extraction failures, the CAS otherwise.
    pub fn label(&self) -> String {
        match (&self.species_id, &self.record_id, &self.bulk_phase) {
            (Some(species), Some(record), _) => format!("{species}/{record}"),
            (_, _, Some(phase)) if self.bucket == OutcomeBucket::ExtractionError => {
                format!("{}/{phase}", self.cas)
            }
            _ => self.cas.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub confirmed: usize,
    pub diverged: usize,
    pub extraction_errors: usize,
    pub unmatched: usize,
    /// Warehouse records skipped because they cite a different source.
    pub skipped_provenance: usize,
}

impl ReconSummary {
    pub fn count(&self, bucket: OutcomeBucket) -> usize {
        match bucket {
            OutcomeBucket::Confirmed => self.confirmed,
            OutcomeBucket::Diverged => self.diverged,
            OutcomeBucket::ExtractionError => self.extraction_errors,
            OutcomeBucket::Unmatched => self.unmatched,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub reference_bibliography: String,
    pub threshold: f64,
    pub bulk_species: usize,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub outcomes: Vec<ComparisonOutcome>,
}
