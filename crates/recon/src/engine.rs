use crate::classify::{classify, discrepancy};
use crate::config::ReconConfig;
use crate::error::ExtractionError;
use crate::evidence::compute_summary;
use crate::model::{
    CoefficientMatrix, ComparisonOutcome, ExtractOptions, OutcomeBucket, ReconMeta, ReconResult,
};

/// Label used for bulk records that carry no CAS attribute.
pub const NO_CAS: &str = "No_CAS_in_Burcat";

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// CAS → warehouse species ids.
pub trait IdentifierLookup {
    /// `None` (or an empty slice) means the CAS is unknown to the warehouse.
    fn species_ids(&self, cas: &str) -> Option<&[String]>;
}

/// One structured phase of a bulk record, with its coefficients already read.
#[derive(Debug, Clone)]
pub struct PhaseCoefficients {
    /// `formula (phase)`, or a positional label when those nodes are unusable.
    pub label: String,
    pub coefficients: Result<CoefficientMatrix, ExtractionError>,
}

/// A species record from the bulk corpus.
pub trait BulkSpecies {
    fn cas(&self) -> Option<&str>;
    /// Extract every structured phase. Called at most once per species.
    fn phase_coefficients(&self, options: ExtractOptions) -> Vec<PhaseCoefficients>;
}

/// One thermo document from the warehouse.
pub trait ThermoRecord {
    fn record_id(&self) -> &str;
    /// Whether any bibliography link points at `bibliography_id`.
    fn cites(&self, bibliography_id: &str) -> bool;
    fn coefficients(&self, options: ExtractOptions) -> Result<CoefficientMatrix, ExtractionError>;
}

/// Per-species thermo record enumeration.
pub trait ThermoWarehouse {
    type Record: ThermoRecord;
    type Records: Iterator<Item = Self::Record>;

    /// Empty when the species has no thermo data; never an error.
    fn thermo_records(&self, species_id: &str) -> Self::Records;
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Reconcile every bulk species against the warehouse. Never fails: lookup
/// misses and extraction problems become outcomes.
pub fn run<L, S, W>(
    config: &ReconConfig,
    index: &L,
    species: impl IntoIterator<Item = S>,
    warehouse: &W,
) -> ReconResult
where
    L: IdentifierLookup,
    S: BulkSpecies,
    W: ThermoWarehouse,
{
    let options = config.extract_options();
    let mut outcomes = Vec::new();
    let mut skipped_provenance = 0;
    let mut bulk_species = 0;

    for specie in species {
        bulk_species += 1;
        let cas = specie.cas().unwrap_or(NO_CAS);
        log::info!("trying bulk species with CAS {cas}");

        let species_ids = match specie.cas().and_then(|c| index.species_ids(c)) {
            Some(ids) if !ids.is_empty() => ids,
            _ => {
                log::info!("species with CAS {cas} not found in warehouse");
                outcomes.push(ComparisonOutcome::unmatched(cas));
                continue;
            }
        };

        let phases = specie.phase_coefficients(options);
        if phases.is_empty() {
            log::info!("CAS {cas} has no structured phases");
        }

        for phase in phases {
            log::info!("looking for bulk phase {}", phase.label);
            let bulk = match phase.coefficients {
                Ok(matrix) => matrix,
                Err(e) => {
                    log::warn!("cannot read bulk coefficients for {cas}/{}: {e}", phase.label);
                    outcomes.push(ComparisonOutcome {
                        bucket: OutcomeBucket::ExtractionError,
                        bulk_phase: Some(phase.label),
                        detail: Some(e.to_string()),
                        ..ComparisonOutcome::unmatched(cas)
                    });
                    continue;
                }
            };

            for species_id in species_ids {
                log::info!("trying warehouse species {species_id}");
                for record in warehouse.thermo_records(species_id) {
                    if !record.cites(&config.reference_bibliography) {
                        log::info!(
                            "{species_id}/{} does not cite {}, skipping comparison",
                            record.record_id(),
                            config.reference_bibliography
                        );
                        skipped_provenance += 1;
                        continue;
                    }
                    let outcome = compare_record(config, cas, &phase.label, &bulk, species_id, &record);
                    outcomes.push(outcome);
                }
            }
        }
    }

    let summary = compute_summary(&outcomes, skipped_provenance);

    ReconResult {
        meta: ReconMeta {
            reference_bibliography: config.reference_bibliography.clone(),
            threshold: config.threshold,
            bulk_species,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        outcomes,
    }
}

/// Score one provenance-checked warehouse record against a bulk phase.
fn compare_record<R: ThermoRecord>(
    config: &ReconConfig,
    cas: &str,
    phase_label: &str,
    bulk: &CoefficientMatrix,
    species_id: &str,
    record: &R,
) -> ComparisonOutcome {
    let record_id = record.record_id();
    let base = ComparisonOutcome {
        bulk_phase: Some(phase_label.to_string()),
        species_id: Some(species_id.to_string()),
        record_id: Some(record_id.to_string()),
        ..ComparisonOutcome::unmatched(cas)
    };

    let warehouse = match record.coefficients(config.extract_options()) {
        Ok(matrix) => matrix,
        Err(e) => {
            log::warn!("error reading warehouse coefficients {species_id}/{record_id}: {e}");
            return ComparisonOutcome {
                bucket: OutcomeBucket::ExtractionError,
                detail: Some(e.to_string()),
                ..base
            };
        }
    };

    let score = discrepancy(bulk, &warehouse);
    let bucket = classify(score, config.threshold);
    log::info!("{species_id}/{record_id}: sum of squared errors = {score:e} ({bucket})");

    if bucket == OutcomeBucket::Diverged {
        log::debug!("warehouse  {:?}", warehouse.rows);
        log::debug!("bulk       {:?}", bulk.rows);
        log::debug!("difference {:?}", bulk.difference(&warehouse).rows);
        ComparisonOutcome {
            bucket,
            score: Some(score),
            bulk_coefficients: Some(*bulk),
            warehouse_coefficients: Some(warehouse),
            ..base
        }
    } else {
        ComparisonOutcome {
            bucket,
            score: Some(score),
            ..base
        }
    }
}
