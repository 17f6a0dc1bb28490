//! `thermocheck-recon`: Burcat / PrIMe thermo polynomial reconciliation engine.
//!
//! Pure engine crate: consumes records through the source traits in
//! [`engine`], returns classified results. No filesystem access.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;

pub use config::ReconConfig;
pub use engine::{run, BulkSpecies, IdentifierLookup, PhaseCoefficients, ThermoRecord, ThermoWarehouse};
pub use error::{ExtractionError, ReconError};
pub use model::{CoefficientMatrix, ComparisonOutcome, ExtractOptions, OutcomeBucket, ReconResult};
