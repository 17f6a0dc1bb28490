//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | inputs           | Config, corpus, index and cache failures |
//! | 10-19   | run              | Reconciliation verdicts                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use thermocheck_io::IoError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. the report could not be written).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. Clap exits with this code on its own.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Inputs (3-9)
// =============================================================================

/// Config file missing, unreadable, not TOML, or failing validation.
pub const EXIT_CONFIG: u8 = 3;

/// Bulk corpus missing or not well-formed XML. Nothing was compared.
pub const EXIT_CORPUS: u8 = 4;

/// Identifier index could not be built (e.g. no species catalog in the mirror).
pub const EXIT_INDEX: u8 = 5;

/// Identifier index cache could not be written or cleared.
pub const EXIT_CACHE: u8 = 6;

/// `index lookup` found no species for the CAS number.
pub const EXIT_NOT_FOUND: u8 = 7;

// =============================================================================
// Run (10-19)
// =============================================================================

/// `run --strict`: at least one Diverged or ExtractionError outcome.
pub const EXIT_STRICT_MISMATCH: u8 = 10;

/// Map an index-side I/O failure to its exit code.
pub fn index_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Cache { .. } => EXIT_CACHE,
        IoError::Io { .. } | IoError::Xml { .. } => EXIT_INDEX,
    }
}
