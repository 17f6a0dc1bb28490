//! `thermocheck index`: maintain the CAS / species id index.

use std::io::{self, Write};

use clap::Subcommand;
use thermocheck_io::{CacheStore, IdentifierIndex};

use crate::exit_codes::{index_exit_code, EXIT_ERROR, EXIT_NOT_FOUND};
use crate::sources::SourceArgs;
use crate::CliError;

#[derive(Subcommand)]
pub enum IndexCommands {
    /// Discard the cached index and rebuild it from the species catalog
    #[command(after_help = "\
Examples:
  thermocheck index build
  thermocheck index build --warehouse warehouse.primekinetics.org --cache cache")]
    Build {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Print the warehouse species ids recorded for a CAS number
    #[command(after_help = "\
Examples:
  thermocheck index lookup 50-00-0")]
    Lookup {
        /// CAS registry number, e.g. 50-00-0
        cas: String,

        #[command(flatten)]
        sources: SourceArgs,
    },
}

pub fn cmd_index(cmd: IndexCommands) -> Result<(), CliError> {
    match cmd {
        IndexCommands::Build { sources } => cmd_index_build(sources),
        IndexCommands::Lookup { cas, sources } => cmd_index_lookup(&cas, sources),
    }
}

fn index_err(err: thermocheck_io::IoError) -> CliError {
    CliError::new(index_exit_code(&err), err.to_string())
}

fn cmd_index_build(sources: SourceArgs) -> Result<(), CliError> {
    let config = sources.load()?;
    let store = CacheStore::new(&config.paths.cache);
    let index = IdentifierIndex::rebuild(&config.paths.warehouse, &store).map_err(index_err)?;

    eprintln!(
        "indexed {} species under {} CAS numbers into {}",
        index.species_count(),
        index.cas_count(),
        store.dir().display(),
    );
    let shared = index.shared_cas().count();
    if shared > 0 {
        eprintln!("{shared} CAS numbers map to more than one species");
    }
    Ok(())
}

fn cmd_index_lookup(cas: &str, sources: SourceArgs) -> Result<(), CliError> {
    let config = sources.load()?;
    let store = CacheStore::new(&config.paths.cache);
    let index = IdentifierIndex::load_or_build(&config.paths.warehouse, &store).map_err(index_err)?;

    let species = index
        .species_for_cas(cas)
        .ok_or_else(|| CliError::new(EXIT_NOT_FOUND, format!("no warehouse species for CAS {cas}")))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for id in species {
        writeln!(handle, "{}", id).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    }
    Ok(())
}
