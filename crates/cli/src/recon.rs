//! `thermocheck run` and `thermocheck validate`.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use thermocheck_io::{BulkCorpus, CacheStore, IdentifierIndex, Warehouse};
use thermocheck_recon::evidence::render_text;
use thermocheck_recon::ReconResult;

use crate::exit_codes::{index_exit_code, EXIT_CONFIG, EXIT_CORPUS, EXIT_ERROR, EXIT_STRICT_MISMATCH};
use crate::sources::{read_config, SourceArgs};
use crate::CliError;

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Local copy of BURCAT_THR.xml
    #[arg(long, value_name = "FILE")]
    pub bulk: Option<PathBuf>,

    /// Score above which a comparison is Diverged
    #[arg(long, value_name = "X", allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Output JSON to stdout instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Also write JSON output to file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit non-zero when anything diverged or failed to extract
    #[arg(long)]
    pub strict: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = args.sources.load()?;
    if let Some(bulk) = &args.bulk {
        config.paths.bulk = bulk.clone();
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    let corpus = BulkCorpus::open(&config.paths.bulk).map_err(|e| {
        CliError::new(EXIT_CORPUS, e.to_string())
            .with_hint("pass --bulk with the path to a local BURCAT_THR.xml")
    })?;

    let store = CacheStore::new(&config.paths.cache);
    let index = IdentifierIndex::load_or_build(&config.paths.warehouse, &store).map_err(|e| {
        CliError::new(index_exit_code(&e), e.to_string())
            .with_hint("pass --warehouse with the root of a local PrIMe warehouse mirror")
    })?;

    let warehouse = Warehouse::new(&config.paths.warehouse);
    let result = thermocheck_recon::run(&config, &index, corpus.species(), &warehouse);
    drop(corpus);

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        log::info!("wrote {}", path.display());
    }

    let report = if args.json {
        format!("{json_str}\n")
    } else {
        render_text(&result)
    };
    io::stdout()
        .lock()
        .write_all(report.as_bytes())
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    log_summary(&result);

    let s = &result.summary;
    if args.strict && (s.diverged > 0 || s.extraction_errors > 0) {
        return Err(CliError::new(
            EXIT_STRICT_MISMATCH,
            format!("{} diverged, {} extraction errors", s.diverged, s.extraction_errors),
        ));
    }

    Ok(())
}

fn log_summary(result: &ReconResult) {
    let s = &result.summary;
    log::info!(
        "{} bulk species: {} confirmed, {} diverged, {} extraction errors, {} unmatched ({} records from other sources skipped)",
        result.meta.bulk_species,
        s.confirmed,
        s.diverged,
        s.extraction_errors,
        s.unmatched,
        s.skipped_provenance,
    );
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: threshold {}, reference {}, column labels {}",
        config.threshold,
        config.reference_bibliography,
        if config.verify_column_labels { "checked" } else { "ignored" },
    );
    Ok(())
}
