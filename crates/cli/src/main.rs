// thermocheck CLI - reconcile Burcat thermo polynomials against the PrIMe warehouse

mod exit_codes;
mod index;
mod recon;
mod sources;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "thermocheck")]
#[command(about = "Check Burcat NASA-7 thermo polynomials against the PrIMe warehouse")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the default `run` command
    #[command(flatten)]
    run: recon::RunArgs,

    /// Log per-comparison detail, including diverged matrices
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every Burcat species against the warehouse (default)
    #[command(after_help = "\
Examples:
  thermocheck run
  thermocheck run --bulk BURCAT_THR.xml --warehouse warehouse.primekinetics.org
  thermocheck run --config thermocheck.toml --json --output result.json
  thermocheck run --threshold 1e-6 --strict")]
    Run(recon::RunArgs),

    /// Maintain the CAS / species id index
    Index {
        #[command(subcommand)]
        command: index::IndexCommands,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  thermocheck validate thermocheck.toml")]
    Validate {
        /// Path to the TOML config file
        config: std::path::PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Stderr logging. `RUST_LOG` wins over the verbosity flags.
fn setup_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        None => recon::cmd_run(cli.run),
        Some(Commands::Run(args)) => recon::cmd_run(args),
        Some(Commands::Index { command }) => index::cmd_index(command),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
