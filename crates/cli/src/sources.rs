//! Config file loading and the path flags shared by every command.

use std::path::{Path, PathBuf};

use clap::Args;
use thermocheck_recon::ReconConfig;

use crate::exit_codes::EXIT_CONFIG;
use crate::CliError;

/// Where the warehouse mirror and index cache live.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root of the local PrIMe warehouse mirror
    #[arg(long, value_name = "DIR")]
    pub warehouse: Option<PathBuf>,

    /// Directory holding the identifier index cache
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,
}

impl SourceArgs {
    /// Config file (or defaults) with the path flags applied on top.
    pub fn load(&self) -> Result<ReconConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ReconConfig::default(),
        };
        if let Some(warehouse) = &self.warehouse {
            config.paths.warehouse = warehouse.clone();
        }
        if let Some(cache) = &self.cache {
            config.paths.cache = cache.clone();
        }
        Ok(config)
    }
}

pub fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&config_str)
        .map_err(|e| CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display())))
}
