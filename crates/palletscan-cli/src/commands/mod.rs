//! Subcommands and the helpers they share.

pub mod columns;
pub mod config;
pub mod inspect;
pub mod process;

use std::fs;
use std::path::Path;

use tracing::debug;

use palletscan_core::PalletConfig;

/// Load the configuration from `path`, else the default location, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PalletConfig> {
    if let Some(path) = path {
        return Ok(PalletConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration at {}", default_path.display());
        Ok(PalletConfig::from_file(&default_path)?)
    } else {
        Ok(PalletConfig::default())
    }
}

/// Read a whole input file, failing with a readable message when it is absent.
pub fn read_input(path: &Path, what: &str) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("{} not found: {}", what, path.display());
    }
    Ok(fs::read(path)?)
}
