//! Command implementations.

mod coalesce;
mod evaluate;
mod info;
mod sync;
mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SyncConfig;
use tracing::info;

pub use coalesce::run_coalesce;
pub use evaluate::run_evaluate;
pub use info::run_info;
pub use sync::run_sync;
pub use validate::run_validate;

/// Configuration from `path`, or the defaults when no file is given
fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(SyncConfig::default()),
    }
}
