//! Configuration resolution for the command line

use std::path::Path;

use anyhow::{Context, Result};
use canvas_config::CanvasConfig;
use tracing::info;

/// Load the configuration file if one was given, then apply environment overrides
pub fn resolve(path: Option<&Path>) -> Result<CanvasConfig> {
    let mut config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            CanvasConfig::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => CanvasConfig::default(),
    };
    config
        .apply_env()
        .context("invalid configuration override in the environment")?;
    Ok(config)
}
