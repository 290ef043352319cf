//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use promexp_core::{ExporterError, Result};

pub use schema::{ExporterConfig, MetricConfig};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        ExporterError::Config(format!("read config {} failed: {e}", path.display()))
    })?;
    let cfg = load_from_str(&s)?;
    tracing::info!(path = %path.display(), "read config file");
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig =
        toml::from_str(s).map_err(|e| ExporterError::Config(format!("invalid toml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
