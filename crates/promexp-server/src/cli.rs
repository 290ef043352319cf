//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use promexp_core::Result;

use crate::config::{self, ExporterConfig, DEFAULT_CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(name = "promexp", about = "Metric exporter for Prometheus")]
pub struct Cli {
    /// Port to listen on.
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Address to listen on.
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Cache collected metrics for this many seconds.
    #[arg(long)]
    pub cache_life: Option<f64>,

    /// Run with built-in defaults instead of reading a config file.
    #[arg(long, conflicts_with = "config_file")]
    pub no_config: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file to use.
    pub config_file: Option<PathBuf>,
}

impl Cli {
    /// Load the config this invocation asks for and apply CLI overrides.
    pub fn load_config(&self) -> Result<ExporterConfig> {
        let mut cfg = if self.no_config {
            ExporterConfig::default()
        } else {
            let path = self
                .config_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            config::load_from_file(path)?
        };

        if let Some(port) = self.port {
            cfg.listen_port = port;
        }
        if let Some(address) = &self.address {
            cfg.listen_ip = address.clone();
        }
        if let Some(secs) = self.cache_life {
            cfg.cache_life = Some(toml::Value::Float(secs));
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
