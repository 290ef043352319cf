//! Shared application state for the exporter service.

use std::sync::Arc;

use promexp_core::Result;

use crate::config::ExporterConfig;
use crate::exporter::Exporter;
use crate::provider::{CachedProvider, ConfigProvider, MetricProvider, TimeoutProvider};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    exporter: Exporter,
}

impl AppState {
    /// Build state from config: the config metrics, layered as described
    /// on `layered`.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let provider = ConfigProvider::from_config(&cfg)?;
        Self::layered(cfg, Arc::new(provider))
    }

    /// Wrap `provider` in the layers the config asks for: a deadline on
    /// each call when `provider_timeout_ms` is set, then the cache when
    /// `cache_life` is set.
    pub fn layered(cfg: ExporterConfig, provider: Arc<dyn MetricProvider>) -> Result<Self> {
        let mut provider = provider;
        if let Some(deadline) = cfg.provider_timeout() {
            provider = Arc::new(TimeoutProvider::new(provider, deadline));
        }
        if let Some(ttl) = cfg.cache_ttl()? {
            provider = Arc::new(CachedProvider::new(provider).with_ttl(ttl));
        }
        Ok(Self::with_provider(cfg, provider))
    }

    /// Build state around an arbitrary provider.
    pub fn with_provider(cfg: ExporterConfig, provider: Arc<dyn MetricProvider>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                exporter: Exporter::new(provider),
            }),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn exporter(&self) -> &Exporter {
        &self.inner.exporter
    }
}
