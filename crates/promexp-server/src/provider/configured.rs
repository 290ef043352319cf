use async_trait::async_trait;

use promexp_core::{LabelFilter, Metric, Result};

use crate::config::ExporterConfig;
use crate::provider::MetricProvider;

/// Serves a fixed metric list: the metrics defined in config plus any
/// registered with `push`. Every collection hands out copies.
#[derive(Debug, Default)]
pub struct ConfigProvider {
    metrics: Vec<Metric>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self { metrics: Vec::new() }
    }

    pub fn from_config(cfg: &ExporterConfig) -> Result<Self> {
        let metrics = cfg.build_metrics()?;
        for m in &metrics {
            tracing::info!(metric = %m.name(), "adding metric");
        }
        Ok(Self { metrics })
    }

    pub fn push(&mut self, metric: Metric) {
        tracing::info!(metric = %metric.name(), "adding metric");
        self.metrics.push(metric);
    }
}

#[async_trait]
impl MetricProvider for ConfigProvider {
    async fn collect(&self, _hint: &LabelFilter) -> Result<Vec<Metric>> {
        Ok(self.metrics.clone())
    }
}
