use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use promexp_core::{ExporterError, LabelSet, Metric, MetricValue, Result};

use crate::provider::cache::ttl_from_secs;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default = "default_listen_ip")]
    pub listen_ip: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Seconds a collected snapshot stays fresh. Setting it turns caching on.
    #[serde(default)]
    pub cache_life: Option<toml::Value>,

    #[serde(default)]
    pub provider_timeout_ms: Option<u64>,

    /// Labels applied to every configured metric.
    #[serde(default)]
    pub labels: toml::Table,

    /// `[metrics.<name>]` tables, in file order.
    #[serde(default)]
    pub metrics: toml::Table,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_ip: default_listen_ip(),
            listen_port: default_listen_port(),
            cache_life: None,
            provider_timeout_ms: None,
            labels: toml::Table::new(),
            metrics: toml::Table::new(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        self.cache_ttl()?;
        if self.provider_timeout_ms == Some(0) {
            return Err(ExporterError::Validation(
                "provider_timeout_ms must be greater than 0".into(),
            ));
        }
        self.build_metrics()?; // surface label/type/value errors at load time
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.listen_ip.parse().map_err(|e| {
            ExporterError::Config(format!(
                "listen_ip {:?} is not an ip address: {e}",
                self.listen_ip
            ))
        })?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// `None` when caching is off.
    pub fn cache_ttl(&self) -> Result<Option<Duration>> {
        let Some(raw) = &self.cache_life else {
            return Ok(None);
        };
        let secs = match raw {
            toml::Value::Integer(i) => *i as f64,
            toml::Value::Float(f) => *f,
            other => {
                return Err(ExporterError::Validation(format!(
                    "cache_life must be a number, got {}",
                    other.type_str()
                )))
            }
        };
        ttl_from_secs(secs).map(Some)
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }

    pub fn exporter_labels(&self) -> Result<LabelSet> {
        label_set_from_table(&self.labels)
    }

    /// Build every configured metric: exporter labels first, then the
    /// metric's own labels on top.
    pub fn build_metrics(&self) -> Result<Vec<Metric>> {
        let base = self.exporter_labels()?;
        let mut out = Vec::with_capacity(self.metrics.len());

        for (name, raw) in &self.metrics {
            let def: MetricConfig = raw
                .clone()
                .try_into()
                .map_err(|e| ExporterError::Config(format!("metric {name}: {e}")))?;

            let mut labels = base.clone();
            labels.merge(&label_set_from_table(&def.labels)?);

            let mut metric = Metric::new(name.as_str())?
                .with_type_name(&def.metric_type)?
                .with_labels(&labels);
            if let Some(help) = def.help {
                metric = metric.with_help(help);
            }
            if let Some(value) = &def.value {
                metric.set_value(metric_value(name, value)?);
            }

            tracing::debug!(metric = %metric.name(), "built metric from config");
            out.push(metric);
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    #[serde(rename = "type", default = "default_metric_type")]
    pub metric_type: String,

    #[serde(default)]
    pub help: Option<String>,

    #[serde(default)]
    pub value: Option<toml::Value>,

    #[serde(default)]
    pub labels: toml::Table,
}

fn label_set_from_table(table: &toml::Table) -> Result<LabelSet> {
    let mut labels = LabelSet::new();
    for (k, v) in table {
        let toml::Value::String(s) = v else {
            return Err(ExporterError::Validation(format!(
                "label {k} must be a string, got {}",
                v.type_str()
            )));
        };
        labels.set(k.as_str(), s.as_str())?;
    }
    Ok(labels)
}

fn metric_value(name: &str, raw: &toml::Value) -> Result<MetricValue> {
    match raw {
        toml::Value::Integer(i) => Ok(MetricValue::Int(*i)),
        toml::Value::Float(f) => Ok(MetricValue::Float(*f)),
        other => Err(ExporterError::Type(format!(
            "metric {name} value must be an integer or float, got {}",
            other.type_str()
        ))),
    }
}

fn default_listen_ip() -> String {
    "127.0.0.1".into()
}
fn default_listen_port() -> u16 {
    9999
}
fn default_metric_type() -> String {
    "untyped".into()
}
