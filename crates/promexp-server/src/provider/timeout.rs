use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use promexp_core::{ExporterError, LabelFilter, Metric, Result};

use crate::provider::MetricProvider;

/// Bounds every call to the wrapped provider; expiry is a provider failure.
pub struct TimeoutProvider<P> {
    inner: P,
    deadline: Duration,
}

impl<P: MetricProvider> TimeoutProvider<P> {
    pub fn new(inner: P, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl<P: MetricProvider> MetricProvider for TimeoutProvider<P> {
    async fn collect(&self, hint: &LabelFilter) -> Result<Vec<Metric>> {
        timeout(self.deadline, self.inner.collect(hint))
            .await
            .map_err(|_| {
                let deadline_ms = self.deadline.as_millis();
                tracing::warn!(deadline_ms = deadline_ms as u64, "provider timed out");
                ExporterError::Provider(format!("collection timed out after {deadline_ms}ms"))
            })?
    }
}
