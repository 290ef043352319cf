//! Metric providers: where the exporter's metrics come from.
//!
//! A provider is anything that can produce the current metric list. It may
//! be expensive and may legitimately return nothing; failures are reported
//! as `Err` so they stay distinguishable from "zero metrics".

pub mod cache;
pub mod configured;
pub mod timeout;

use std::sync::Arc;

use async_trait::async_trait;

use promexp_core::{LabelFilter, Metric, Result};

pub use cache::{CacheState, CachedProvider, DEFAULT_CACHE_LIFE};
pub use configured::ConfigProvider;
pub use timeout::TimeoutProvider;

#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Produce the current metrics. `hint` is the caller's label filter;
    /// providers may use it to skip work but are not required to apply it.
    async fn collect(&self, hint: &LabelFilter) -> Result<Vec<Metric>>;
}

#[async_trait]
impl<P: MetricProvider + ?Sized> MetricProvider for Arc<P> {
    async fn collect(&self, hint: &LabelFilter) -> Result<Vec<Metric>> {
        (**self).collect(hint).await
    }
}
