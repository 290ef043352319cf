//! Time-based cache over a metric provider.
//!
//! States, over at most one snapshot:
//! - Empty: nothing collected yet.
//! - Fresh: snapshot age < ttl; served without calling the provider.
//! - Stale: age >= ttl; the next read attempts a refresh.
//!
//! A refresh that yields metrics replaces the snapshot. A refresh that
//! yields nothing or fails keeps the previous snapshot (with a
//! warning) and leaves its capture time alone, so every later read retries.
//! Without a previous snapshot an empty result exports nothing and a
//! failure is returned to the caller.
//!
//! Refreshes are single-flight: the snapshot lock is held across the
//! provider call, so concurrent readers wait for the in-flight refresh and
//! then reuse its result instead of calling the provider again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use promexp_core::{filter_metrics, ExporterError, LabelFilter, Metric, Result};

use crate::provider::MetricProvider;

pub const DEFAULT_CACHE_LIFE: Duration = Duration::from_secs(60);

/// Validate a ttl given in (possibly fractional) seconds.
pub fn ttl_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() {
        return Err(ExporterError::Validation(format!(
            "cache ttl must be a finite number, got {secs}"
        )));
    }
    if secs < 0.0 {
        return Err(ExporterError::Validation(format!(
            "cache ttl must not be negative, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

struct Snapshot {
    metrics: Vec<Metric>,
    captured_at: Instant,
}

pub struct CachedProvider<P> {
    inner: P,
    ttl_nanos: AtomicU64,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<P: MetricProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            ttl_nanos: AtomicU64::new(duration_nanos(DEFAULT_CACHE_LIFE)),
            snapshot: Mutex::new(None),
        }
    }

    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.set_ttl(ttl);
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_nanos(self.ttl_nanos.load(Ordering::Relaxed))
    }

    pub fn set_ttl(&self, ttl: Duration) {
        tracing::info!(ttl_secs = ttl.as_secs_f64(), "setting cache ttl");
        self.ttl_nanos.store(duration_nanos(ttl), Ordering::Relaxed);
    }

    /// Set the ttl from seconds. Invalid values leave the ttl unchanged.
    pub fn set_ttl_secs(&self, secs: f64) -> Result<()> {
        let ttl = ttl_from_secs(secs)?;
        self.set_ttl(ttl);
        Ok(())
    }

    pub async fn state(&self) -> CacheState {
        let guard = self.snapshot.lock().await;
        match guard.as_ref() {
            None => CacheState::Empty,
            Some(s) if s.captured_at.elapsed() < self.ttl() => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// Metrics matching `filter`, refreshing the snapshot first if it is
    /// missing or stale. Returns copies; the snapshot itself is never
    /// handed out.
    pub async fn get(&self, filter: &LabelFilter) -> Result<Vec<Metric>> {
        let mut guard = self.snapshot.lock().await;
        let ttl = self.ttl();

        let needs_refresh = match guard.as_ref() {
            None => true,
            Some(s) => {
                let age = s.captured_at.elapsed();
                tracing::debug!(
                    age_ms = age.as_millis() as u64,
                    ttl_ms = ttl.as_millis() as u64,
                    "cache age"
                );
                age >= ttl
            }
        };

        if needs_refresh {
            // The snapshot always holds the unfiltered set.
            match self.inner.collect(&LabelFilter::new()).await {
                Ok(metrics) if !metrics.is_empty() => {
                    tracing::debug!(count = metrics.len(), "cache refreshed");
                    *guard = Some(Snapshot {
                        metrics,
                        captured_at: Instant::now(),
                    });
                }
                Ok(_) if guard.is_some() => {
                    tracing::warn!("provider returned no metrics, serving stale snapshot");
                }
                Ok(_) => {
                    tracing::debug!("provider returned no metrics, cache empty");
                }
                Err(e) if guard.is_some() => {
                    tracing::warn!(error = %e, "cache refresh failed, serving stale snapshot");
                }
                Err(e) => return Err(e),
            }
        } else {
            tracing::debug!("returning cached metrics");
        }

        Ok(guard
            .as_ref()
            .map(|s| filter_metrics(&s.metrics, filter))
            .unwrap_or_default())
    }

}

#[async_trait]
impl<P: MetricProvider> MetricProvider for CachedProvider<P> {
    async fn collect(&self, hint: &LabelFilter) -> Result<Vec<Metric>> {
        self.get(hint).await
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
