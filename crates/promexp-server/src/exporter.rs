//! Exporter: collect, filter, and serialize metrics for one scrape.

use std::sync::Arc;

use promexp_core::{filter_metrics, LabelFilter, Metric, Result};

use crate::provider::MetricProvider;

/// Turns a provider's metrics into exposition text.
///
/// Filtering happens here and only here. The provider is asked for the
/// full set, and the label universe is rebuilt from what that pass
/// collected, so a filter key no current metric carries is ignored.
pub struct Exporter {
    provider: Arc<dyn MetricProvider>,
}

impl Exporter {
    pub fn new(provider: Arc<dyn MetricProvider>) -> Self {
        Self { provider }
    }

    /// Collected metrics matching `filter`.
    pub async fn get_metrics(&self, filter: &LabelFilter) -> Result<Vec<Metric>> {
        let metrics = self.provider.collect(&LabelFilter::new()).await?;
        Ok(filter_metrics(&metrics, filter))
    }

    /// Newline-joined exposition of every matching metric. Metrics whose
    /// value is currently undefined are left out.
    pub async fn export(&self, filter: &LabelFilter) -> Result<String> {
        let metrics = self.get_metrics(filter).await?;
        let rendered: Vec<String> = metrics.iter().filter_map(Metric::render).collect();
        tracing::debug!(
            collected = metrics.len(),
            exported = rendered.len(),
            "exporting metrics"
        );
        Ok(rendered.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use promexp_core::{LabelSet, MetricType};

    use super::*;
    use crate::provider::{CachedProvider, ConfigProvider};

    fn provider_with(metrics: Vec<Metric>) -> Arc<dyn MetricProvider> {
        let mut p = ConfigProvider::new();
        for m in metrics {
            p.push(m);
        }
        Arc::new(p)
    }

    fn labelled(name: &str, pairs: &[(&str, &str)]) -> Metric {
        Metric::new(name)
            .unwrap()
            .with_labels(&LabelSet::from_pairs(pairs.iter().copied()).unwrap())
    }

    #[tokio::test]
    async fn export_joins_with_newlines() {
        let exporter = Exporter::new(provider_with(vec![
            Metric::new("a").unwrap().with_help("first").with_type(MetricType::Counter),
            Metric::new("b").unwrap().with_value(2.5),
        ]));
        let out = exporter.export(&LabelFilter::new()).await.unwrap();
        assert_eq!(
            out,
            "# HELP a first\n# TYPE a counter\na 0\n# TYPE b untyped\nb 2.5"
        );
    }

    #[tokio::test]
    async fn export_filters_by_label() {
        let exporter = Exporter::new(provider_with(vec![
            labelled("m1", &[("a", "1")]),
            labelled("m2", &[("a", "2"), ("b", "x")]),
        ]));

        let pred: LabelFilter = [("a", "1")].into_iter().collect();
        let out = exporter.export(&pred).await.unwrap();
        assert_eq!(out, "# TYPE m1 untyped\nm1{a=\"1\"} 0");

        let pred: LabelFilter = [("a", "1"), ("b", "x")].into_iter().collect();
        assert_eq!(exporter.export(&pred).await.unwrap(), "");

        let pred: LabelFilter = [("unknown", "1")].into_iter().collect();
        assert_eq!(exporter.get_metrics(&pred).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn undefined_values_are_skipped() {
        let exporter = Exporter::new(provider_with(vec![
            Metric::new("gone").unwrap().with_value_fn(|| None),
            Metric::new("here").unwrap().with_value(1),
        ]));
        let out = exporter.export(&LabelFilter::new()).await.unwrap();
        assert_eq!(out, "# TYPE here untyped\nhere 1");
    }

    /// Returns `first` on the first collection and `rest` afterwards.
    struct Shifting {
        calls: AtomicUsize,
        first: Vec<Metric>,
        rest: Vec<Metric>,
    }

    #[async_trait]
    impl MetricProvider for Shifting {
        async fn collect(&self, _hint: &LabelFilter) -> Result<Vec<Metric>> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(self.first.clone()),
                _ => Ok(self.rest.clone()),
            }
        }
    }

    fn shifting() -> Shifting {
        Shifting {
            calls: AtomicUsize::new(0),
            first: vec![labelled("m", &[("b", "x")])],
            rest: vec![labelled("m", &[("a", "1")])],
        }
    }

    #[tokio::test]
    async fn label_gone_from_current_scrape_is_ignored() {
        let exporter = Exporter::new(Arc::new(shifting()));
        let pred: LabelFilter = [("b", "y")].into_iter().collect();

        // "b" is known on the first scrape and matches nothing.
        assert_eq!(exporter.export(&pred).await.unwrap(), "");

        // Later scrapes no longer carry "b", so the key is dropped.
        for _ in 0..3 {
            let current = exporter.get_metrics(&LabelFilter::new()).await.unwrap();
            let out = exporter.get_metrics(&pred).await.unwrap();
            assert_eq!(out.len(), filter_metrics(&current, &pred).len());
            assert_eq!(out.len(), 1);
        }
        assert_eq!(exporter.export(&pred).await.unwrap(), "# TYPE m untyped\nm{a=\"1\"} 0");
    }

    #[tokio::test(start_paused = true)]
    async fn cached_and_uncached_paths_agree_after_labels_change() {
        let cache = CachedProvider::new(shifting()).with_ttl(Duration::from_secs(10));
        let exporter = Exporter::new(Arc::new(cache));
        let pred: LabelFilter = [("b", "y")].into_iter().collect();

        assert_eq!(exporter.export(&pred).await.unwrap(), "");
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(exporter.export(&pred).await.unwrap(), "# TYPE m untyped\nm{a=\"1\"} 0");
    }

    #[tokio::test]
    async fn hundred_metrics_export_is_stable() {
        let metrics = (0..100)
            .map(|i| {
                Metric::new(format!("metric_{i}"))
                    .unwrap()
                    .with_type(MetricType::Counter)
                    .with_help(format!("help {i}"))
            })
            .collect();
        let cache = CachedProvider::new(provider_with(metrics)).with_ttl(Duration::from_secs(60));
        let exporter = Exporter::new(Arc::new(cache));

        let first = exporter.export(&LabelFilter::new()).await.unwrap();
        let second = exporter.export(&LabelFilter::new()).await.unwrap();
        assert_eq!(first, second);
        for i in 0..100 {
            assert!(first.contains(&format!("metric_{i} 0")));
        }
    }
}
