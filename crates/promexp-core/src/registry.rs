//! Label universe: the label keys defined across a set of metrics.
//!
//! The filter engine consults a registry to decide which predicate keys are
//! "defined". A registry is built for one collection pass from the metrics
//! that pass produced; only keys are kept, never values.

use dashmap::DashSet;

use crate::labels::LabelSet;
use crate::metric::Metric;

#[derive(Debug, Default)]
pub struct LabelRegistry {
    keys: DashSet<String>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self {
            keys: DashSet::new(),
        }
    }

    /// Registry holding exactly the label keys defined by `metrics`.
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a Metric>) -> Self {
        let registry = Self::new();
        for m in metrics {
            registry.record(m.labels());
        }
        registry
    }

    pub fn record(&self, labels: &LabelSet) {
        for (k, _) in labels.iter() {
            if !self.keys.contains(k) {
                self.keys.insert(k.to_string());
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn records_keys() {
        let registry = LabelRegistry::new();
        registry.record(&LabelSet::from_pairs([("a", "1"), ("b", "x")]).unwrap());
        registry.record(&LabelSet::from_pairs([("a", "2")]).unwrap());

        assert!(registry.contains_key("a"));
        assert!(registry.contains_key("b"));
        assert!(!registry.contains_key("c"));
    }

    #[test]
    fn from_metrics_sees_only_those_metrics() {
        let m1 = Metric::new("m1")
            .unwrap()
            .with_labels(&LabelSet::from_pairs([("a", "1")]).unwrap());
        let m2 = Metric::new("m2")
            .unwrap()
            .with_labels(&LabelSet::from_pairs([("b", "2")]).unwrap());

        let registry = LabelRegistry::from_metrics([&m1]);
        assert!(registry.contains_key("a"));
        assert!(!registry.contains_key("b"));

        let registry = LabelRegistry::from_metrics([&m1, &m2]);
        assert!(registry.contains_key("b"));
    }
}
