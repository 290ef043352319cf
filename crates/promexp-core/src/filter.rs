//! Filter engine: narrow a metric list to those matching a label predicate.
//!
//! Policy for predicate keys: a key that no metric in the universe defines
//! is dropped before filtering. Every remaining key must then exist on a
//! metric with exactly the requested value (logical AND). Candidates are
//! narrowed one predicate key at a time, so output keeps input order.

use crate::labels::LabelFilter;
use crate::metric::Metric;
use crate::registry::LabelRegistry;

/// Filter against the universe of labels defined by `metrics` themselves.
pub fn filter_metrics(metrics: &[Metric], predicate: &LabelFilter) -> Vec<Metric> {
    if predicate.is_empty() {
        return metrics.to_vec();
    }
    let universe = LabelRegistry::from_metrics(metrics);
    filter_with_universe(metrics, predicate, &universe)
}

/// Filter against an explicit label universe. Returns copies; the input is
/// never modified.
pub fn filter_with_universe(
    metrics: &[Metric],
    predicate: &LabelFilter,
    universe: &LabelRegistry,
) -> Vec<Metric> {
    let mut candidates: Vec<&Metric> = metrics.iter().collect();

    for (key, want) in predicate.iter() {
        if !universe.contains_key(key) {
            tracing::debug!(label = %key, "dropping unknown filter label");
            continue;
        }
        candidates.retain(|m| m.labels().get(key) == Some(want));
        if candidates.is_empty() {
            break;
        }
    }

    candidates.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::labels::LabelSet;

    fn metric(name: &str, labels: &[(&str, &str)]) -> Metric {
        Metric::new(name)
            .unwrap()
            .with_labels(&LabelSet::from_pairs(labels.iter().copied()).unwrap())
    }

    fn names(metrics: &[Metric]) -> Vec<&str> {
        metrics.iter().map(|m| m.name()).collect()
    }

    fn fixture() -> Vec<Metric> {
        vec![metric("m1", &[("a", "1")]), metric("m2", &[("a", "2"), ("b", "x")])]
    }

    #[test]
    fn empty_predicate_is_identity() {
        let metrics = fixture();
        let out = filter_metrics(&metrics, &LabelFilter::new());
        assert_eq!(names(&out), vec!["m1", "m2"]);
    }

    #[test]
    fn single_key() {
        let metrics = fixture();
        let pred: LabelFilter = [("a", "1")].into_iter().collect();
        assert_eq!(names(&filter_metrics(&metrics, &pred)), vec!["m1"]);
    }

    #[test]
    fn keys_compose_as_and() {
        let metrics = fixture();
        let pred: LabelFilter = [("a", "1"), ("b", "x")].into_iter().collect();
        assert!(filter_metrics(&metrics, &pred).is_empty());

        let pred: LabelFilter = [("a", "2"), ("b", "x")].into_iter().collect();
        assert_eq!(names(&filter_metrics(&metrics, &pred)), vec!["m2"]);
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let metrics = fixture();
        let pred: LabelFilter = [("nope", "1")].into_iter().collect();
        assert_eq!(names(&filter_metrics(&metrics, &pred)), vec!["m1", "m2"]);

        let pred: LabelFilter = [("nope", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(names(&filter_metrics(&metrics, &pred)), vec!["m2"]);
    }

    #[test]
    fn known_key_missing_on_metric_excludes_it() {
        let metrics = fixture();
        let pred: LabelFilter = [("b", "x")].into_iter().collect();
        assert_eq!(names(&filter_metrics(&metrics, &pred)), vec!["m2"]);
    }

    #[test]
    fn explicit_universe_wins() {
        let metrics = fixture();
        let universe = LabelRegistry::new();
        universe.record(&LabelSet::from_pairs([("zone", "eu")]).unwrap());

        // "a" is unknown to this universe, so it is dropped.
        let pred: LabelFilter = [("a", "1")].into_iter().collect();
        assert_eq!(names(&filter_with_universe(&metrics, &pred, &universe)).len(), 2);

        // "zone" is known but no metric has it.
        let pred: LabelFilter = [("zone", "eu")].into_iter().collect();
        assert!(filter_with_universe(&metrics, &pred, &universe).is_empty());
    }

    #[test]
    fn input_is_untouched() {
        let metrics = fixture();
        let pred: LabelFilter = [("a", "1")].into_iter().collect();
        let mut out = filter_metrics(&metrics, &pred);
        out[0].labels_mut().set("a", "changed").unwrap();
        assert_eq!(metrics[0].labels().get("a"), Some("1"));
        assert_eq!(metrics.len(), 2);
    }
}
