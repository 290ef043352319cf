//! Label sets attached to metrics, and label predicates used to filter them.
//!
//! `LabelSet` keeps insertion order so serialization is deterministic and
//! matches the order labels were configured in. Every key/value goes through
//! `set`, which validates before storing; there is no unchecked insert.
//!
//! Known limitation: values are double-quoted on output but embedded quotes
//! are not escaped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ExporterError, Result};

/// Identifier pattern shared by metric names and label keys.
#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("name pattern must compile")
});

/// True if `name` is a valid metric name or label key.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Ordered, validated mapping of label key to label value.
///
/// Equality is structural: two sets are equal when they hold the same
/// pairs, regardless of insertion order. `clone()` is a deep copy.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Build a set from key/value pairs, validating each one.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        set.update(pairs)?;
        Ok(set)
    }

    /// Validate and store a pair. An existing key is overwritten in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();

        if !is_valid_name(&key) {
            return Err(ExporterError::Validation(format!("invalid label name: {key:?}")));
        }
        if value.is_empty() {
            return Err(ExporterError::Validation(format!("label {key} has an empty value")));
        }

        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
        Ok(())
    }

    /// Call `set` for every pair, stopping at the first invalid one.
    ///
    /// Pairs applied before the failure stay applied; the failing pair
    /// leaves the set untouched.
    pub fn update<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            let (k, v) = (k.into(), v.into());
            tracing::debug!(label = %k, value = %v, "adding label");
            self.set(k, v)?;
        }
        Ok(())
    }

    /// Layer `other` on top of this set (other's keys win).
    pub fn merge(&mut self, other: &LabelSet) {
        for (k, v) in &other.pairs {
            match self.pairs.iter_mut().find(|(key, _)| key == k) {
                Some((_, value)) => value.clone_from(v),
                None => self.pairs.push((k.clone(), v.clone())),
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Best-effort AND match: every predicate key this set defines must
    /// carry the predicate's value. Predicate keys this set does not
    /// define are ignored.
    pub fn matches(&self, predicate: &LabelFilter) -> bool {
        predicate
            .iter()
            .all(|(k, want)| self.get(k).map_or(true, |have| have == want))
    }

    /// `key="value",key2="value2"` in insertion order.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for LabelSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for LabelSet {}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}=\"{v}\"")?;
        }
        Ok(())
    }
}

/// Label predicate: required key/value pairs, in the order given.
///
/// Unlike `LabelSet` nothing is validated; a predicate may name keys no
/// metric defines. Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    pairs: Vec<(String, String)>,
}

impl LabelFilter {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (k, v) in iter {
            filter.insert(k, v);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn set_then_get() {
        let mut labels = LabelSet::new();
        labels.set("a", "1234").unwrap();
        labels.set("_b", "x").unwrap();
        assert_eq!(labels.get("a"), Some("1234"));
        assert_eq!(labels.get("_b"), Some("x"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn rejects_bad_keys_and_empty_values() {
        let mut labels = LabelSet::new();
        for key in ["1a", "", "a-b", "a b", "é"] {
            let err = labels.set(key, "v").expect_err("key must be rejected");
            assert_eq!(err.code().as_str(), "VALIDATION", "key={key:?}");
        }
        let err = labels.set("a", "").expect_err("empty value");
        assert_eq!(err.code().as_str(), "VALIDATION");
        assert!(labels.is_empty());
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut labels = LabelSet::from_pairs([("a", "1"), ("b", "2")]).unwrap();
        labels.set("a", "3").unwrap();
        assert_eq!(labels.serialize(), r#"a="3",b="2""#);
    }

    #[test]
    fn update_stops_at_first_bad_pair() {
        let mut labels = LabelSet::from_pairs([("keep", "me")]).unwrap();
        let err = labels
            .update([("a", "1"), ("2bad", "x"), ("c", "3")])
            .expect_err("bad key");
        assert_eq!(err.code().as_str(), "VALIDATION");
        assert_eq!(labels.get("keep"), Some("me"));
        assert_eq!(labels.get("a"), Some("1"));
        assert!(!labels.contains_key("c"));
    }

    #[test]
    fn copy_is_independent() {
        let original = LabelSet::from_pairs([("a", "1234"), ("b", "5678")]).unwrap();
        let snapshot = original.clone();

        let mut copy = original.clone();
        copy.set("a", "changed").unwrap();
        copy.set("b", "changed").unwrap();
        assert_eq!(original, snapshot);

        let mut original = original;
        original.set("c", "new").unwrap();
        assert!(!copy.contains_key("c"));
    }

    #[test]
    fn equality_ignores_order() {
        let x = LabelSet::from_pairs([("a", "1"), ("b", "2")]).unwrap();
        let y = LabelSet::from_pairs([("b", "2"), ("a", "1")]).unwrap();
        let z = LabelSet::from_pairs([("a", "1")]).unwrap();
        assert_eq!(x, y);
        assert_ne!(x, z);
    }

    #[test]
    fn serialize_in_insertion_order() {
        let labels = LabelSet::from_pairs([("zone", "eu"), ("app", "web")]).unwrap();
        assert_eq!(labels.serialize(), r#"zone="eu",app="web""#);
        assert_eq!(LabelSet::new().serialize(), "");
    }

    #[test]
    fn matches_ignores_undefined_keys() {
        let labels = LabelSet::from_pairs([("a", "1")]).unwrap();
        let hit: LabelFilter = [("a", "1"), ("zzz", "whatever")].into_iter().collect();
        let miss: LabelFilter = [("a", "2")].into_iter().collect();
        assert!(labels.matches(&hit));
        assert!(!labels.matches(&miss));
        assert!(labels.matches(&LabelFilter::new()));
    }

    #[test]
    fn filter_last_insert_wins() {
        let filter: LabelFilter = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let pairs: Vec<(&str, &str)> = filter.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }
}
