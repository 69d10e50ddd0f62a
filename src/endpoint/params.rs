//! Query Parameters
//!
//! Parameter values, parameter sets, and the default tables for each query
//! family. Per-call overrides are layered on top of a family's defaults with
//! [`merge`].

use std::collections::BTreeMap;
use std::fmt;

/// A single query parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Query parameters keyed by name.
///
/// Keys are unique and iterate in sorted order, so the encoded query string
/// of a given set is always the same.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stringified pairs for URL encoding.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Layer `overrides` over `defaults`. Overrides win on key collisions; every
/// other default key is kept.
pub fn merge(defaults: &ParameterSet, overrides: &ParameterSet) -> ParameterSet {
    let mut merged = defaults.clone();
    for (key, value) in &overrides.entries {
        merged.entries.insert(key.clone(), value.clone());
    }
    merged
}

/// Show status filter for the near-location listing families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowStatus {
    Running,
    Upcoming,
    Closed,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Upcoming => "upcoming",
            Self::Closed => "closed",
        }
    }

    /// Sort order that lists the most relevant shows first.
    pub fn sort_criteria(&self) -> &'static str {
        match self {
            Self::Running => "end_at",
            Self::Upcoming => "start_at",
            Self::Closed => "-end_at",
        }
    }
}

/// Default page size for near-location show listings.
pub const NEAR_LOCATION_PAGE_SIZE: i64 = 5;

/// Page size for artwork and image listings.
pub const SHOW_CONTENT_PAGE_SIZE: i64 = 10;

/// Defaults for the near-location show listings of one status.
pub fn near_location_defaults(status: ShowStatus) -> ParameterSet {
    ParameterSet::new()
        .with("status", status.as_str())
        .with("sort", status.sort_criteria())
        .with("size", NEAR_LOCATION_PAGE_SIZE)
        .with("displayable", true)
        .with("at_a_fair", false)
}

/// Defaults for artworks in a show.
pub fn show_artworks_defaults() -> ParameterSet {
    ParameterSet::new()
        .with("published", true)
        .with("size", SHOW_CONTENT_PAGE_SIZE)
}

/// Defaults for installation images of a show.
pub fn show_images_defaults() -> ParameterSet {
    ParameterSet::new().with("size", SHOW_CONTENT_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_override_wins_on_collision() {
        let defaults = ParameterSet::new().with("size", 5i64).with("sort", "end_at");
        let overrides = ParameterSet::new().with("size", "20").with("page", 3u32);

        let merged = merge(&defaults, &overrides);

        assert_eq!(merged.get("size"), Some(&ParamValue::from("20")));
        assert_eq!(merged.get("sort"), Some(&ParamValue::from("end_at")));
        assert_eq!(merged.get("page"), Some(&ParamValue::Int(3)));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_is_total_over_union() {
        let defaults = near_location_defaults(ShowStatus::Running);
        let overrides: ParameterSet = [("near", "1,2"), ("status", "closed")].into_iter().collect();

        let merged = merge(&defaults, &overrides);

        for (key, _) in defaults.iter().chain(overrides.iter()) {
            assert!(merged.contains_key(key), "missing {key}");
        }
        for (key, value) in overrides.iter() {
            assert_eq!(merged.get(key), Some(value));
        }
        assert_eq!(merged.len(), 6);
    }

    #[test]
    fn test_merge_with_empty_sides() {
        let defaults = show_artworks_defaults();
        assert_eq!(merge(&defaults, &ParameterSet::new()), defaults);
        assert_eq!(merge(&ParameterSet::new(), &defaults), defaults);
    }

    #[test]
    fn test_empty_string_value_is_kept() {
        let merged = merge(
            &ParameterSet::new(),
            &ParameterSet::new().with("near", ""),
        );
        assert_eq!(merged.to_query_pairs(), vec![("near".to_string(), String::new())]);
    }

    #[test]
    fn test_upcoming_defaults() {
        let defaults = near_location_defaults(ShowStatus::Upcoming);
        assert_eq!(defaults.get("status"), Some(&ParamValue::from("upcoming")));
        assert_eq!(defaults.get("sort"), Some(&ParamValue::from("start_at")));
        assert_eq!(defaults.get("size"), Some(&ParamValue::Int(5)));
        assert_eq!(defaults.get("displayable"), Some(&ParamValue::Bool(true)));
        assert_eq!(defaults.get("at_a_fair"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_query_pairs_are_sorted_and_stringified() {
        let set = ParameterSet::new()
            .with("published", true)
            .with("page", 0u32)
            .with("size", 10i64);

        assert_eq!(
            set.to_query_pairs(),
            vec![
                ("page".to_string(), "0".to_string()),
                ("published".to_string(), "true".to_string()),
                ("size".to_string(), "10".to_string()),
            ]
        );
    }
}
