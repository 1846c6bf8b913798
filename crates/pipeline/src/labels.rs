//! Label sets
//!
//! Ordered string-to-string maps attached to every entry flowing through the
//! pipeline. Ordering is deterministic (sorted by key) so rendered output and
//! test assertions are stable.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
#[path = "labels_test.rs"]
mod tests;

/// An ordered set of `name=value` labels
///
/// Cheap to clone for the sizes seen in practice (a handful of labels per
/// stream). Stages that buffer entries own their own clone; a caller's map is
/// never retained by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    /// Create an empty label set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a label, returning the previous value for the name if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Get a label value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Merge `other` into this set; on name collision the incoming value wins
    pub fn merge(&mut self, other: &Labels) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Remove all labels
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of labels in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={:?}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, String)> for Labels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Labels {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
