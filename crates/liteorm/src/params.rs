//! Bound parameter storage.
//!
//! Every value that originates from user or model data travels through a
//! [`Params`] map and reaches the backend as a named placeholder. Nothing in
//! this crate ever interpolates such a value into SQL text.

use crate::value::Value;

/// An insertion-ordered mapping of placeholder name to bound value.
///
/// Placeholder names include the leading `:` and are unique within one
/// statement (the builder suffixes a monotonic counter).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under `name`.
    pub fn insert(&mut self, name: String, value: Value) {
        self.entries.push((name, value));
    }

    /// Look up a bound value by placeholder name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate over placeholder names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}
