//! Result rows returned by the storage backend.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};

/// One result row: an insertion-ordered mapping of column name to value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Append a column. A repeated name overwrites the earlier value.
    pub fn insert(&mut self, column: String, value: Value) {
        match self.entries.iter_mut().find(|(n, _)| *n == column) {
            Some((_, v)) => *v = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == column)
            .map(|(_, v)| v)
    }

    /// Typed access to a column; absence and type mismatches are decode errors.
    pub fn try_get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .cloned()
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))?;
        value.decode(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
