//! Fluent builders for filter and sort documents.

use crate::document::{Document, Value};
use crate::errors::DocMapResult;

/// A fluent builder for equality filters.
///
/// Conditions combine as a conjunction: a document matches when every
/// condition's key holds the condition's value. An empty query matches
/// everything.
///
/// # Examples
///
/// ```rust
/// use docmap::query::Query;
///
/// let filter = Query::new()
///     .eq("name", "alice")
///     .eq("age", 30i64)
///     .to_document()
///     .unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct Query {
    conditions: Vec<(String, Value)>,
}

impl Query {
    /// Creates an empty query matching everything.
    pub fn new() -> Self {
        Query::default()
    }

    /// Adds an equality condition on the given key.
    pub fn eq<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// Builds the filter document.
    pub fn to_document(self) -> DocMapResult<Document> {
        let mut filter = Document::new();
        for (key, value) in self.conditions {
            filter.put(key, value)?;
        }
        Ok(filter)
    }
}

/// A fluent builder for sort specifications.
///
/// Keys are applied in the order they were added; later keys break ties
/// left by earlier ones.
///
/// # Examples
///
/// ```rust
/// use docmap::query::Sort;
///
/// let sort = Sort::new().asc("age").desc("name").to_document().unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct Sort {
    keys: Vec<(String, i32)>,
}

impl Sort {
    /// Creates an empty sort specification.
    pub fn new() -> Self {
        Sort::default()
    }

    /// Sorts ascending by the given key.
    pub fn asc<K: Into<String>>(mut self, key: K) -> Self {
        self.keys.push((key.into(), 1));
        self
    }

    /// Sorts descending by the given key.
    pub fn desc<K: Into<String>>(mut self, key: K) -> Self {
        self.keys.push((key.into(), -1));
        self
    }

    /// Builds the sort document.
    pub fn to_document(self) -> DocMapResult<Document> {
        let mut sort = Document::new();
        for (key, direction) in self.keys {
            sort.put(key, direction)?;
        }
        Ok(sort)
    }
}
