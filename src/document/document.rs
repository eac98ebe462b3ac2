use crate::document::{Value, DOC_ID};
use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use indexmap::map::{IntoIter, Iter, Keys};
use indexmap::IndexMap;
use std::fmt::{Debug, Display, Formatter};

/// Represents a document: an ordered collection of key/[Value] pairs. It is
/// the unit of storage and the wire form that typed records serialize to.
///
/// # Purpose
/// Keys are non-empty strings; insertion order is preserved, so a record's
/// serialized form always lists fields in declaration order. The reserved key
/// `_id` carries the document's identity when present.
///
/// # Usage
/// Create documents using the `doc!` macro or the builder-style API:
/// ```text
/// let mut doc = Document::new();
/// doc.put("name", "Alice")?;
/// doc.put("age", 30i64)?;
///
/// let doc = doc! {
///     name: "Alice",
///     age: 30i64,
/// };
/// ```
#[derive(Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Eq for Document {}

impl Document {
    /// Creates a new empty [Document].
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of key/value pairs in the document.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Puts a key/value pair into the document, replacing any previous value
    /// under the same key. The key must not be empty.
    pub fn put<K, V>(&mut self, key: K, value: V) -> DocMapResult<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        if key.is_empty() {
            log::error!("document key cannot be empty");
            return Err(DocMapError::new(
                "document key cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.data.insert(key, value.into());
        Ok(())
    }

    /// Gets the value associated with the given key, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes the value associated with the given key and returns it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    /// Checks if the document contains the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over the key/value pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Returns an iterator over the keys in insertion order.
    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.data.keys()
    }

    /// Returns the identity value of the document, if present.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    /// Sets the identity value of the document.
    pub fn set_id<V: Into<Value>>(&mut self, id: V) {
        self.data.insert(DOC_ID.to_string(), id.into());
    }

    /// Checks if the document carries an identity value.
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

/// Strips the surrounding quotes a stringified macro key may carry.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use docmap::doc;
///
/// // Empty document
/// let empty = doc!{};
///
/// // Simple key-value pairs
/// let simple = doc!{
///     name: "Alice",
///     age: 30i64
/// };
///
/// // Nested documents and arrays
/// let complex = doc!{
///     user: {
///         name: "Charlie",
///         tags: ["admin", "user"]
///     },
///     values: [1i64, 2i64, 3i64]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    // match an empty document
    () => {
        $crate::document::Document::new()
    };

    // match a document with key value pairs
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::document::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::document::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, function call, arithmetic in parens, literals, etc.)
    ($value:expr) => {
        $crate::document::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ObjectId;

    fn set_up() -> Document {
        doc! {
            score: 1034i64,
            location: {
                state: "NY",
                city: "New York",
                address: {
                    line1: "40",
                    line2: "ABC Street",
                },
            },
            category: ["food", "produce", "grocery"],
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\"ABC\""), "ABC");
        assert_eq!(normalize("ABC"), "ABC");
    }

    #[test]
    fn test_empty_document() {
        let doc = doc! {};
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "Alice").unwrap();
        doc.put("age", 30i64).unwrap();
        assert_eq!(doc.get("name"), Some(&Value::from("Alice")));
        assert_eq!(doc.get("age"), Some(&Value::I64(30)));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut doc = Document::new();
        let result = doc.put("", 42i64);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            &crate::errors::ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn test_put_replaces() {
        let mut doc = Document::new();
        doc.put("key", 1i64).unwrap();
        doc.put("key", 2i64).unwrap();
        assert_eq!(doc.get("key"), Some(&Value::I64(2)));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut doc = set_up();
        let removed = doc.remove("score");
        assert_eq!(removed, Some(Value::I64(1034)));
        assert!(!doc.contains_key("score"));
        assert_eq!(doc.remove("score"), None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let doc = set_up();
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["score", "location", "category"]);
    }

    #[test]
    fn test_nested_document() {
        let doc = set_up();
        let location = doc.get("location").and_then(Value::as_document).unwrap();
        assert_eq!(location.get("state"), Some(&Value::from("NY")));
        let address = location.get("address").and_then(Value::as_document).unwrap();
        assert_eq!(address.get("line1"), Some(&Value::from("40")));
    }

    #[test]
    fn test_id_accessors() {
        let mut doc = Document::new();
        assert!(!doc.has_id());
        assert_eq!(doc.id(), None);

        let id = ObjectId::new();
        doc.set_id(id);
        assert!(doc.has_id());
        assert_eq!(doc.id(), Some(&Value::ObjectId(id)));
    }

    #[test]
    fn test_display() {
        let doc = doc! { name: "Alice", age: 30i64 };
        assert_eq!(doc.to_string(), "{\"name\": \"Alice\", \"age\": 30}");
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = doc! { x: 1i64, y: 2i64 };
        let b = doc! { x: 1i64, y: 2i64 };
        assert_eq!(a, b);
    }
}
