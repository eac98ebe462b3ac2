use crate::document::{Document, Value};
use crate::errors::DocMapResult;

/// An abstract document store a [crate::repository::Repository] runs on.
///
/// Implementations provide the raw document operations; the repository
/// layers typed mapping on top. Filters and sort specifications are plain
/// documents: a filter matches documents whose values equal the filter's
/// key/value pairs, and a sort document maps keys to `1` (ascending) or
/// `-1` (descending).
pub trait DocumentCollection: Send + Sync {
    /// Inserts one document, assigning an identity if it has none, and
    /// returns the identity under which it was stored.
    fn insert_one(&self, document: Document) -> DocMapResult<Value>;

    /// Inserts many documents in one call. Each document must already
    /// carry an identity.
    fn insert_many(&self, documents: Vec<Document>) -> DocMapResult<()>;

    /// Replaces the first document matching the filter with the given
    /// document, inserting it if nothing matches.
    fn replace_or_insert(&self, filter: &Document, document: Document) -> DocMapResult<()>;

    /// Finds documents matching the filter, optionally sorted, skipping
    /// and limiting the result window.
    fn find(
        &self,
        filter: &Document,
        sort: Option<&Document>,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> DocMapResult<Vec<Document>>;

    /// Finds the first document matching the filter.
    fn find_one(&self, filter: &Document) -> DocMapResult<Option<Document>> {
        Ok(self.find(filter, None, None, Some(1))?.into_iter().next())
    }

    /// Counts documents matching the filter.
    fn count(&self, filter: &Document) -> DocMapResult<u64>;

    /// Deletes the first document matching the filter and reports whether
    /// anything was removed.
    fn delete_one(&self, filter: &Document) -> DocMapResult<bool>;

    /// Deletes every document matching the filter and returns the number
    /// removed.
    fn delete_many(&self, filter: &Document) -> DocMapResult<u64>;

    /// Merges the update document's keys into every document matching the
    /// filter and returns the number touched.
    fn update_many(&self, filter: &Document, update: &Document) -> DocMapResult<u64>;
}
