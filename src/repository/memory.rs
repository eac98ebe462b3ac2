use crate::document::{Document, ObjectId, Value};
use crate::errors::DocMapResult;
use crate::repository::collection::DocumentCollection;
use parking_lot::RwLock;
use std::cmp::Ordering;

/// An in-memory [DocumentCollection] backed by a lock-guarded vector.
///
/// Intended for tests and small embedded use; documents keep insertion
/// order until sorted by a find.
#[derive(Default)]
pub struct MemoryCollection {
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        MemoryCollection {
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Checks whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn compare(a: &Document, b: &Document, sort: &Document) -> Ordering {
    const NULL: Value = Value::Null;
    for (key, direction) in sort.iter() {
        let left = a.get(key).unwrap_or(&NULL);
        let right = b.get(key).unwrap_or(&NULL);
        let ordering = match direction.as_integer() {
            Some(d) if d < 0 => right.cmp(left),
            _ => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl DocumentCollection for MemoryCollection {
    fn insert_one(&self, mut document: Document) -> DocMapResult<Value> {
        let id = match document.id() {
            Some(id) => id.clone(),
            None => {
                let id = Value::ObjectId(ObjectId::new());
                document.set_id(id.clone());
                id
            }
        };
        self.documents.write().push(document);
        Ok(id)
    }

    fn insert_many(&self, documents: Vec<Document>) -> DocMapResult<()> {
        self.documents.write().extend(documents);
        Ok(())
    }

    fn replace_or_insert(&self, filter: &Document, document: Document) -> DocMapResult<()> {
        let mut store = self.documents.write();
        match store.iter_mut().find(|d| matches(d, filter)) {
            Some(existing) => *existing = document,
            None => store.push(document),
        }
        Ok(())
    }

    fn find(
        &self,
        filter: &Document,
        sort: Option<&Document>,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> DocMapResult<Vec<Document>> {
        let store = self.documents.read();
        let mut found: Vec<Document> = store
            .iter()
            .filter(|d| matches(d, filter))
            .cloned()
            .collect();

        if let Some(sort) = sort {
            found.sort_by(|a, b| compare(a, b, sort));
        }

        let skip = skip.unwrap_or(0) as usize;
        let result = match limit {
            Some(limit) => found.into_iter().skip(skip).take(limit as usize).collect(),
            None => found.into_iter().skip(skip).collect(),
        };
        Ok(result)
    }

    fn count(&self, filter: &Document) -> DocMapResult<u64> {
        let store = self.documents.read();
        Ok(store.iter().filter(|d| matches(d, filter)).count() as u64)
    }

    fn delete_one(&self, filter: &Document) -> DocMapResult<bool> {
        let mut store = self.documents.write();
        match store.iter().position(|d| matches(d, filter)) {
            Some(index) => {
                store.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_many(&self, filter: &Document) -> DocMapResult<u64> {
        let mut store = self.documents.write();
        let before = store.len();
        store.retain(|d| !matches(d, filter));
        Ok((before - store.len()) as u64)
    }

    fn update_many(&self, filter: &Document, update: &Document) -> DocMapResult<u64> {
        let mut store = self.documents.write();
        let mut touched = 0;
        for document in store.iter_mut().filter(|d| matches(d, filter)) {
            for (key, value) in update.iter() {
                document.put(key.clone(), value.clone())?;
            }
            touched += 1;
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> MemoryCollection {
        let collection = MemoryCollection::new();
        collection
            .insert_one(doc! { name: "alice", age: 30i64 })
            .unwrap();
        collection
            .insert_one(doc! { name: "bob", age: 25i64 })
            .unwrap();
        collection
            .insert_one(doc! { name: "carol", age: 30i64 })
            .unwrap();
        collection
    }

    #[test]
    fn test_insert_assigns_id() {
        let collection = MemoryCollection::new();
        let id = collection.insert_one(doc! { name: "alice" }).unwrap();
        assert!(id.is_object_id());
        let found = collection.find_one(&doc! { name: "alice" }).unwrap().unwrap();
        assert_eq!(found.id(), Some(&id));
    }

    #[test]
    fn test_insert_keeps_existing_id() {
        let collection = MemoryCollection::new();
        let id = ObjectId::new();
        let mut doc = doc! { name: "alice" };
        doc.set_id(id);
        let stored = collection.insert_one(doc).unwrap();
        assert_eq!(stored, Value::ObjectId(id));
    }

    #[test]
    fn test_find_with_filter() {
        let collection = set_up();
        let found = collection
            .find(&doc! { age: 30i64 }, None, None, None)
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let collection = set_up();
        let found = collection.find(&doc! {}, None, None, None).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_find_sorted() {
        let collection = set_up();
        let found = collection
            .find(&doc! {}, Some(&doc! { age: 1i64, name: (-1i64) }), None, None)
            .unwrap();
        let names: Vec<&Value> = found.iter().map(|d| d.get("name").unwrap()).collect();
        assert_eq!(
            names,
            vec![&Value::from("bob"), &Value::from("carol"), &Value::from("alice")]
        );
    }

    #[test]
    fn test_skip_and_limit() {
        let collection = set_up();
        let found = collection
            .find(&doc! {}, Some(&doc! { name: 1i64 }), Some(1), Some(1))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("name"), Some(&Value::from("bob")));
    }

    #[test]
    fn test_count() {
        let collection = set_up();
        assert_eq!(collection.count(&doc! {}).unwrap(), 3);
        assert_eq!(collection.count(&doc! { age: 30i64 }).unwrap(), 2);
        assert_eq!(collection.count(&doc! { age: 99i64 }).unwrap(), 0);
    }

    #[test]
    fn test_replace_or_insert_replaces() {
        let collection = set_up();
        collection
            .replace_or_insert(&doc! { name: "alice" }, doc! { name: "alice", age: 31i64 })
            .unwrap();
        assert_eq!(collection.len(), 3);
        let found = collection.find_one(&doc! { name: "alice" }).unwrap().unwrap();
        assert_eq!(found.get("age"), Some(&Value::I64(31)));
    }

    #[test]
    fn test_replace_or_insert_inserts() {
        let collection = set_up();
        collection
            .replace_or_insert(&doc! { name: "dave" }, doc! { name: "dave", age: 40i64 })
            .unwrap();
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_delete_one() {
        let collection = set_up();
        assert!(collection.delete_one(&doc! { name: "bob" }).unwrap());
        assert_eq!(collection.len(), 2);
        assert!(!collection.delete_one(&doc! { name: "bob" }).unwrap());
    }

    #[test]
    fn test_delete_many() {
        let collection = set_up();
        let removed = collection.delete_many(&doc! { age: 30i64 }).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_update_many() {
        let collection = set_up();
        let touched = collection
            .update_many(&doc! { age: 30i64 }, &doc! { age: 31i64 })
            .unwrap();
        assert_eq!(touched, 2);
        assert_eq!(collection.count(&doc! { age: 31i64 }).unwrap(), 2);
    }
}
