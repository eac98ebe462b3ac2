//! Typed repositories over an abstract document collection.

mod collection;
mod memory;
mod page;

pub use collection::DocumentCollection;
pub use memory::MemoryCollection;
pub use page::Page;

use crate::document::{Document, ObjectId, DOC_ID};
use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use crate::mapper::{deserialize, serialize, Codec, Record};
use crate::schema::{describe, SchemaDescriptor};
use std::marker::PhantomData;
use std::sync::Arc;

/// A typed CRUD facade over a [DocumentCollection].
///
/// The repository serializes records on the way in and deserializes
/// documents on the way out; the schema descriptor for `T` is resolved
/// once at construction, so misconfigured types fail fast.
///
/// # Examples
///
/// ```text
/// let repository = Repository::<Person, _>::new(MemoryCollection::new())?;
/// let saved = repository.save(&person)?;
/// let found = repository.find_by_id(&saved.id)?;
/// ```
pub struct Repository<T: Record, C: DocumentCollection> {
    collection: C,
    descriptor: Arc<SchemaDescriptor>,
    _record: PhantomData<T>,
}

impl<T: Record, C: DocumentCollection> Repository<T, C> {
    /// Creates a repository over the given collection, resolving the
    /// schema of `T` up front.
    pub fn new(collection: C) -> DocMapResult<Self> {
        let descriptor = describe::<T>()?;
        Ok(Repository {
            collection,
            descriptor,
            _record: PhantomData,
        })
    }

    /// Returns the underlying collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    fn require_identity(&self) -> DocMapResult<()> {
        if self.descriptor.identity().is_none() {
            log::error!(
                "type '{}' declares no identity field",
                self.descriptor.type_name()
            );
            return Err(DocMapError::new(
                format!(
                    "type '{}' declares no identity field",
                    self.descriptor.type_name()
                ),
                ErrorKind::Configuration,
            ));
        }
        Ok(())
    }

    fn id_filter<I: Codec>(&self, id: &I) -> DocMapResult<Document> {
        self.require_identity()?;
        let mut filter = Document::new();
        filter.put(DOC_ID, id.encode()?)?;
        Ok(filter)
    }

    /// Saves a record and returns it with its identity bound.
    ///
    /// A record already carrying an identity is upserted; one without is
    /// inserted and the store-assigned identity lands on the returned
    /// record.
    pub fn save(&self, record: &T) -> DocMapResult<T> {
        let mut document = serialize(record)?;
        match document.id().cloned() {
            Some(id) => {
                let mut filter = Document::new();
                filter.put(DOC_ID, id)?;
                self.collection.replace_or_insert(&filter, document.clone())?;
            }
            None => {
                let id = self.collection.insert_one(document.clone())?;
                document.set_id(id);
            }
        }
        deserialize(&document)
    }

    /// Saves many records in one bulk insert, assigning identities to
    /// those missing one. Unlike [Repository::save] there is no upsert
    /// path; every record lands in the batch as a new document.
    pub fn save_all(&self, records: &[T]) -> DocMapResult<Vec<T>> {
        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            let mut document = serialize(record)?;
            if !document.has_id() {
                // Identities are assigned here rather than by the store,
                // so the returned records never depend on the reply order
                // of the bulk insert.
                document.set_id(ObjectId::new());
            }
            documents.push(document);
        }

        self.collection.insert_many(documents.clone())?;
        documents.iter().map(deserialize).collect()
    }

    /// Finds the record stored under the given identity.
    pub fn find_by_id<I: Codec>(&self, id: &I) -> DocMapResult<Option<T>> {
        let filter = self.id_filter(id)?;
        match self.collection.find_one(&filter)? {
            Some(document) => Ok(Some(deserialize(&document)?)),
            None => Ok(None),
        }
    }

    /// Checks whether a record is stored under the given identity.
    pub fn exists_by_id<I: Codec>(&self, id: &I) -> DocMapResult<bool> {
        let filter = self.id_filter(id)?;
        Ok(self.collection.count(&filter)? > 0)
    }

    /// Finds all records matching the filter.
    pub fn find(&self, filter: &Document) -> DocMapResult<Vec<T>> {
        let documents = self.collection.find(filter, None, None, None)?;
        documents.iter().map(deserialize).collect()
    }

    /// Finds the first record matching the filter.
    pub fn find_one(&self, filter: &Document) -> DocMapResult<Option<T>> {
        match self.collection.find_one(filter)? {
            Some(document) => Ok(Some(deserialize(&document)?)),
            None => Ok(None),
        }
    }

    /// Returns every stored record.
    pub fn find_all(&self) -> DocMapResult<Vec<T>> {
        self.find(&Document::new())
    }

    /// Finds one page of records matching the filter, optionally sorted.
    ///
    /// Pages are zero-indexed; a zero page size is rejected.
    pub fn find_with_pagination(
        &self,
        filter: &Document,
        sort: Option<&Document>,
        page: u64,
        size: u64,
    ) -> DocMapResult<Page<T>> {
        if size == 0 {
            log::error!("page size must be greater than zero");
            return Err(DocMapError::new(
                "page size must be greater than zero",
                ErrorKind::InvalidOperation,
            ));
        }

        let total = self.collection.count(filter)?;
        let documents =
            self.collection
                .find(filter, sort, Some(page * size), Some(size))?;
        let content = documents
            .iter()
            .map(deserialize)
            .collect::<DocMapResult<Vec<T>>>()?;
        Ok(Page::new(content, total, page, size))
    }

    /// Counts records matching the filter.
    pub fn count(&self, filter: &Document) -> DocMapResult<u64> {
        self.collection.count(filter)
    }

    /// Counts all stored records.
    pub fn size(&self) -> DocMapResult<u64> {
        self.collection.count(&Document::new())
    }

    /// Deletes the record stored under the given identity and reports
    /// whether anything was removed.
    pub fn delete_by_id<I: Codec>(&self, id: &I) -> DocMapResult<bool> {
        let filter = self.id_filter(id)?;
        self.collection.delete_one(&filter)
    }

    /// Deletes the given record by its identity. A record that never got
    /// an identity matches nothing and reports `false`.
    pub fn delete(&self, record: &T) -> DocMapResult<bool> {
        self.require_identity()?;
        let document = serialize(record)?;
        match document.id() {
            Some(id) => {
                let mut filter = Document::new();
                filter.put(DOC_ID, id.clone())?;
                self.collection.delete_one(&filter)
            }
            None => Ok(false),
        }
    }

    /// Deletes every record matching the filter and returns the number
    /// removed.
    pub fn delete_many(&self, filter: &Document) -> DocMapResult<u64> {
        self.collection.delete_many(filter)
    }

    /// Deletes every stored record and returns the number removed.
    pub fn delete_all(&self) -> DocMapResult<u64> {
        self.collection.delete_many(&Document::new())
    }

    /// Merges the update document into every record matching the filter
    /// and returns the number touched.
    pub fn update(&self, filter: &Document, update: &Document) -> DocMapResult<u64> {
        self.collection.update_many(filter, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::document::Value;
    use crate::mapper::{FieldReader, FieldWriter};
    use crate::schema::FieldSpec;
    use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Person {
        id: ObjectId,
        name: String,
        age: i64,
        tags: Vec<String>,
    }

    impl Record for Person {
        fn type_name() -> &'static str {
            "Person"
        }

        fn field_specs() -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::identity("id"),
                FieldSpec::plain("name"),
                FieldSpec::plain("age"),
                FieldSpec::plain("tags"),
            ];
            FIELDS
        }

        fn encode_fields(&self, writer: &mut FieldWriter) -> DocMapResult<()> {
            writer.put("id", &self.id)?;
            writer.put("name", &self.name)?;
            writer.put("age", &self.age)?;
            writer.put("tags", &self.tags)
        }

        fn decode_fields(reader: &FieldReader) -> DocMapResult<Self> {
            Ok(Person {
                id: reader.read("id")?,
                name: reader.read("name")?,
                age: reader.read("age")?,
                tags: reader.read("tags")?,
            })
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Anonymous {
        name: String,
    }

    impl Record for Anonymous {
        fn type_name() -> &'static str {
            "Anonymous"
        }

        fn field_specs() -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[FieldSpec::plain("name")];
            FIELDS
        }

        fn encode_fields(&self, writer: &mut FieldWriter) -> DocMapResult<()> {
            writer.put("name", &self.name)
        }

        fn decode_fields(reader: &FieldReader) -> DocMapResult<Self> {
            Ok(Anonymous {
                name: reader.read("name")?,
            })
        }
    }

    #[derive(Default)]
    struct CountingCollection {
        inner: MemoryCollection,
        single_inserts: AtomicU64,
        bulk_inserts: AtomicU64,
        replaces: AtomicU64,
    }

    impl DocumentCollection for CountingCollection {
        fn insert_one(&self, document: Document) -> DocMapResult<Value> {
            self.single_inserts.fetch_add(1, AtomicOrdering::Relaxed);
            self.inner.insert_one(document)
        }

        fn insert_many(&self, documents: Vec<Document>) -> DocMapResult<()> {
            self.bulk_inserts.fetch_add(1, AtomicOrdering::Relaxed);
            self.inner.insert_many(documents)
        }

        fn replace_or_insert(&self, filter: &Document, document: Document) -> DocMapResult<()> {
            self.replaces.fetch_add(1, AtomicOrdering::Relaxed);
            self.inner.replace_or_insert(filter, document)
        }

        fn find(
            &self,
            filter: &Document,
            sort: Option<&Document>,
            skip: Option<u64>,
            limit: Option<u64>,
        ) -> DocMapResult<Vec<Document>> {
            self.inner.find(filter, sort, skip, limit)
        }

        fn count(&self, filter: &Document) -> DocMapResult<u64> {
            self.inner.count(filter)
        }

        fn delete_one(&self, filter: &Document) -> DocMapResult<bool> {
            self.inner.delete_one(filter)
        }

        fn delete_many(&self, filter: &Document) -> DocMapResult<u64> {
            self.inner.delete_many(filter)
        }

        fn update_many(&self, filter: &Document, update: &Document) -> DocMapResult<u64> {
            self.inner.update_many(filter, update)
        }
    }

    fn person(name: &str, age: i64) -> Person {
        Person {
            name: name.to_string(),
            age,
            tags: vec!["user".to_string()],
            ..Default::default()
        }
    }

    fn set_up() -> Repository<Person, MemoryCollection> {
        Repository::new(MemoryCollection::new()).unwrap()
    }

    #[test]
    fn test_save_assigns_identity() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        assert!(!saved.id.is_zero());
    }

    #[test]
    fn test_save_then_find_by_id() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        let found = repository.find_by_id(&saved.id).unwrap().unwrap();
        assert_eq!(found, saved);
    }

    #[test]
    fn test_save_with_identity_upserts() {
        let repository = set_up();
        let mut saved = repository.save(&person("alice", 30)).unwrap();
        saved.age = 31;
        let updated = repository.save(&saved).unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(repository.size().unwrap(), 1);
        let found = repository.find_by_id(&saved.id).unwrap().unwrap();
        assert_eq!(found.age, 31);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        repository.save(&saved).unwrap();
        repository.save(&saved).unwrap();
        assert_eq!(repository.size().unwrap(), 1);
    }

    #[test]
    fn test_save_all() {
        let repository = set_up();
        let people: Vec<Person> = (0..5).map(|i| person(&format!("p{}", i), i)).collect();
        let saved = repository.save_all(&people).unwrap();
        assert_eq!(saved.len(), 5);
        assert!(saved.iter().all(|p| !p.id.is_zero()));
        assert_eq!(repository.size().unwrap(), 5);
        // Returned records line up with the input order.
        for (original, stored) in people.iter().zip(&saved) {
            assert_eq!(original.name, stored.name);
        }
    }

    #[test]
    fn test_save_all_keeps_assigned_identities() {
        let repository = set_up();
        let mut tagged = person("alice", 30);
        tagged.id = ObjectId::new();
        let saved = repository
            .save_all(&[tagged.clone(), person("bob", 25)])
            .unwrap();
        assert_eq!(saved[0].id, tagged.id);
        assert!(!saved[1].id.is_zero());
        assert_eq!(repository.size().unwrap(), 2);
    }

    #[test]
    fn test_save_all_is_a_single_bulk_insert() {
        let repository: Repository<Person, CountingCollection> =
            Repository::new(CountingCollection::default()).unwrap();
        let mut tagged = person("alice", 30);
        tagged.id = ObjectId::new();
        repository
            .save_all(&[tagged, person("bob", 25), person("carol", 40)])
            .unwrap();
        // Identity-carrying records go through the same batch; nothing
        // is upserted one at a time.
        let collection = repository.collection();
        assert_eq!(collection.bulk_inserts.load(AtomicOrdering::Relaxed), 1);
        assert_eq!(collection.replaces.load(AtomicOrdering::Relaxed), 0);
        assert_eq!(collection.single_inserts.load(AtomicOrdering::Relaxed), 0);
        assert_eq!(repository.size().unwrap(), 3);
    }

    #[test]
    fn test_find_by_id_missing() {
        let repository = set_up();
        assert!(repository.find_by_id(&ObjectId::new()).unwrap().is_none());
    }

    #[test]
    fn test_exists_by_id() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        assert!(repository.exists_by_id(&saved.id).unwrap());
        assert!(!repository.exists_by_id(&ObjectId::new()).unwrap());
    }

    #[test]
    fn test_find_with_filter() {
        let repository = set_up();
        repository.save(&person("alice", 30)).unwrap();
        repository.save(&person("bob", 25)).unwrap();
        repository.save(&person("carol", 30)).unwrap();
        let found = repository.find(&doc! { age: 30i64 }).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_all() {
        let repository = set_up();
        repository.save(&person("alice", 30)).unwrap();
        repository.save(&person("bob", 25)).unwrap();
        assert_eq!(repository.find_all().unwrap().len(), 2);
    }

    #[test]
    fn test_pagination() {
        let repository = set_up();
        for i in 0..25 {
            repository.save(&person(&format!("p{:02}", i), i)).unwrap();
        }

        let first = repository
            .find_with_pagination(&doc! {}, Some(&doc! { age: 1i64 }), 0, 10)
            .unwrap();
        assert_eq!(first.content().len(), 10);
        assert_eq!(first.total_elements(), 25);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!(first.content()[0].age, 0);

        let last = repository
            .find_with_pagination(&doc! {}, Some(&doc! { age: 1i64 }), 2, 10)
            .unwrap();
        assert_eq!(last.content().len(), 5);
        assert!(!last.has_next());
        assert!(last.has_previous());
        assert_eq!(last.content()[4].age, 24);
    }

    #[test]
    fn test_pagination_rejects_zero_size() {
        let repository = set_up();
        let result = repository.find_with_pagination(&doc! {}, None, 0, 0);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_delete_by_id() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        assert!(repository.delete_by_id(&saved.id).unwrap());
        assert!(!repository.delete_by_id(&saved.id).unwrap());
        assert_eq!(repository.size().unwrap(), 0);
    }

    #[test]
    fn test_delete_record() {
        let repository = set_up();
        let saved = repository.save(&person("alice", 30)).unwrap();
        assert!(repository.delete(&saved).unwrap());
        // A record that never got an identity matches nothing.
        assert!(!repository.delete(&person("ghost", 0)).unwrap());
    }

    #[test]
    fn test_delete_many_and_all() {
        let repository = set_up();
        repository.save(&person("alice", 30)).unwrap();
        repository.save(&person("bob", 25)).unwrap();
        repository.save(&person("carol", 30)).unwrap();
        assert_eq!(repository.delete_many(&doc! { age: 30i64 }).unwrap(), 2);
        assert_eq!(repository.delete_all().unwrap(), 1);
        assert_eq!(repository.size().unwrap(), 0);
    }

    #[test]
    fn test_update() {
        let repository = set_up();
        repository.save(&person("alice", 30)).unwrap();
        repository.save(&person("carol", 30)).unwrap();
        let touched = repository
            .update(&doc! { age: 30i64 }, &doc! { age: 31i64 })
            .unwrap();
        assert_eq!(touched, 2);
        assert_eq!(repository.find(&doc! { age: 31i64 }).unwrap().len(), 2);
    }

    #[test]
    fn test_id_operations_need_identity_field() {
        let repository: Repository<Anonymous, MemoryCollection> =
            Repository::new(MemoryCollection::new()).unwrap();
        let result = repository.find_by_id(&ObjectId::new());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Configuration);
    }
}
