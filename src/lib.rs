//! # DocMap - Object-Document Mapping
//!
//! DocMap is a lightweight object-document mapping layer written in Rust.
//! It maps typed records to schemaless documents and back, and layers a
//! typed repository API over any document store implementing the
//! [repository::DocumentCollection] trait.
//!
//! ## Key Features
//!
//! - **Schema Descriptors**: Per-type field tables mapping record fields to
//!   document keys, with identity, embedded and reference roles
//! - **Value Codec**: Lenient scalar conversions between Rust types and the
//!   document value model
//! - **Document Mapper**: Recursive serialization with sparse output, key
//!   renames, identity handling and reference flattening
//! - **Generic Repository**: Typed CRUD, bulk saves and pagination over an
//!   abstract collection
//! - **In-Memory Collection**: A ready-made store for tests and embedded use
//!
//! ## Quick Start
//!
//! ```rust
//! use docmap::document::ObjectId;
//! use docmap::errors::DocMapResult;
//! use docmap::mapper::{FieldReader, FieldWriter, Record};
//! use docmap::repository::{MemoryCollection, Repository};
//! use docmap::schema::FieldSpec;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     id: ObjectId,
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for Person {
//!     fn type_name() -> &'static str {
//!         "Person"
//!     }
//!
//!     fn field_specs() -> &'static [FieldSpec] {
//!         const FIELDS: &[FieldSpec] = &[
//!             FieldSpec::identity("id"),
//!             FieldSpec::plain("name"),
//!             FieldSpec::plain("age"),
//!         ];
//!         FIELDS
//!     }
//!
//!     fn encode_fields(&self, writer: &mut FieldWriter) -> DocMapResult<()> {
//!         writer.put("id", &self.id)?;
//!         writer.put("name", &self.name)?;
//!         writer.put("age", &self.age)
//!     }
//!
//!     fn decode_fields(reader: &FieldReader) -> DocMapResult<Self> {
//!         Ok(Person {
//!             id: reader.read("id")?,
//!             name: reader.read("name")?,
//!             age: reader.read("age")?,
//!         })
//!     }
//! }
//!
//! # fn main() -> DocMapResult<()> {
//! let repository = Repository::<Person, _>::new(MemoryCollection::new())?;
//!
//! let saved = repository.save(&Person {
//!     name: "Alice".to_string(),
//!     age: 30,
//!     ..Default::default()
//! })?;
//!
//! let found = repository.find_by_id(&saved.id)?;
//! assert_eq!(found, Some(saved));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod errors;
pub mod mapper;
pub mod query;
pub mod repository;
pub mod schema;

pub use document::{Document, ObjectId, Value};
pub use errors::{DocMapError, DocMapResult, ErrorKind};
pub use mapper::{deserialize, serialize, Codec, Record, Ref};
pub use repository::{DocumentCollection, MemoryCollection, Page, Repository};
