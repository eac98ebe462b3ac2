//! The document mapper: turns typed records into [Document]s and back.
//!
//! A type opts in by implementing [Record]: a static field table describing
//! how each field maps to a document key, plus `encode_fields` and
//! `decode_fields` which move the field values through a [FieldWriter] or
//! [FieldReader]. The writer and reader own all mapping policy: key
//! renames, sparse serialization of absent values, identity handling and
//! reference flattening.

mod codec;

pub use codec::{decode, encode, Codec};

use crate::document::{Document, ObjectId, Value};
use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use crate::schema::{describe, FieldRole, FieldSpec, SchemaDescriptor};
use std::sync::Arc;

const NULL: Value = Value::Null;

/// A type that maps to and from a [Document].
///
/// Implementations declare their field table once and hand field values
/// to the writer and reader by field name; everything key-related lives
/// in the table.
///
/// # Examples
///
/// ```rust
/// use docmap::document::ObjectId;
/// use docmap::errors::DocMapResult;
/// use docmap::mapper::{FieldReader, FieldWriter, Record};
/// use docmap::schema::FieldSpec;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Person {
///     id: ObjectId,
///     name: String,
///     age: i64,
/// }
///
/// impl Record for Person {
///     fn type_name() -> &'static str {
///         "Person"
///     }
///
///     fn field_specs() -> &'static [FieldSpec] {
///         const FIELDS: &[FieldSpec] = &[
///             FieldSpec::identity("id"),
///             FieldSpec::plain("name"),
///             FieldSpec::plain("age"),
///         ];
///         FIELDS
///     }
///
///     fn encode_fields(&self, writer: &mut FieldWriter) -> DocMapResult<()> {
///         writer.put("id", &self.id)?;
///         writer.put("name", &self.name)?;
///         writer.put("age", &self.age)
///     }
///
///     fn decode_fields(reader: &FieldReader) -> DocMapResult<Self> {
///         Ok(Person {
///             id: reader.read("id")?,
///             name: reader.read("name")?,
///             age: reader.read("age")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    /// The name used in schema diagnostics.
    fn type_name() -> &'static str;

    /// The static field table for this type.
    fn field_specs() -> &'static [FieldSpec];

    /// Writes each field through the given writer.
    fn encode_fields(&self, writer: &mut FieldWriter) -> DocMapResult<()>;

    /// Reads each field from the given reader.
    fn decode_fields(reader: &FieldReader) -> DocMapResult<Self>;
}

/// Serializes a record into a [Document].
///
/// Fields whose value encodes to [Value::Null] are omitted, as is an
/// identity field still carrying the unassigned sentinel.
pub fn serialize<T: Record>(record: &T) -> DocMapResult<Document> {
    let descriptor = describe::<T>()?;
    let mut writer = FieldWriter::new(descriptor);
    record.encode_fields(&mut writer)?;
    Ok(writer.into_document())
}

/// Deserializes a record from a [Document].
///
/// Keys absent from the document decode as [Value::Null], so scalar
/// fields fall back to their zero values.
pub fn deserialize<T: Record>(document: &Document) -> DocMapResult<T> {
    let descriptor = describe::<T>()?;
    let reader = FieldReader::new(descriptor, document);
    T::decode_fields(&reader)
}

/// A link to a record stored in another collection.
///
/// Serializing writes only the target's identity; deserializing yields
/// [Ref::Id] without touching the referenced collection, leaving the
/// fetch to the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum Ref<T> {
    /// An unresolved link holding the target's identity value. The
    /// [Value::Null] identity means no target.
    Id(Value),
    /// A resolved link holding the target record.
    Loaded(T),
}

impl<T> Ref<T> {
    /// Checks whether the link holds a resolved record.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Ref::Loaded(_))
    }

    /// Checks whether the link points at nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Ref::Id(Value::Null))
    }

    /// Returns the resolved record, if loaded.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Ref::Loaded(v) => Some(v),
            Ref::Id(_) => None,
        }
    }

    /// Returns the unresolved identity, if not loaded.
    pub fn id(&self) -> Option<&Value> {
        match self {
            Ref::Id(v) => Some(v),
            Ref::Loaded(_) => None,
        }
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Ref::Id(Value::Null)
    }
}

impl<T> From<ObjectId> for Ref<T> {
    fn from(id: ObjectId) -> Self {
        Ref::Id(Value::ObjectId(id))
    }
}

/// Writes record fields into a [Document] according to the type's schema.
pub struct FieldWriter {
    descriptor: Arc<SchemaDescriptor>,
    out: Document,
}

impl FieldWriter {
    fn new(descriptor: Arc<SchemaDescriptor>) -> Self {
        FieldWriter {
            descriptor,
            out: Document::new(),
        }
    }

    fn into_document(self) -> Document {
        self.out
    }

    /// Encodes and writes one field.
    pub fn put<T: Codec>(&mut self, field: &str, value: &T) -> DocMapResult<()> {
        let encoded = value.encode()?;
        self.put_value(field, encoded)
    }

    /// Writes an embedded record field.
    pub fn put_record<T: Record>(&mut self, field: &str, record: &T) -> DocMapResult<()> {
        self.put_value(field, Value::Document(serialize(record)?))
    }

    /// Writes an array of embedded records.
    pub fn put_records<T: Record>(&mut self, field: &str, records: &[T]) -> DocMapResult<()> {
        let items = records
            .iter()
            .map(|r| serialize(r).map(Value::Document))
            .collect::<DocMapResult<Vec<Value>>>()?;
        self.put_value(field, Value::Array(items))
    }

    /// Writes a reference field. Only the target's identity reaches the
    /// document; a loaded target that carries no identity is embedded
    /// whole instead.
    pub fn put_ref<T: Record>(&mut self, field: &str, link: &Ref<T>) -> DocMapResult<()> {
        let value = match link {
            Ref::Id(id) => id.clone(),
            Ref::Loaded(record) => Value::Document(serialize(record)?),
        };
        self.put_value(field, value)
    }

    /// Writes an array of reference fields.
    pub fn put_refs<T: Record>(&mut self, field: &str, links: &[Ref<T>]) -> DocMapResult<()> {
        let items = links
            .iter()
            .map(|link| match link {
                Ref::Id(id) => Ok(id.clone()),
                Ref::Loaded(record) => serialize(record).map(Value::Document),
            })
            .collect::<DocMapResult<Vec<Value>>>()?;
        self.put_value(field, Value::Array(items))
    }

    /// Writes an already-encoded value under the given field, applying
    /// the field's role.
    pub fn put_value(&mut self, field: &str, value: Value) -> DocMapResult<()> {
        let resolved = self.descriptor.field(field).ok_or_else(|| {
            log::error!(
                "type '{}' has no field named '{}'",
                self.descriptor.type_name(),
                field
            );
            DocMapError::new(
                format!(
                    "type '{}' has no field named '{}'",
                    self.descriptor.type_name(),
                    field
                ),
                ErrorKind::Mapping,
            )
        })?;

        let value = match resolved.role {
            FieldRole::Identity => {
                // The unassigned sentinel means the record has no identity
                // yet; leaving the key out lets the store assign one.
                if value.is_null() || matches!(value, Value::ObjectId(id) if id.is_zero()) {
                    return Ok(());
                }
                value
            }
            FieldRole::Reference(_) => flatten_reference(value),
            FieldRole::Embedded | FieldRole::Plain => value,
        };

        if value.is_null() {
            return Ok(());
        }

        self.out.put(resolved.key, value)
    }
}

// A loaded reference serializes as its target's identity. A target that
// never got an identity degrades to embedding so no data is lost.
fn flatten_reference(value: Value) -> Value {
    match value {
        Value::Document(doc) => match doc.id() {
            Some(id) => id.clone(),
            None => Value::Document(doc),
        },
        Value::Array(items) => {
            Value::Array(items.into_iter().map(flatten_reference).collect())
        }
        other => other,
    }
}

/// Reads record fields from a [Document] according to the type's schema.
pub struct FieldReader<'a> {
    descriptor: Arc<SchemaDescriptor>,
    document: &'a Document,
}

impl<'a> FieldReader<'a> {
    fn new(descriptor: Arc<SchemaDescriptor>, document: &'a Document) -> Self {
        FieldReader {
            descriptor,
            document,
        }
    }

    /// Reads and decodes one field. An absent key decodes from
    /// [Value::Null].
    pub fn read<T: Codec>(&self, field: &str) -> DocMapResult<T> {
        T::decode(self.value(field)?)
    }

    /// Reads an embedded record field. An absent key yields a record
    /// decoded from an empty document.
    pub fn read_record<T: Record>(&self, field: &str) -> DocMapResult<T> {
        match self.value(field)? {
            Value::Null => deserialize(&Document::new()),
            Value::Document(doc) => deserialize(doc),
            other => Err(self.type_error(field, other)),
        }
    }

    /// Reads an array of embedded records. An absent key yields an empty
    /// vector.
    pub fn read_records<T: Record>(&self, field: &str) -> DocMapResult<Vec<T>> {
        match self.value(field)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Document(doc) => deserialize(doc),
                    other => Err(self.type_error(field, other)),
                })
                .collect(),
            other => Err(self.type_error(field, other)),
        }
    }

    /// Reads a reference field. The stored identity is kept unresolved;
    /// a document stored in place decodes as a loaded target.
    pub fn read_ref<T: Record>(&self, field: &str) -> DocMapResult<Ref<T>> {
        Self::link_from(self.value(field)?)
    }

    /// Reads an array of reference fields.
    pub fn read_refs<T: Record>(&self, field: &str) -> DocMapResult<Vec<Ref<T>>> {
        match self.value(field)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(Self::link_from).collect(),
            other => Err(self.type_error(field, other)),
        }
    }

    fn link_from<T: Record>(value: &Value) -> DocMapResult<Ref<T>> {
        match value {
            Value::Document(doc) => Ok(Ref::Loaded(deserialize(doc)?)),
            other => Ok(Ref::Id(other.clone())),
        }
    }

    fn value(&self, field: &str) -> DocMapResult<&Value> {
        let resolved = self.descriptor.field(field).ok_or_else(|| {
            DocMapError::new(
                format!(
                    "type '{}' has no field named '{}'",
                    self.descriptor.type_name(),
                    field
                ),
                ErrorKind::Mapping,
            )
        })?;
        Ok(self.document.get(resolved.key).unwrap_or(&NULL))
    }

    fn type_error(&self, field: &str, value: &Value) -> DocMapError {
        log::error!(
            "field '{}' of '{}' cannot decode from {:?}",
            field,
            self.descriptor.type_name(),
            value
        );
        DocMapError::new(
            format!(
                "field '{}' of '{}' cannot decode from {:?}",
                field,
                self.descriptor.type_name(),
                value
            ),
            ErrorKind::Mapping,
        )
    }
}
