//! Schema descriptors: the per-type mapping between record fields and
//! document keys.

use crate::document::DOC_ID;
use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use crate::mapper::Record;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::sync::Arc;

// Descriptors are derived once per type and shared across repositories.
static DESCRIPTORS: Lazy<DashMap<TypeId, Arc<SchemaDescriptor>>> = Lazy::new(DashMap::new);

/// How a record field participates in mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    /// The field holds the record's identity; it always maps to the
    /// reserved `_id` key.
    Identity,
    /// The field holds a nested record serialized in place as a
    /// sub-document.
    Embedded,
    /// The field holds a link to a record stored elsewhere; only its
    /// identity is serialized. The payload names the referenced
    /// collection.
    Reference(&'static str),
    /// An ordinary scalar or collection field.
    Plain,
}

/// A single field declaration: the Rust-side field name, an optional
/// custom document key and the field's [FieldRole].
///
/// Declared as a const table in [Record::field_specs]; the descriptor
/// derivation resolves and validates the table once per type.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub key: Option<&'static str>,
    pub role: FieldRole,
}

impl FieldSpec {
    /// A plain field whose document key equals the field name.
    pub const fn plain(name: &'static str) -> Self {
        FieldSpec {
            name,
            key: None,
            role: FieldRole::Plain,
        }
    }

    /// A plain field stored under a custom document key.
    pub const fn named(name: &'static str, key: &'static str) -> Self {
        FieldSpec {
            name,
            key: Some(key),
            role: FieldRole::Plain,
        }
    }

    /// The identity field. Its document key is always `_id`.
    pub const fn identity(name: &'static str) -> Self {
        FieldSpec {
            name,
            key: None,
            role: FieldRole::Identity,
        }
    }

    /// An embedded record field keyed by the field name.
    pub const fn embedded(name: &'static str) -> Self {
        FieldSpec {
            name,
            key: None,
            role: FieldRole::Embedded,
        }
    }

    /// An embedded record field stored under a custom document key.
    pub const fn embedded_as(name: &'static str, key: &'static str) -> Self {
        FieldSpec {
            name,
            key: Some(key),
            role: FieldRole::Embedded,
        }
    }

    /// A reference field keyed by the field name, linking into the given
    /// collection.
    pub const fn reference(name: &'static str, collection: &'static str) -> Self {
        FieldSpec {
            name,
            key: None,
            role: FieldRole::Reference(collection),
        }
    }

    /// A reference field stored under a custom document key.
    pub const fn reference_as(
        name: &'static str,
        key: &'static str,
        collection: &'static str,
    ) -> Self {
        FieldSpec {
            name,
            key: Some(key),
            role: FieldRole::Reference(collection),
        }
    }
}

/// A [FieldSpec] after resolution: the document key is concrete.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedField {
    pub name: &'static str,
    pub key: &'static str,
    pub role: FieldRole,
}

/// The resolved field mapping for one record type.
///
/// Field order follows the declaration order of the field table, which in
/// turn drives key order in serialized documents.
#[derive(Debug)]
pub struct SchemaDescriptor {
    type_name: &'static str,
    fields: Vec<ResolvedField>,
    identity: Option<usize>,
}

impl SchemaDescriptor {
    /// Resolves and validates a field table.
    ///
    /// Rejects duplicate field names, duplicate document keys, more than
    /// one identity field and custom keys on identity fields.
    pub fn new(type_name: &'static str, specs: &[FieldSpec]) -> DocMapResult<Self> {
        let mut fields = Vec::with_capacity(specs.len());
        let mut identity = None;

        for (index, spec) in specs.iter().enumerate() {
            let key = match spec.role {
                FieldRole::Identity => {
                    if identity.is_some() {
                        log::error!(
                            "type '{}' declares more than one identity field",
                            type_name
                        );
                        return Err(DocMapError::new(
                            format!("type '{}' declares more than one identity field", type_name),
                            ErrorKind::Configuration,
                        ));
                    }
                    if spec.key.is_some() {
                        log::error!(
                            "identity field '{}' of '{}' cannot use a custom key",
                            spec.name,
                            type_name
                        );
                        return Err(DocMapError::new(
                            format!(
                                "identity field '{}' of '{}' cannot use a custom key",
                                spec.name, type_name
                            ),
                            ErrorKind::Configuration,
                        ));
                    }
                    identity = Some(index);
                    DOC_ID
                }
                _ => spec.key.unwrap_or(spec.name),
            };

            if key.is_empty() || spec.name.is_empty() {
                return Err(DocMapError::new(
                    format!("type '{}' declares a field with an empty name or key", type_name),
                    ErrorKind::Configuration,
                ));
            }

            if fields.iter().any(|f: &ResolvedField| f.name == spec.name) {
                return Err(DocMapError::new(
                    format!("type '{}' declares field '{}' twice", type_name, spec.name),
                    ErrorKind::Configuration,
                ));
            }

            if fields.iter().any(|f: &ResolvedField| f.key == key) {
                return Err(DocMapError::new(
                    format!(
                        "type '{}' maps two fields to document key '{}'",
                        type_name, key
                    ),
                    ErrorKind::Configuration,
                ));
            }

            fields.push(ResolvedField {
                name: spec.name,
                key,
                role: spec.role,
            });
        }

        Ok(SchemaDescriptor {
            type_name,
            fields,
            identity,
        })
    }

    /// Returns the record type name this descriptor was derived from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the resolved fields in declaration order.
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Looks up a resolved field by its Rust-side name.
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the identity field, if the type declares one.
    pub fn identity(&self) -> Option<&ResolvedField> {
        self.identity.map(|i| &self.fields[i])
    }
}

/// Returns the memoized [SchemaDescriptor] for a record type, deriving it
/// on first use.
pub fn describe<T: Record>() -> DocMapResult<Arc<SchemaDescriptor>> {
    let type_id = TypeId::of::<T>();
    if let Some(descriptor) = DESCRIPTORS.get(&type_id) {
        return Ok(descriptor.clone());
    }

    // A racing thread may derive the same descriptor; the duplicate work
    // is harmless and the map keeps a single entry.
    let descriptor = Arc::new(SchemaDescriptor::new(T::type_name(), T::field_specs())?);
    DESCRIPTORS.insert(type_id, descriptor.clone());
    Ok(descriptor)
}
