//! The document model: [Value], [Document] and [ObjectId].

#[allow(clippy::module_inception)]
mod document;
mod object_id;
mod value;

pub use document::{normalize, Document};
pub use object_id::ObjectId;
pub use value::Value;

/// The reserved key under which a document's identity is stored.
pub const DOC_ID: &str = "_id";
