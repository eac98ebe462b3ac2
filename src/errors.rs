use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for docmap operations.
///
/// Each kind identifies which layer of the mapping stack failed, so callers
/// can distinguish a schema problem (fatal until the type is fixed) from a
/// per-record conversion failure or a store-side fault.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{DocMapError, ErrorKind, DocMapResult};
///
/// fn example() -> DocMapResult<()> {
///     Err(DocMapError::new("unknown enumerant 'Foo'", ErrorKind::Mapping))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Schema-level problem (duplicate identity field, missing field table entry).
    /// Raised once at descriptor derivation, not per record.
    Configuration,
    /// Value-level conversion failure during encode or decode of a single record.
    Mapping,
    /// Failure raised by the backing collection. Propagated unchanged.
    Store,
    /// An identity value is malformed or structurally incompatible.
    InvalidId,
    /// The operation is not valid with the given arguments.
    InvalidOperation,
    /// Internal error (usually indicates a bug).
    Internal,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "Configuration error"),
            ErrorKind::Mapping => write!(f, "Mapping error"),
            ErrorKind::Store => write!(f, "Store error"),
            ErrorKind::InvalidId => write!(f, "Invalid id"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::Internal => write!(f, "Internal error"),
        }
    }
}

/// The docmap error type.
///
/// `DocMapError` carries the error message, its [ErrorKind], and an optional
/// cause for chaining. A backtrace is captured at construction for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{DocMapError, ErrorKind};
///
/// let err = DocMapError::new("record has no identity field", ErrorKind::Configuration);
///
/// let cause = DocMapError::new("connection reset", ErrorKind::Store);
/// let err = DocMapError::new_with_cause("bulk insert failed", ErrorKind::Store, cause);
/// ```
#[derive(Clone)]
pub struct DocMapError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocMapError>>,
    backtrace: Arc<Backtrace>,
}

impl DocMapError {
    /// Creates a new `DocMapError` with the given message and kind.
    pub fn new(message: impl Into<String>, error_kind: ErrorKind) -> Self {
        DocMapError {
            message: message.into(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `DocMapError` with an underlying cause attached.
    pub fn new_with_cause(message: impl Into<String>, error_kind: ErrorKind, cause: DocMapError) -> Self {
        DocMapError {
            message: message.into(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocMapError> {
        self.cause.as_deref()
    }
}

impl Display for DocMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for DocMapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docmap operations.
///
/// `DocMapResult<T>` is shorthand for `Result<T, DocMapError>`.
/// All fallible docmap operations return this type.
pub type DocMapResult<T> = Result<T, DocMapError>;

// From trait implementations for automatic error conversion
impl From<std::num::ParseIntError> for DocMapError {
    fn from(err: std::num::ParseIntError) -> Self {
        DocMapError::new(format!("Integer parsing error: {}", err), ErrorKind::Mapping)
    }
}

impl From<std::num::ParseFloatError> for DocMapError {
    fn from(err: std::num::ParseFloatError) -> Self {
        DocMapError::new(format!("Float parsing error: {}", err), ErrorKind::Mapping)
    }
}

impl From<std::str::ParseBoolError> for DocMapError {
    fn from(err: std::str::ParseBoolError) -> Self {
        DocMapError::new(format!("Boolean parsing error: {}", err), ErrorKind::Mapping)
    }
}

impl From<String> for DocMapError {
    fn from(msg: String) -> Self {
        DocMapError::new(msg, ErrorKind::Internal)
    }
}

impl From<&str> for DocMapError {
    fn from(msg: &str) -> Self {
        DocMapError::new(msg, ErrorKind::Internal)
    }
}
