use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use chrono::Utc;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

// 5 random bytes fixed per process, distinguishing concurrent generators.
static PROCESS_RANDOM: Lazy<[u8; 5]> = Lazy::new(rand::random);

// Monotonic counter seeded randomly at startup, low 3 bytes used.
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random()));

/// A 12-byte store-generated identity value.
///
/// The layout follows the common object-id convention: a 4-byte big-endian
/// seconds-since-epoch timestamp, 5 process-random bytes, and a 3-byte
/// monotonic counter. Ids generated by one process are unique and roughly
/// time-ordered.
///
/// The all-zero id is a sentinel meaning "no identity assigned yet"; it is
/// the [Default] value and never produced by [ObjectId::new].
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// The sentinel id meaning "not yet assigned".
    pub const ZERO: ObjectId = ObjectId { bytes: [0u8; 12] };

    /// Generates a fresh id from the current time, the process random
    /// bytes and the next counter value.
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_RANDOM);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);

        ObjectId { bytes }
    }

    /// Constructs an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    /// Returns the raw bytes of the id.
    pub const fn bytes(&self) -> &[u8; 12] {
        &self.bytes
    }

    /// Parses an id from its 24-character lowercase hex representation.
    pub fn parse_str(s: &str) -> DocMapResult<Self> {
        if s.len() != 24 {
            log::error!("invalid object id '{}': expected 24 hex characters", s);
            return Err(DocMapError::new(
                format!("invalid object id '{}': expected 24 hex characters", s),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| {
                DocMapError::new(
                    format!("invalid object id '{}': not valid hex", s),
                    ErrorKind::InvalidId,
                )
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| {
                DocMapError::new(
                    format!("invalid object id '{}': not valid hex", s),
                    ErrorKind::InvalidId,
                )
            })?;
        }

        Ok(ObjectId { bytes })
    }

    /// Returns the 24-character lowercase hex representation.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(24);
        for byte in &self.bytes {
            s.push_str(&format!("{:02x}", byte));
        }
        s
    }

    /// Returns the embedded timestamp as seconds since the epoch.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// Checks whether this is the unassigned sentinel id.
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 12]
    }
}

impl Default for ObjectId {
    /// Defaults to [ObjectId::ZERO] so that default-constructed records carry
    /// no identity until one is assigned.
    fn default() -> Self {
        ObjectId::ZERO
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = DocMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}
