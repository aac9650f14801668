//! Store-generated document identifiers.
//!
//! Layout: 4-byte big-endian seconds since the Unix epoch, 5 bytes of
//! per-process randomness, 3-byte wrapping counter. The text form is 24
//! lowercase hex characters.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::TodoError;

const LEN: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; LEN]);

struct ProcessSeed {
    random: [u8; 5],
    counter: AtomicU32,
}

fn seed() -> &'static ProcessSeed {
    static SEED: OnceLock<ProcessSeed> = OnceLock::new();
    SEED.get_or_init(|| {
        let bytes = Uuid::new_v4().into_bytes();
        let mut random = [0u8; 5];
        random.copy_from_slice(&bytes[..5]);
        let start = u32::from_be_bytes([0, bytes[5], bytes[6], bytes[7]]);
        ProcessSeed {
            random,
            counter: AtomicU32::new(start),
        }
    })
}

impl ObjectId {
    pub fn new() -> Self {
        let seed = seed();
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = seed.counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&seed.random);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; LEN] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl FromStr for ObjectId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TodoError::InvalidId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
