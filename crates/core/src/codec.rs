//! Record encoding
//!
//! The store decides how entities are encoded; the engine only moves opaque
//! `Record`s. `Codec` names the encodings a store can pick from:
//!
//! - `MessagePack` (default): compact, struct fields encoded by name
//! - `Json`: human readable, useful for debugging stored data
//!
//! Both encodings keep field names, so a store can evaluate query filters and
//! orders against `decode_properties` without knowing the entity type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Encoded entity payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    bytes: Vec<u8>,
}

impl Record {
    /// Wrap already-encoded bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Entity encoding chosen by a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    /// MessagePack with named struct fields
    #[default]
    MessagePack,
    /// JSON
    Json,
}

impl Codec {
    /// Encode a value into a record
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Record> {
        let bytes = match self {
            Codec::MessagePack => rmp_serde::to_vec_named(value)?,
            Codec::Json => serde_json::to_vec(value)?,
        };
        Ok(Record::from_bytes(bytes))
    }

    /// Decode a record into a value
    pub fn decode<T: DeserializeOwned>(&self, record: &Record) -> Result<T> {
        match self {
            Codec::MessagePack => Ok(rmp_serde::from_slice(record.as_bytes())?),
            Codec::Json => Ok(serde_json::from_slice(record.as_bytes())?),
        }
    }

    /// Decode a record into its property tree
    pub fn decode_properties(&self, record: &Record) -> Result<serde_json::Value> {
        self.decode(record)
    }
}
