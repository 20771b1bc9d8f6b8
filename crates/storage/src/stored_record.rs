//! Storage-layer record wrapper
//!
//! The contract type `Record` carries only encoded bytes. Versions are a
//! storage concern used for optimistic transaction validation, so they live
//! here and never leave the store.

use persist_core::Record;

/// A record plus the version of the write that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    record: Record,
    version: u64,
}

impl StoredRecord {
    /// Wrap a record written at `version`
    pub fn new(record: Record, version: u64) -> Self {
        Self { record, version }
    }

    /// The encoded record
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Version of the write that produced this record
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}
