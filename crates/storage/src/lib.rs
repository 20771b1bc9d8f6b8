//! Storage layer for strata-persist
//!
//! This crate provides the in-memory reference implementation of
//! `persist_core::Store`:
//! - MemoryStore: BTreeMap-based storage with RwLock
//! - Id allocation for incomplete keys
//! - Optimistic transactions with read-set validation and retry
//! - Query evaluation (kind, ancestor, filters, orders)
//! - Opaque, query-bound cursor tokens

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod cursor;
pub mod memory;
mod query;
pub mod stored_record;
pub mod transaction;

pub use config::{StoreConfig, DEFAULT_TRANSACTION_ATTEMPTS};
pub use cursor::{Anchor, CursorPosition};
pub use memory::MemoryStore;
pub use query::compare_values;
pub use stored_record::StoredRecord;
pub use transaction::MemoryTransaction;
