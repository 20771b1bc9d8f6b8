//! Persistence engine for strata-persist
//!
//! This crate moves typed entities in and out of a `persist_core::Store`:
//! - Key derivation from `Putter` hooks (`derive_key`, `KeyPolicy`)
//! - `Getter` dispatch after loads (`dispatch_get`)
//! - Transfer operations through `EntityAccess`, implemented by `Datastore`
//!   and `Transaction`
//! - Query iteration with hooks and bounded fetches (`EntityIter`, `fetch_n`)
//! - Request paging helpers (`fetch_page`, `get_instance`)
//!
//! The engine keeps no state between calls. Encoding, id allocation,
//! consistency and transactions belong to the store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod config;
pub mod datastore;
pub mod derive;
pub mod hooks;
pub mod iter;
pub mod paging;

pub use access::EntityAccess;
pub use config::{EngineConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use datastore::{Datastore, Transaction};
pub use derive::{derive_key, KeyPolicy};
pub use hooks::dispatch_get;
pub use iter::{fetch_n, EntityIter, Page};
pub use paging::{fetch_page, get_instance, PageRequest, PageResponse};
