//! strata-persist - typed entity persistence over hierarchical key-value stores
//!
//! Entities describe their structure and opt into lifecycle hooks; the engine
//! derives keys from `Putter` hooks, runs `Getter` hooks after every load, and
//! moves values through any `Store`.
//!
//! # Quick Start
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use strata_persist::{Entity, EntityAccess, Key, Putter, Result, Store};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Post {
//!     id: i64,
//!     title: String,
//! }
//!
//! impl Putter for Post {
//!     fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
//!         Ok(Key::new("Post", self.id, None))
//!     }
//! }
//!
//! impl Entity for Post {
//!     fn as_putter(&mut self) -> Option<&mut dyn Putter> {
//!         Some(self)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let ds = strata_persist::open_in_memory();
//! let key = ds.put(&mut Post { id: 0, title: "hello".into() })?;
//!
//! let mut post = Post::default();
//! ds.get(&key, &mut post)?;
//! assert_eq!(post.title, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `persist-core`: keys, queries, codecs, errors, entity and store traits
//! - `persist-storage`: `MemoryStore`, the in-process reference store
//! - `persist-engine`: key derivation, hook dispatch, transfer, iteration
//!
//! This crate re-exports all three and adds file-based configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;

pub use config::{open_dir, open_in_memory, PersistConfig, CONFIG_FILE_NAME};
pub use persist_core::{
    short_type_name, Ancestors, Codec, Cursor, Direction, Entity, Error, Filter, FilterOp,
    Getter, HookError, Key, Order, Putter, Query, QueryIterator, Record, Result, Shape, Store,
    TransactionOptions,
};
pub use persist_engine::{
    derive_key, dispatch_get, fetch_n, fetch_page, get_instance, Datastore, EngineConfig,
    EntityAccess, EntityIter, KeyPolicy, Page, PageRequest, PageResponse, Transaction,
};
pub use persist_storage::{MemoryStore, StoreConfig};
