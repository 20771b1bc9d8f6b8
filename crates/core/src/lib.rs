//! Core types and traits for strata-persist
//!
//! This crate defines the vocabulary shared by the engine and store
//! implementations:
//! - Key: hierarchical entity identifier (kind, id, parent)
//! - Entity: structural description of a value plus its lifecycle capabilities
//! - Getter / Putter: post-get and pre-put hooks
//! - Store / QueryIterator: the backend contract the engine consumes
//! - Query / Cursor: caller-prepared queries and opaque resume tokens
//! - Codec / Record: store-selected entity encoding
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod entity;
pub mod error;
pub mod key;
pub mod query;
pub mod traits;

pub use codec::{Codec, Record};
pub use entity::{short_type_name, Entity, Getter, Putter, Shape};
pub use error::{Error, HookError, Result};
pub use key::{Ancestors, Key};
pub use query::{Cursor, Direction, Filter, FilterOp, Order, Query};
pub use traits::{QueryIterator, Store, TransactionOptions};
