//! End-to-end Tests
//!
//! Exercises the public crate surface the way an application would:
//! - Blog workflow: authors, posts, queries, paging, transactions
//! - Codecs: the same workflow over MessagePack and JSON stores
//! - Config: opening datastores from `persist.toml`

#[path = "../common/mod.rs"]
mod common;

mod blog;
mod codecs;
mod config_open;
