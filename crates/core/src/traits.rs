//! Store abstraction
//!
//! The persistence engine never talks to a concrete backend. It consumes a
//! `Store`, which owns encoding (through its `Codec`), id allocation,
//! consistency, batching and transactions. The trait is object safe so hooks
//! can receive the store handle as `&dyn Store`.
//!
//! Thread safety: implementations must be `Send + Sync`.

use crate::codec::{Codec, Record};
use crate::error::Result;
use crate::key::Key;
use crate::query::{Cursor, Query};

/// Options forwarded to `Store::run_in_transaction`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Commit attempts before giving up on contention (store default when `None`)
    pub attempts: Option<u32>,
    /// Reject writes inside the transaction
    pub read_only: bool,
}

impl TransactionOptions {
    /// Read-only transaction
    pub fn read_only() -> Self {
        Self {
            attempts: None,
            read_only: true,
        }
    }

    /// Override the number of commit attempts
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

/// Native iterator over a query's results
pub trait QueryIterator {
    /// Next result, `Ok(None)` once the results are exhausted
    fn next_record(&mut self) -> Result<Option<(Key, Record)>>;

    /// Resume position after the last returned result
    fn cursor(&self) -> Result<Cursor>;
}

/// Hierarchical key-value store
///
/// Batch methods are single logical round-trips: implementations must not
/// degrade them to loops of independent calls that lose batch atomicity.
pub trait Store: Send + Sync {
    /// Encoding used for records in this store
    fn codec(&self) -> Codec;

    /// Load the record stored under `key`
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when nothing is stored under `key`.
    fn get(&self, key: &Key) -> Result<Record>;

    /// Load records for `keys`, positionally
    fn get_multi(&self, keys: &[Key]) -> Result<Vec<Record>>;

    /// Store `record` under `key`, returning the completed key
    fn put(&self, key: &Key, record: Record) -> Result<Key>;

    /// Store `records` under `keys`, returning completed keys positionally
    fn put_multi(&self, keys: &[Key], records: Vec<Record>) -> Result<Vec<Key>>;

    /// Remove the record under `key`
    fn delete(&self, key: &Key) -> Result<()>;

    /// Remove the records under `keys`
    fn delete_multi(&self, keys: &[Key]) -> Result<()>;

    /// Run `f` inside a transaction
    ///
    /// The store decides atomicity, isolation and retries. `f` may be called
    /// more than once when the store retries.
    fn run_in_transaction(
        &self,
        f: &mut dyn FnMut(&dyn Store) -> Result<()>,
        options: &TransactionOptions,
    ) -> Result<()>;

    /// Start iterating `query`
    fn run(&self, query: &Query) -> Result<Box<dyn QueryIterator + '_>>;

    /// Every result of `query`
    fn get_all(&self, query: &Query) -> Result<Vec<(Key, Record)>> {
        let mut iter = self.run(query)?;
        let mut results = Vec::new();
        while let Some(entry) = iter.next_record()? {
            results.push(entry);
        }
        Ok(results)
    }
}
