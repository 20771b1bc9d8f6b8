//! MemoryStore: in-process `Store` backed by a BTreeMap
//!
//! - `BTreeMap<Key, StoredRecord>` behind a `parking_lot::RwLock`
//! - `AtomicI64` id allocator for incomplete keys (ids start at 1)
//! - `AtomicU64` write version, stamped on every record for transaction
//!   validation
//!
//! # Design
//!
//! - **Single-lock batches**: `get_multi`, `put_multi` and `delete_multi` hold
//!   one lock for the whole batch, so a batch is never observed half applied.
//! - **Validate before locking**: keys are checked and ids allocated before the
//!   write lock is taken; a bad key leaves the store untouched.
//! - **Queries are snapshots**: results are materialized under the read lock
//!   and iterated without holding it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use parking_lot::RwLock;
use persist_core::{
    Codec, Error, Key, Query, QueryIterator, Record, Result, Store, TransactionOptions,
};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::query::{evaluate, MemoryQueryIter};
use crate::stored_record::StoredRecord;
use crate::transaction::MemoryTransaction;

/// In-memory hierarchical key-value store
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<Key, StoredRecord>>,
    next_id: AtomicI64,
    version: AtomicU64,
    config: StoreConfig,
}

impl MemoryStore {
    /// Empty store with the default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Empty store with `config`
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            version: AtomicU64::new(0),
            config,
        }
    }

    /// Configuration this store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Latest committed write version (0 before any write)
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub(crate) fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn data(&self) -> &RwLock<BTreeMap<Key, StoredRecord>> {
        &self.data
    }

    /// Key ready for storage: incomplete keys receive a fresh id
    ///
    /// Complete keys move the allocator past their id so a later allocation
    /// never lands on an explicitly keyed entity.
    pub(crate) fn complete_key(&self, key: &Key) -> Result<Key> {
        check_key(key)?;
        if key.is_incomplete() {
            Ok(key.with_id(self.allocate_id()))
        } else {
            self.next_id.fetch_max(key.id().saturating_add(1), Ordering::SeqCst);
            Ok(key.clone())
        }
    }

    /// Committed version of `key`, 0 when absent
    pub(crate) fn version_of(data: &BTreeMap<Key, StoredRecord>, key: &Key) -> u64 {
        data.get(key).map(StoredRecord::version).unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject keys no store can hold: empty kinds, negative ids, incomplete parents
///
/// Kinds containing `/` or `,` are rejected too, since their text form would
/// not parse back into the same key.
fn check_key(key: &Key) -> Result<()> {
    for element in key.ancestors() {
        if element.kind().is_empty() {
            return Err(Error::invalid_argument(format!("empty kind in key {}", key)));
        }
        if element.kind().contains(['/', ',']) {
            return Err(Error::invalid_argument(format!(
                "kind '{}' contains a reserved character",
                element.kind()
            )));
        }
        if element.id() < 0 {
            return Err(Error::invalid_argument(format!("negative id in key {}", key)));
        }
    }
    if key.parent().map_or(false, |p| p.ancestors().any(Key::is_incomplete)) {
        return Err(Error::invalid_argument(format!(
            "incomplete parent in key {}",
            key
        )));
    }
    Ok(())
}

/// Keys addressed by reads and deletes must name a stored position
pub(crate) fn check_complete(key: &Key) -> Result<()> {
    check_key(key)?;
    if key.is_incomplete() {
        return Err(Error::invalid_argument(format!("incomplete key {}", key)));
    }
    Ok(())
}

impl Store for MemoryStore {
    fn codec(&self) -> Codec {
        self.config.codec
    }

    fn get(&self, key: &Key) -> Result<Record> {
        check_complete(key)?;
        self.data
            .read()
            .get(key)
            .map(|stored| stored.record().clone())
            .ok_or_else(|| Error::NotFound(key.clone()))
    }

    fn get_multi(&self, keys: &[Key]) -> Result<Vec<Record>> {
        for key in keys {
            check_complete(key)?;
        }
        let data = self.data.read();
        keys.iter()
            .map(|key| {
                data.get(key)
                    .map(|stored| stored.record().clone())
                    .ok_or_else(|| Error::NotFound(key.clone()))
            })
            .collect()
    }

    fn put(&self, key: &Key, record: Record) -> Result<Key> {
        let key = self.complete_key(key)?;
        let mut data = self.data.write();
        let version = self.next_version();
        data.insert(key.clone(), StoredRecord::new(record, version));
        Ok(key)
    }

    fn put_multi(&self, keys: &[Key], records: Vec<Record>) -> Result<Vec<Key>> {
        if keys.len() != records.len() {
            return Err(Error::invalid_argument(format!(
                "put_multi: {} keys but {} records",
                keys.len(),
                records.len()
            )));
        }
        let completed = keys
            .iter()
            .map(|key| self.complete_key(key))
            .collect::<Result<Vec<_>>>()?;

        let mut data = self.data.write();
        let version = self.next_version();
        for (key, record) in completed.iter().zip(records) {
            data.insert(key.clone(), StoredRecord::new(record, version));
        }
        debug!(target: "persist::store", count = completed.len(), version, "put_multi applied");
        Ok(completed)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        check_complete(key)?;
        let mut data = self.data.write();
        if data.remove(key).is_some() {
            self.next_version();
        }
        Ok(())
    }

    fn delete_multi(&self, keys: &[Key]) -> Result<()> {
        for key in keys {
            check_complete(key)?;
        }
        let mut data = self.data.write();
        let removed = keys.iter().filter(|key| data.remove(key).is_some()).count();
        if removed > 0 {
            self.next_version();
        }
        debug!(target: "persist::store", requested = keys.len(), removed, "delete_multi applied");
        Ok(())
    }

    fn run_in_transaction(
        &self,
        f: &mut dyn FnMut(&dyn Store) -> Result<()>,
        options: &TransactionOptions,
    ) -> Result<()> {
        let attempts = options
            .attempts
            .unwrap_or(self.config.transaction_attempts)
            .max(1);
        let mut attempt = 1;
        loop {
            let txn = MemoryTransaction::new(self, options.read_only);
            f(&txn)?;
            match txn.commit() {
                Err(Error::ConcurrentTransaction(key)) if attempt < attempts => {
                    warn!(
                        target: "persist::store",
                        attempt,
                        attempts,
                        key = %key,
                        "transaction conflict, retrying"
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn run(&self, query: &Query) -> Result<Box<dyn QueryIterator + '_>> {
        if query.kind().is_empty() {
            return Err(Error::invalid_argument("query kind is empty"));
        }
        let candidates = {
            let data = self.data.read();
            evaluate(query, self.config.codec, &data)?
        };
        Ok(Box::new(MemoryQueryIter::new(query, candidates)?))
    }
}
