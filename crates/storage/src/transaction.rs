//! Optimistic transactions over `MemoryStore`
//!
//! A `MemoryTransaction` is the `&dyn Store` handed to transaction bodies.
//! Reads go to committed state and record the version they observed; writes
//! are buffered. Commit takes the store's write lock, checks every recorded
//! version is still current, then applies the buffer at a single new version.
//!
//! # Design
//!
//! - **Read-your-writes**: reads consult the write buffer first.
//! - **First-committer-wins**: a changed read version aborts the commit with
//!   `Error::ConcurrentTransaction`; the store decides whether to retry.
//! - **Blind writes do not conflict**: only keys that were read are validated.
//! - **Queries read committed state** and do not join the read set.
//! - **Ids are allocated eagerly**: `put` returns a complete key before commit,
//!   so an aborted attempt leaves a gap in the id sequence.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use persist_core::{
    Codec, Error, Key, Query, QueryIterator, Record, Result, Store, TransactionOptions,
};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::memory::{check_complete, MemoryStore};
use crate::stored_record::StoredRecord;

/// Transaction state for one attempt
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    read_only: bool,
    /// Key → committed version observed (0 when absent)
    reads: Mutex<FxHashMap<Key, u64>>,
    /// Key → buffered write (`None` deletes)
    writes: Mutex<BTreeMap<Key, Option<Record>>>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(store: &'a MemoryStore, read_only: bool) -> Self {
        Self {
            store,
            read_only,
            reads: Mutex::new(FxHashMap::default()),
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::invalid_operation(
                "write attempted in a read-only transaction",
            ));
        }
        Ok(())
    }

    /// Read one key through the write buffer, recording committed reads
    fn read(&self, key: &Key) -> Result<Record> {
        check_complete(key)?;
        if let Some(buffered) = self.writes.lock().get(key) {
            return buffered.clone().ok_or_else(|| Error::NotFound(key.clone()));
        }

        let data = self.store.data().read();
        let version = MemoryStore::version_of(&data, key);
        self.reads.lock().entry(key.clone()).or_insert(version);
        data.get(key)
            .map(|stored| stored.record().clone())
            .ok_or_else(|| Error::NotFound(key.clone()))
    }

    /// Validate the read set and apply buffered writes
    ///
    /// # Errors
    ///
    /// `Error::ConcurrentTransaction` naming the first key whose committed
    /// version changed since it was read.
    pub(crate) fn commit(self) -> Result<()> {
        let writes = self.writes.into_inner();
        if writes.is_empty() {
            return Ok(());
        }
        let reads = self.reads.into_inner();

        let mut data = self.store.data().write();
        for (key, observed) in &reads {
            if MemoryStore::version_of(&data, key) != *observed {
                return Err(Error::ConcurrentTransaction(key.clone()));
            }
        }

        let version = self.store.next_version();
        let count = writes.len();
        for (key, write) in writes {
            match write {
                Some(record) => {
                    data.insert(key, StoredRecord::new(record, version));
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        debug!(target: "persist::store", writes = count, reads = reads.len(), version, "transaction committed");
        Ok(())
    }
}

impl Store for MemoryTransaction<'_> {
    fn codec(&self) -> Codec {
        self.store.codec()
    }

    fn get(&self, key: &Key) -> Result<Record> {
        self.read(key)
    }

    fn get_multi(&self, keys: &[Key]) -> Result<Vec<Record>> {
        keys.iter().map(|key| self.read(key)).collect()
    }

    fn put(&self, key: &Key, record: Record) -> Result<Key> {
        self.check_writable()?;
        let key = self.store.complete_key(key)?;
        self.writes.lock().insert(key.clone(), Some(record));
        Ok(key)
    }

    fn put_multi(&self, keys: &[Key], records: Vec<Record>) -> Result<Vec<Key>> {
        self.check_writable()?;
        if keys.len() != records.len() {
            return Err(Error::invalid_argument(format!(
                "put_multi: {} keys but {} records",
                keys.len(),
                records.len()
            )));
        }
        let completed = keys
            .iter()
            .map(|key| self.store.complete_key(key))
            .collect::<Result<Vec<_>>>()?;
        let mut writes = self.writes.lock();
        for (key, record) in completed.iter().zip(records) {
            writes.insert(key.clone(), Some(record));
        }
        Ok(completed)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        self.delete_multi(std::slice::from_ref(key))
    }

    fn delete_multi(&self, keys: &[Key]) -> Result<()> {
        self.check_writable()?;
        for key in keys {
            check_complete(key)?;
        }
        let mut writes = self.writes.lock();
        for key in keys {
            writes.insert(key.clone(), None);
        }
        Ok(())
    }

    fn run_in_transaction(
        &self,
        _f: &mut dyn FnMut(&dyn Store) -> Result<()>,
        _options: &TransactionOptions,
    ) -> Result<()> {
        Err(Error::invalid_operation("nested transactions are not supported"))
    }

    fn run(&self, query: &Query) -> Result<Box<dyn QueryIterator + '_>> {
        self.store.run(query)
    }
}
