//! Entity transfer operations
//!
//! ## Design
//!
//! `EntityAccess` is implemented by anything that can hand out a store handle
//! and a key policy: `Datastore` outside transactions and `Transaction` inside
//! them. Every operation is a provided method, so both run the exact same
//! code path.
//!
//! ## Flow
//!
//! - Put: derive the key (running `Putter` hooks), encode with the store's
//!   codec, write.
//! - Get: read, decode over the destination, run `Getter` hooks.
//! - Batches map to ONE store call each. Keys are derived for the whole batch
//!   before the store is touched, so a derivation error writes nothing.
//!
//! ## Partial batches
//!
//! `get_multi` stops at the first hook error. Destinations before the failing
//! element hold decoded, hooked values; the failing one and later ones hold
//! decoded values whose hooks did not run. `get_multi_atomic` and
//! `put_multi_atomic` are the all-or-nothing variants.

use persist_core::{Entity, Error, Key, Query, Result, Store, TransactionOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::derive::{derive_key, KeyPolicy};
use crate::hooks::dispatch_get;
use crate::iter::{fetch_n, EntityIter, Page};

/// Typed get/put/delete/query over a `Store`
pub trait EntityAccess {
    /// Store handle operations run against
    fn store(&self) -> &dyn Store;

    /// Key derivation policy for composite entities
    fn key_policy(&self) -> KeyPolicy;

    /// Run `f` as one atomic unit
    ///
    /// Opens a store transaction. Implementations already inside one run `f`
    /// directly against it.
    fn atomically(&self, f: &mut dyn FnMut(&dyn Store) -> Result<()>) -> Result<()> {
        self.store().run_in_transaction(f, &TransactionOptions::default())
    }

    /// Key `entity` would be stored under
    ///
    /// Runs `Putter` hooks found along the way.
    fn key_for<E: Entity>(&self, entity: &mut E) -> Result<Key> {
        derive_key(self.store(), entity, self.key_policy())
    }

    /// Load the entity stored under `key` into `dst`
    ///
    /// # Errors
    ///
    /// Store errors unchanged (`Error::NotFound` for a missing key, in which
    /// case `dst` is untouched and no hook runs). A hook error is returned
    /// after `dst` was overwritten.
    fn get<E>(&self, key: &Key, dst: &mut E) -> Result<()>
    where
        E: Entity + DeserializeOwned,
    {
        let store = self.store();
        let record = store.get(key)?;
        *dst = store.codec().decode(&record)?;
        dispatch_get(store, key, dst)
    }

    /// Load the entities under `keys` into `dst`, positionally
    fn get_multi<E>(&self, keys: &[Key], dst: &mut [E]) -> Result<()>
    where
        E: Entity + DeserializeOwned,
    {
        check_lengths("get_multi", keys.len(), dst.len())?;
        let store = self.store();
        let records = store.get_multi(keys)?;
        let codec = store.codec();
        for (slot, record) in dst.iter_mut().zip(&records) {
            *slot = codec.decode(record)?;
        }
        for (key, slot) in keys.iter().zip(dst.iter_mut()) {
            dispatch_get(store, key, slot)?;
        }
        debug!(target: "persist::engine", count = keys.len(), "get_multi");
        Ok(())
    }

    /// Store `entity`, returning the key the store assigned
    fn put<E>(&self, entity: &mut E) -> Result<Key>
    where
        E: Entity + Serialize,
    {
        let store = self.store();
        let key = derive_key(store, entity, self.key_policy())?;
        let record = store.codec().encode(entity)?;
        store.put(&key, record)
    }

    /// Store `entities`, returning assigned keys positionally
    fn put_multi<E>(&self, entities: &mut [E]) -> Result<Vec<Key>>
    where
        E: Entity + Serialize,
    {
        let store = self.store();
        let policy = self.key_policy();
        let keys = entities
            .iter_mut()
            .map(|entity| derive_key(store, entity, policy))
            .collect::<Result<Vec<_>>>()?;
        let codec = store.codec();
        let records = entities
            .iter()
            .map(|entity| codec.encode(entity))
            .collect::<Result<Vec<_>>>()?;
        debug!(target: "persist::engine", count = keys.len(), "put_multi");
        store.put_multi(&keys, records)
    }

    /// Remove the entity under `key`
    fn delete(&self, key: &Key) -> Result<()> {
        self.store().delete(key)
    }

    /// Remove the entities under `keys`
    fn delete_multi(&self, keys: &[Key]) -> Result<()> {
        self.store().delete_multi(keys)
    }

    /// Iterate the entities matching `query`
    fn run<E>(&self, query: &Query) -> Result<EntityIter<'_, E>>
    where
        E: Entity + DeserializeOwned,
    {
        EntityIter::new(self.store(), query)
    }

    /// Load every entity matching `query`, appending to `dst`
    ///
    /// Returns the keys in result order. On error nothing is appended.
    fn get_all<E>(&self, query: &Query, dst: &mut Vec<E>) -> Result<Vec<Key>>
    where
        E: Entity + DeserializeOwned,
    {
        let mut keys = Vec::new();
        let mut entities = Vec::new();
        for item in self.run::<E>(query)? {
            let (key, entity) = item?;
            keys.push(key);
            entities.push(entity);
        }
        dst.extend(entities);
        Ok(keys)
    }

    /// Load up to `n` entities matching `query`, appending to `dst`
    fn fetch_n<E>(&self, query: &Query, dst: &mut Vec<E>, n: usize) -> Result<Page>
    where
        E: Entity + DeserializeOwned,
    {
        fetch_n(self.store(), query, dst, n)
    }

    /// All-or-nothing `get_multi`
    ///
    /// Reads inside one transaction and decodes into scratch values; `dst` is
    /// only written once every hook succeeded.
    fn get_multi_atomic<E>(&self, keys: &[Key], dst: &mut [E]) -> Result<()>
    where
        E: Entity + DeserializeOwned,
    {
        check_lengths("get_multi_atomic", keys.len(), dst.len())?;
        let mut loaded: Vec<E> = Vec::new();
        self.atomically(&mut |txn| {
            let records = txn.get_multi(keys)?;
            let codec = txn.codec();
            let mut scratch = records
                .iter()
                .map(|record| codec.decode::<E>(record))
                .collect::<Result<Vec<_>>>()?;
            for (key, entity) in keys.iter().zip(scratch.iter_mut()) {
                dispatch_get(txn, key, entity)?;
            }
            loaded = scratch;
            Ok(())
        })?;
        for (slot, entity) in dst.iter_mut().zip(loaded) {
            *slot = entity;
        }
        Ok(())
    }

    /// All-or-nothing `put_multi`
    ///
    /// Derives and writes inside one transaction. `Putter` hooks may run once
    /// per attempt when the store retries.
    fn put_multi_atomic<E>(&self, entities: &mut [E]) -> Result<Vec<Key>>
    where
        E: Entity + Serialize,
    {
        let policy = self.key_policy();
        let mut keys = Vec::new();
        self.atomically(&mut |txn| {
            let derived = entities
                .iter_mut()
                .map(|entity| derive_key(txn, entity, policy))
                .collect::<Result<Vec<_>>>()?;
            let codec = txn.codec();
            let records = entities
                .iter()
                .map(|entity| codec.encode(entity))
                .collect::<Result<Vec<_>>>()?;
            keys = txn.put_multi(&derived, records)?;
            Ok(())
        })?;
        Ok(keys)
    }
}

fn check_lengths(op: &str, keys: usize, dst: usize) -> Result<()> {
    if keys != dst {
        return Err(Error::invalid_argument(format!(
            "{}: {} keys but {} destinations",
            op, keys, dst
        )));
    }
    Ok(())
}
