//! Datastore and Transaction facades
//!
//! ## Design
//!
//! `Datastore` is a stateless facade over a `Store`. It holds no state beyond
//! an `Arc<dyn Store>` and the engine configuration, is `Clone`, and is safe to
//! share across threads.
//!
//! `Transaction` is the handle passed to transaction bodies. It borrows the
//! store's transactional handle and offers the same `EntityAccess` operations,
//! so code written against `EntityAccess` runs unchanged inside and outside a
//! transaction.
//!
//! Atomicity, isolation and retries belong to the store. The body may run more
//! than once.

use std::fmt;
use std::sync::Arc;

use persist_core::{Result, Store, TransactionOptions};
use tracing::debug;

use crate::access::EntityAccess;
use crate::config::EngineConfig;
use crate::derive::KeyPolicy;

/// Entity access over a shared store
///
/// # Example
///
/// ```ignore
/// let ds = Datastore::new(Arc::new(MemoryStore::new()));
/// let key = ds.put(&mut post)?;
/// ds.get(&key, &mut post)?;
/// ds.delete(&key)?;
/// ```
#[derive(Clone)]
pub struct Datastore {
    store: Arc<dyn Store>,
    config: EngineConfig,
    policy: KeyPolicy,
}

impl Datastore {
    /// Datastore with the default engine configuration
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            policy: KeyPolicy::default(),
        }
    }

    /// Datastore with `config`
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when `config` does not validate.
    pub fn with_config(store: Arc<dyn Store>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.key_policy()?;
        debug!(target: "persist::engine", key_policy = %policy, "datastore opened");
        Ok(Self {
            store,
            config,
            policy,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the underlying store
    pub fn shared_store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    /// Run `f` inside a store transaction
    ///
    /// `f` may be called more than once when the store retries. An error from
    /// `f` aborts the transaction and is returned unchanged.
    pub fn run_in_transaction<F>(&self, options: &TransactionOptions, mut f: F) -> Result<()>
    where
        F: FnMut(&Transaction<'_>) -> Result<()>,
    {
        let policy = self.policy;
        self.store.run_in_transaction(
            &mut |store| f(&Transaction { store, policy }),
            options,
        )
    }
}

impl fmt::Debug for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datastore")
            .field("codec", &self.store.codec())
            .field("config", &self.config)
            .finish()
    }
}

impl EntityAccess for Datastore {
    fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    fn key_policy(&self) -> KeyPolicy {
        self.policy
    }
}

/// Entity access inside a transaction
pub struct Transaction<'a> {
    store: &'a dyn Store,
    policy: KeyPolicy,
}

impl EntityAccess for Transaction<'_> {
    fn store(&self) -> &dyn Store {
        self.store
    }

    fn key_policy(&self) -> KeyPolicy {
        self.policy
    }

    fn atomically(&self, f: &mut dyn FnMut(&dyn Store) -> Result<()>) -> Result<()> {
        f(self.store)
    }
}
