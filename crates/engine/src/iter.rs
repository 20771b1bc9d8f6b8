//! Entity iteration over query results
//!
//! ## Design
//!
//! `EntityIter` wraps the store's native `QueryIterator`. Every yielded record
//! is decoded with the store's codec and passed through `Getter` dispatch with
//! the key the store returned.
//!
//! ## States
//!
//! - `Open`: more results may follow.
//! - `Exhausted`: the store reported the end. Further calls return `Ok(None)`.
//! - `Failed`: a store, codec or hook error was returned. Further calls return
//!   `Ok(None)` and `cursor()` refuses to hand out a token.

use std::marker::PhantomData;

use persist_core::{Cursor, Entity, Error, Key, Query, QueryIterator, Record, Result, Store};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::hooks::dispatch_get;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Open,
    Exhausted,
    Failed,
}

/// Iterator over the entities matching a query
pub struct EntityIter<'s, E> {
    store: &'s dyn Store,
    inner: Box<dyn QueryIterator + 's>,
    state: IterState,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, E> EntityIter<'s, E>
where
    E: Entity + DeserializeOwned,
{
    /// Start iterating `query` against `store`
    pub fn new(store: &'s dyn Store, query: &Query) -> Result<Self> {
        Ok(Self {
            store,
            inner: store.run(query)?,
            state: IterState::Open,
            _entity: PhantomData,
        })
    }

    /// Load the next result into `dst`
    ///
    /// Returns the result's key, or `Ok(None)` once there are no more
    /// results. `dst` is overwritten before `Getter` hooks run, so a hook
    /// error leaves it holding the decoded value.
    pub fn next_into(&mut self, dst: &mut E) -> Result<Option<Key>> {
        self.step(|store, key, record| {
            *dst = store.codec().decode(&record)?;
            dispatch_get(store, &key, dst)?;
            Ok(key)
        })
    }

    /// Resume token positioned after the last result handed out
    ///
    /// # Errors
    ///
    /// `Error::InvalidOperation` after the iterator failed.
    pub fn cursor(&self) -> Result<Cursor> {
        if self.state == IterState::Failed {
            return Err(Error::invalid_operation(
                "no cursor is available after a failed iteration",
            ));
        }
        self.inner.cursor()
    }

    /// Whether the store reported the end of the results
    pub fn is_exhausted(&self) -> bool {
        self.state == IterState::Exhausted
    }

    /// Whether an error ended the iteration
    pub fn is_failed(&self) -> bool {
        self.state == IterState::Failed
    }

    fn step<T>(
        &mut self,
        load: impl FnOnce(&dyn Store, Key, Record) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.state != IterState::Open {
            return Ok(None);
        }
        let store = self.store;
        let result = self.inner.next_record().and_then(|next| match next {
            Some((key, record)) => load(store, key, record).map(Some),
            None => Ok(None),
        });
        match &result {
            Ok(Some(_)) => {}
            Ok(None) => self.state = IterState::Exhausted,
            Err(_) => self.state = IterState::Failed,
        }
        result
    }
}

impl<E> Iterator for EntityIter<'_, E>
where
    E: Entity + DeserializeOwned,
{
    type Item = Result<(Key, E)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(|store, key, record| {
            let mut entity: E = store.codec().decode(&record)?;
            dispatch_get(store, &key, &mut entity)?;
            Ok((key, entity))
        })
        .transpose()
    }
}

/// Keys of a bounded fetch plus the token to continue from
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Keys of the fetched entities, in yield order
    pub keys: Vec<Key>,
    /// Resume position after the last fetched entity
    pub cursor: Cursor,
}

/// Fetch up to `n` entities matching `query`, appending them to `dst`
///
/// Fewer than `n` results is not an error. On error nothing is appended and
/// no cursor is produced.
pub fn fetch_n<E>(store: &dyn Store, query: &Query, dst: &mut Vec<E>, n: usize) -> Result<Page>
where
    E: Entity + DeserializeOwned,
{
    let mut iter = EntityIter::<E>::new(store, query)?;
    let mut keys = Vec::new();
    let mut entities = Vec::new();
    while keys.len() < n {
        match iter.next() {
            Some(Ok((key, entity))) => {
                keys.push(key);
                entities.push(entity);
            }
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }
    let cursor = iter.cursor()?;
    debug!(target: "persist::engine", kind = query.kind(), requested = n, fetched = keys.len(), "fetch_n");

    dst.extend(entities);
    Ok(Page { keys, cursor })
}
