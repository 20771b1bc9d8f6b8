//! Hierarchical entity keys
//!
//! A `Key` names a stored entity: a kind (derived from the entity's type
//! name), a numeric id and an optional parent forming an ancestor chain.
//!
//! ## Contract
//!
//! - `id == 0` means the key is incomplete; the store assigns an id on put
//! - Keys are value objects. Nothing mutates a key after construction;
//!   `with_id` returns a new key
//! - Keys order by their root-first ancestor path, comparing kind then id at
//!   each level. A path that is a prefix of another sorts first
//!
//! The textual form is `/Kind,id/Kind,id`, root first.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Hierarchical identifier of a stored entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    kind: String,
    id: i64,
    parent: Option<Box<Key>>,
}

impl Key {
    /// Create a key
    pub fn new(kind: impl Into<String>, id: i64, parent: Option<Key>) -> Self {
        Self {
            kind: kind.into(),
            id,
            parent: parent.map(Box::new),
        }
    }

    /// Create an incomplete key (id 0) under an optional parent
    pub fn incomplete(kind: impl Into<String>, parent: Option<Key>) -> Self {
        Self::new(kind, 0, parent)
    }

    /// Entity kind
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Numeric id, 0 when incomplete
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Parent key, if any
    pub fn parent(&self) -> Option<&Key> {
        self.parent.as_deref()
    }

    /// Whether the store still has to assign an id
    pub fn is_incomplete(&self) -> bool {
        self.id == 0
    }

    /// Copy of this key carrying `id`
    pub fn with_id(&self, id: i64) -> Key {
        Key {
            kind: self.kind.clone(),
            id,
            parent: self.parent.clone(),
        }
    }

    /// This key followed by its ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Top-most ancestor (the key itself when it has no parent)
    pub fn root(&self) -> &Key {
        self.ancestors().last().unwrap_or(self)
    }

    /// Whether `ancestor` is this key or one of its ancestors
    pub fn has_ancestor(&self, ancestor: &Key) -> bool {
        self.ancestors().any(|k| k == ancestor)
    }

    /// Path elements, root first
    fn path(&self) -> SmallVec<[&Key; 4]> {
        let mut path: SmallVec<[&Key; 4]> = self.ancestors().collect();
        path.reverse();
        path
    }
}

/// Iterator over a key and its ancestors
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a Key>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Key;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.path();
        let rhs = other.path();
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            let ord = a.kind.cmp(&b.kind).then(a.id.cmp(&b.id));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        lhs.len().cmp(&rhs.len())
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Text form `/Kind,id/Kind,id`, root first
///
/// Only kinds without `/` or `,` parse back; stores reject other kinds.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.path() {
            write!(f, "/{},{}", element.kind, element.id)?;
        }
        Ok(())
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('/')
            .ok_or_else(|| Error::invalid_argument(format!("key '{}' must start with '/'", s)))?;

        let mut key: Option<Key> = None;
        for element in body.split('/') {
            let (kind, id) = element.split_once(',').ok_or_else(|| {
                Error::invalid_argument(format!("key element '{}' is not 'Kind,id'", element))
            })?;
            if kind.is_empty() {
                return Err(Error::invalid_argument(format!("key '{}' has an empty kind", s)));
            }
            let id: i64 = id
                .parse()
                .map_err(|_| Error::invalid_argument(format!("key element '{}' has a bad id", element)))?;
            key = Some(Key::new(kind, id, key.take()));
        }

        key.ok_or_else(|| Error::invalid_argument("empty key"))
    }
}
