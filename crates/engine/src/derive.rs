//! Key derivation
//!
//! ## Design
//!
//! The key of an entity comes from the first `Putter` found while walking its
//! structure. `Putter::on_put` runs exactly where it is found, so derivation is
//! also where pre-put side effects happen. A value with no provider gets a
//! terminal key: its own kind, id 0, no parent.
//!
//! How far the walk looks inside a composite is a `KeyPolicy`:
//!
//! - `FirstProvider` visits members in declaration order and stops at the first
//!   key that came from a `Putter`.
//! - `FirstField` only ever looks at the first member and returns whatever it
//!   yields, a terminal key of the member's type included. This matches stores
//!   written by earlier releases.
//!
//! A sequence at the root is rejected. Nested sequences never provide keys.

use std::fmt;
use std::str::FromStr;

use persist_core::{Entity, Error, Key, Result, Shape, Store};
use serde::{Deserialize, Serialize};

/// Where a composite entity's key comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// First member whose key came from a `Putter`
    #[default]
    FirstProvider,
    /// First member only
    FirstField,
}

impl KeyPolicy {
    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPolicy::FirstProvider => "first_provider",
            KeyPolicy::FirstField => "first_field",
        }
    }
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first_provider" => Ok(KeyPolicy::FirstProvider),
            "first_field" => Ok(KeyPolicy::FirstField),
            other => Err(Error::invalid_argument(format!(
                "unknown key policy '{}', expected \"first_provider\" or \"first_field\"",
                other
            ))),
        }
    }
}

/// A derived key and whether a `Putter` produced it
struct Derived {
    key: Key,
    provided: bool,
}

/// Derive the storage key for `entity`
///
/// # Errors
///
/// - `Error::InvalidArgument` when `entity` is a sequence.
/// - Any error returned by a `Putter`, unchanged.
pub fn derive_key(store: &dyn Store, entity: &mut dyn Entity, policy: KeyPolicy) -> Result<Key> {
    derive(store, entity, policy, true).map(|derived| derived.key)
}

fn derive(
    store: &dyn Store,
    entity: &mut dyn Entity,
    policy: KeyPolicy,
    root: bool,
) -> Result<Derived> {
    if let Some(putter) = entity.as_putter() {
        let key = putter.on_put(store)?;
        return Ok(Derived {
            key,
            provided: true,
        });
    }

    let kind = entity.kind().to_string();
    let terminal = || Derived {
        key: Key::incomplete(kind.clone(), None),
        provided: false,
    };

    match entity.shape() {
        Shape::Scalar => Ok(terminal()),
        Shape::Sequence if root => Err(Error::invalid_argument(format!(
            "cannot derive a key for sequence of kind {}",
            kind
        ))),
        Shape::Sequence => Ok(terminal()),
        Shape::Composite(members) => match policy {
            KeyPolicy::FirstField => match members.into_iter().next() {
                Some(first) => derive(store, first, policy, false),
                None => Ok(terminal()),
            },
            KeyPolicy::FirstProvider => {
                for member in members {
                    let derived = derive(store, member, policy, false)?;
                    if derived.provided {
                        return Ok(derived);
                    }
                }
                Ok(terminal())
            }
        },
    }
}
