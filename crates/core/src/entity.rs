//! Entity structure and lifecycle capabilities
//!
//! Entities describe their own structure instead of being inspected at
//! runtime. A composite entity lists its members in declaration order through
//! `Entity::shape`, and opts into lifecycle hooks by returning itself from
//! `as_getter` / `as_putter`. Both are checked at compile time: an entity can
//! only expose `Getter` if it implements it.
//!
//! ```
//! use persist_core::{Entity, Key, Putter, Result, Shape, Store};
//!
//! struct Comment {
//!     id: i64,
//!     post: Key,
//!     body: String,
//! }
//!
//! impl Putter for Comment {
//!     fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
//!         Ok(Key::new("Comment", self.id, Some(self.post.clone())))
//!     }
//! }
//!
//! impl Entity for Comment {
//!     fn as_putter(&mut self) -> Option<&mut dyn Putter> {
//!         Some(self)
//!     }
//!
//!     fn shape(&mut self) -> Shape<'_> {
//!         Shape::Composite(vec![&mut self.id as &mut dyn Entity, &mut self.post, &mut self.body])
//!     }
//! }
//! ```

use crate::error::Result;
use crate::key::Key;
use crate::traits::Store;

/// Post-get lifecycle hook
///
/// Called after the entity has been populated from the store, with the key
/// it was loaded under. A member exposing `Getter` owns the post-processing
/// of its whole subtree: its own members are not visited.
pub trait Getter {
    /// Runs after the value was loaded under `key`
    fn on_get(&mut self, store: &dyn Store, key: &Key) -> Result<()>;
}

/// Pre-put lifecycle hook and key provider
///
/// Called before the entity is written. Returns the key to store it under,
/// which may be incomplete. Any "before save" side effects belong here.
pub trait Putter {
    /// Runs before the value is written and supplies its key
    fn on_put(&mut self, store: &dyn Store) -> Result<Key>;
}

/// Structural shape of an entity value
pub enum Shape<'a> {
    /// Leaf value with no members
    Scalar,
    /// Structured value; members in declaration order
    Composite(Vec<&'a mut dyn Entity>),
    /// Homogeneous collection; never a key source
    Sequence,
}

impl Shape<'_> {
    /// Short name of the shape for messages
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Composite(_) => "composite",
            Shape::Sequence => "sequence",
        }
    }
}

/// A value the persistence layer can key, hook and traverse
pub trait Entity {
    /// Kind used for keys synthesized from this value
    ///
    /// Defaults to the short type name.
    fn kind(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Exposes the `Getter` capability
    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        None
    }

    /// Exposes the `Putter` capability
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        None
    }

    /// Structure of this value
    fn shape(&mut self) -> Shape<'_> {
        Shape::Scalar
    }
}

/// Strip module paths and generic arguments from a type name
///
/// `alloc::boxed::Box<app::Post>` becomes `Box`, `app::models::Post` becomes `Post`.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

macro_rules! scalar_entity {
    ($($ty:ty),* $(,)?) => {
        $(impl Entity for $ty {})*
    };
}

scalar_entity!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, Key,
);

impl<T: Entity> Entity for Vec<T> {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Sequence
    }
}

impl<T: Entity + ?Sized> Entity for Box<T> {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        (**self).as_getter()
    }

    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        (**self).as_putter()
    }

    fn shape(&mut self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Entity> Entity for Option<T> {
    fn kind(&self) -> &str {
        match self {
            Some(inner) => inner.kind(),
            None => short_type_name(std::any::type_name::<T>()),
        }
    }

    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        self.as_mut().and_then(|inner| inner.as_getter())
    }

    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        self.as_mut().and_then(|inner| inner.as_putter())
    }

    fn shape(&mut self) -> Shape<'_> {
        match self {
            Some(inner) => inner.shape(),
            None => Shape::Scalar,
        }
    }
}
