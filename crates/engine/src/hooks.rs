//! Post-get hook dispatch
//!
//! Walks a freshly loaded entity depth first. A value exposing `Getter` is
//! called with the key the root was loaded under and its subtree is skipped;
//! composites recurse into members in declaration order. The first error
//! stops the walk.

use persist_core::{Entity, Key, Result, Shape, Store};

/// Run `Getter` hooks over `entity`, loaded under `key`
pub fn dispatch_get(store: &dyn Store, key: &Key, entity: &mut dyn Entity) -> Result<()> {
    if let Some(getter) = entity.as_getter() {
        return getter.on_get(store, key);
    }
    if let Shape::Composite(members) = entity.shape() {
        for member in members {
            dispatch_get(store, key, member)?;
        }
    }
    Ok(())
}
