//! Shared entities for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use persist_core::{Entity, Error, Getter, Key, Putter, Result, Shape, Store};
use persist_engine::Datastore;
use persist_storage::MemoryStore;
use serde::{Deserialize, Serialize};

pub fn datastore() -> (Arc<MemoryStore>, Datastore) {
    let store = Arc::new(MemoryStore::new());
    let ds = Datastore::new(store.clone());
    (store, ds)
}

pub fn board() -> Key {
    Key::new("Board", 1, None)
}

/// Keyed by its own id under the board; remembers the key it was loaded under
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub loaded_as: Option<Key>,
    #[serde(skip)]
    pub puts: u32,
}

impl Item {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Putter for Item {
    fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
        self.puts += 1;
        Ok(Key::new("Item", self.id, Some(board())))
    }
}

impl Getter for Item {
    fn on_get(&mut self, _store: &dyn Store, key: &Key) -> Result<()> {
        self.id = key.id();
        self.loaded_as = Some(key.clone());
        Ok(())
    }
}

impl Entity for Item {
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        Some(self)
    }

    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        Some(self)
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Composite(vec![&mut self.id as &mut dyn Entity, &mut self.name])
    }
}

/// Getter fails for names starting with "bad"; putter refuses empty names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Picky {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub hooked: bool,
}

impl Picky {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            hooked: false,
        }
    }
}

impl Putter for Picky {
    fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
        if self.name.is_empty() {
            return Err(Error::hook("picky entities need a name"));
        }
        Ok(Key::new("Picky", self.id, None))
    }
}

impl Getter for Picky {
    fn on_get(&mut self, _store: &dyn Store, _key: &Key) -> Result<()> {
        if self.name.starts_with("bad") {
            return Err(Error::hook(format!("refusing {}", self.name)));
        }
        self.hooked = true;
        Ok(())
    }
}

impl Entity for Picky {
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        Some(self)
    }

    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        Some(self)
    }
}

/// Counter keyed by id, no hooks beyond the key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: i64,
    pub value: i64,
}

impl Putter for Counter {
    fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
        Ok(Key::new("Counter", self.id, None))
    }
}

impl Entity for Counter {
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        Some(self)
    }
}

/// Tracks how often its getter ran; not a key provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub note: String,
    #[serde(skip)]
    pub seen: u32,
}

impl Getter for Audit {
    fn on_get(&mut self, _store: &dyn Store, _key: &Key) -> Result<()> {
        self.seen += 1;
        Ok(())
    }
}

impl Entity for Audit {
    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        Some(self)
    }
}

/// Document whose key comes from its owner member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub owner: Counter,
    pub audit: Audit,
}

impl Entity for Note {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Composite(vec![
            &mut self.title as &mut dyn Entity,
            &mut self.owner,
            &mut self.audit,
        ])
    }
}
