//! Shared test utilities for root integration suites.
//!
//! A small blog model: authors own posts, posts carry a Getter that fills in
//! derived fields after every load.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use strata_persist::{Entity, Error, Getter, Key, Putter, Result, Shape, Store};

/// Root entity keyed by its id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Author {
    pub fn key(&self) -> Key {
        Key::new("Author", self.id, None)
    }
}

impl Putter for Author {
    fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
        if self.name.trim().is_empty() {
            return Err(Error::hook("author name is required"));
        }
        Ok(self.key())
    }
}

impl Entity for Author {
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        Some(self)
    }
}

/// Child of an author; `words` is computed on load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author: i64,
    pub title: String,
    pub body: String,
    pub published: i64,
    #[serde(skip)]
    pub words: usize,
    #[serde(skip)]
    pub key: Option<Key>,
}

impl Post {
    pub fn new(author: &Author, title: &str, body: &str, published: i64) -> Self {
        Self {
            author: author.id,
            title: title.to_string(),
            body: body.to_string(),
            published,
            ..Self::default()
        }
    }
}

impl Putter for Post {
    fn on_put(&mut self, _store: &dyn Store) -> Result<Key> {
        let parent = Key::new("Author", self.author, None);
        Ok(Key::new("Post", self.id, Some(parent)))
    }
}

impl Getter for Post {
    fn on_get(&mut self, _store: &dyn Store, key: &Key) -> Result<()> {
        self.id = key.id();
        self.words = self.body.split_whitespace().count();
        self.key = Some(key.clone());
        Ok(())
    }
}

impl Entity for Post {
    fn as_putter(&mut self) -> Option<&mut dyn Putter> {
        Some(self)
    }

    fn as_getter(&mut self) -> Option<&mut dyn Getter> {
        Some(self)
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Composite(vec![
            &mut self.id as &mut dyn Entity,
            &mut self.author,
            &mut self.title,
            &mut self.body,
            &mut self.published,
        ])
    }
}

/// Seed one author with `count` posts, published at 1..=count
pub fn seed_posts(ds: &strata_persist::Datastore, author_id: i64, count: usize) -> (Author, Vec<Key>) {
    use strata_persist::EntityAccess;

    let mut author = Author {
        id: author_id,
        name: format!("author-{}", author_id),
    };
    ds.put(&mut author).unwrap();
    let mut posts: Vec<Post> = (1..=count)
        .map(|i| Post::new(&author, &format!("post {}", i), "lorem ipsum dolor", i as i64))
        .collect();
    let keys = ds.put_multi(&mut posts).unwrap();
    (author, keys)
}
