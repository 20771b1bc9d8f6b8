//! The same workflow over each record encoding

use crate::common::*;
use strata_persist::{
    Codec, EntityAccess, PersistConfig, Query, Store,
};

fn open_with(codec: Codec) -> strata_persist::Datastore {
    let mut config = PersistConfig::default();
    config.store.codec = codec;
    config.open_in_memory().unwrap()
}

fn round_trip(codec: Codec) {
    let ds = open_with(codec);
    assert_eq!(ds.shared_store().codec(), codec);

    let (author, keys) = seed_posts(&ds, 1, 4);
    let mut posts = vec![Post::default(); keys.len()];
    ds.get_multi(&keys, &mut posts).unwrap();
    assert!(posts.iter().all(|p| p.words == 3));

    let mut ordered: Vec<Post> = Vec::new();
    ds.get_all(
        &Query::new("Post").ancestor(author.key()).order("-published"),
        &mut ordered,
    )
    .unwrap();
    assert_eq!(ordered.first().map(|p| p.published), Some(4));
}

#[test]
fn test_message_pack_store() {
    round_trip(Codec::MessagePack);
}

#[test]
fn test_json_store() {
    round_trip(Codec::Json);
}

#[test]
fn test_json_records_are_readable() {
    let ds = open_with(Codec::Json);
    let (_, keys) = seed_posts(&ds, 1, 1);
    let record = ds.shared_store().get(&keys[0]).unwrap();
    let value: serde_json::Value = serde_json::from_slice(record.as_bytes()).unwrap();
    assert_eq!(value["title"], "post 1");
    assert!(value.get("words").is_none(), "skipped fields are not stored");
}
