//! Blog workflow through the public API

use crate::common::*;
use strata_persist::{
    fetch_page, get_instance, open_in_memory, EngineConfig, EntityAccess, Error, FilterOp, Key,
    PageRequest, PageResponse, Query, TransactionOptions,
};

fn posts_of(author: &Author) -> Query {
    Query::new("Post").ancestor(author.key())
}

#[test]
fn test_posts_stored_under_author() {
    let ds = open_in_memory();
    let (author, keys) = seed_posts(&ds, 1, 3);
    for key in &keys {
        assert_eq!(key.parent(), Some(&author.key()));
        assert!(key.has_ancestor(&author.key()));
    }
}

#[test]
fn test_getter_fills_derived_fields() {
    let ds = open_in_memory();
    let (_author, keys) = seed_posts(&ds, 1, 1);

    let mut post = Post::default();
    ds.get(&keys[0], &mut post).unwrap();
    assert_eq!(post.words, 3);
    assert_eq!(post.id, keys[0].id());
    assert_eq!(post.key.as_ref(), Some(&keys[0]));
}

#[test]
fn test_newest_first_listing() {
    let ds = open_in_memory();
    let (author, _) = seed_posts(&ds, 1, 5);
    seed_posts(&ds, 2, 5);

    let mut posts: Vec<Post> = Vec::new();
    ds.get_all(&posts_of(&author).order("-published"), &mut posts).unwrap();
    let published: Vec<i64> = posts.iter().map(|p| p.published).collect();
    assert_eq!(published, vec![5, 4, 3, 2, 1]);
    assert!(posts.iter().all(|p| p.author == author.id));
}

#[test]
fn test_filtered_listing() {
    let ds = open_in_memory();
    let (author, _) = seed_posts(&ds, 1, 6);

    let mut posts: Vec<Post> = Vec::new();
    let query = posts_of(&author)
        .filter("published", FilterOp::Gt, 2)
        .filter("published", FilterOp::Le, 4)
        .order("published");
    ds.get_all(&query, &mut posts).unwrap();
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["post 3", "post 4"]);
}

#[test]
fn test_paged_listing_round_trip() {
    let ds = open_in_memory();
    let (author, _) = seed_posts(&ds, 1, 10);
    let config = EngineConfig::default();
    let query = posts_of(&author).order("published");

    let mut seen = Vec::new();
    let mut request = PageRequest::with_limit(4);
    loop {
        let page: PageResponse<Post> = fetch_page(&ds, &query, &request, &config).unwrap();
        let fetched = page.response.len();
        seen.extend(page.response.into_iter().map(|p| p.published));
        if fetched < 4 {
            break;
        }
        request = PageRequest::with_limit(4).next(page.page_token);
    }
    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_get_instance_for_new_and_stored() {
    let ds = open_in_memory();
    let (author, keys) = seed_posts(&ds, 1, 1);

    let draft = Post::new(&author, "draft", "not saved", 0);
    let draft = get_instance(&ds, draft).unwrap();
    assert_eq!(draft.title, "draft");
    assert!(draft.key.is_none());

    let probe = Post {
        id: keys[0].id(),
        author: author.id,
        ..Post::default()
    };
    let stored = get_instance(&ds, probe).unwrap();
    assert_eq!(stored.title, "post 1");
}

#[test]
fn test_move_post_between_authors_in_transaction() {
    let ds = open_in_memory();
    let (_alice, keys) = seed_posts(&ds, 1, 1);
    let (bob, _) = seed_posts(&ds, 2, 0);

    let mut moved = Key::new("Post", 0, None);
    ds.run_in_transaction(&TransactionOptions::default(), |txn| {
        let mut post = Post::default();
        txn.get(&keys[0], &mut post)?;
        txn.delete(&keys[0])?;
        post.author = bob.id;
        post.id = 0;
        moved = txn.put(&mut post)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(moved.parent(), Some(&bob.key()));
    let mut post = Post::default();
    assert!(ds.get(&keys[0], &mut post).unwrap_err().is_not_found());
    ds.get(&moved, &mut post).unwrap();
    assert_eq!(post.title, "post 1");
}

#[test]
fn test_invalid_author_rejected_before_write() {
    let ds = open_in_memory();
    let mut author = Author {
        id: 3,
        name: "  ".into(),
    };
    let err = ds.put(&mut author).unwrap_err();
    assert_eq!(err.reason_code(), "hook_failed");
    assert!(!err.is_client_error());

    let mut loaded = Author::default();
    assert!(matches!(
        ds.get(&Key::new("Author", 3, None), &mut loaded),
        Err(Error::NotFound(_))
    ));
}
