//! Opening datastores from `persist.toml`

use crate::common::*;
use strata_persist::{open_dir, EntityAccess, KeyPolicy, PersistConfig, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn test_open_dir_writes_default_file() {
    let dir = TempDir::new().unwrap();
    let ds = open_dir(dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(content, PersistConfig::default_toml());
    assert_eq!(ds.key_policy(), KeyPolicy::FirstProvider);
}

#[test]
fn test_open_dir_honors_existing_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[engine]\nkey_policy = \"first_field\"\ndefault_page_size = 3\n",
    )
    .unwrap();

    let ds = open_dir(dir.path()).unwrap();
    assert_eq!(ds.key_policy(), KeyPolicy::FirstField);
    assert_eq!(ds.config().default_page_size, 3);
}

#[test]
fn test_open_dir_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[engine\n").unwrap();
    let err = open_dir(dir.path()).unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn test_configured_datastore_is_usable() {
    let dir = TempDir::new().unwrap();
    let ds = open_dir(dir.path()).unwrap();
    let (_, keys) = seed_posts(&ds, 9, 2);
    assert_eq!(keys.len(), 2);
}
