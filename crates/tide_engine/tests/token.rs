use std::fs;

use tempfile::TempDir;
use tide_engine::{TokenRegistry, TokenStore, TOKEN_FILENAME};

fn init_logging() {
    tide_logging::initialize_for_tests();
}

#[test]
fn store_round_trips_token() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = TokenStore::new(temp.path().join("cache"));
    assert_eq!(store.load(), None);

    let path = store.save("abc123").unwrap();
    assert_eq!(path.file_name().unwrap(), TOKEN_FILENAME);
    assert_eq!(store.load(), Some("abc123".to_string()));

    store.save("xyz789").unwrap();
    assert_eq!(store.load(), Some("xyz789".to_string()));
}

#[test]
fn corrupt_cache_reads_as_missing() {
    init_logging();
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(TOKEN_FILENAME), "{{ not ron").unwrap();

    let store = TokenStore::new(temp.path().to_path_buf());
    assert_eq!(store.load(), None);
}

#[test]
fn registry_persists_and_notifies_subscribers() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let registry = TokenRegistry::new(TokenStore::new(temp.path().to_path_buf()));
    assert_eq!(registry.cached(), None);

    let first = registry.subscribe();
    let second = registry.subscribe();
    registry.receive("abc123");

    assert_eq!(first.try_recv(), Ok("abc123".to_string()));
    assert_eq!(second.try_recv(), Ok("abc123".to_string()));
    assert_eq!(registry.cached(), Some("abc123".to_string()));

    let reopened = TokenRegistry::new(TokenStore::new(temp.path().to_path_buf()));
    assert_eq!(reopened.cached(), Some("abc123".to_string()));
}

#[test]
fn empty_tokens_are_ignored() {
    init_logging();
    let registry = TokenRegistry::in_memory();
    let rx = registry.subscribe();

    registry.receive("");

    assert!(rx.try_recv().is_err());
    assert_eq!(registry.cached(), None);
}

#[test]
fn dropped_subscribers_do_not_block_delivery() {
    init_logging();
    let registry = TokenRegistry::in_memory();
    let dropped = registry.subscribe();
    let live = registry.subscribe();
    drop(dropped);

    registry.receive("one");
    registry.receive("two");

    assert_eq!(live.try_iter().collect::<Vec<_>>(), vec!["one", "two"]);
}

#[test]
fn unwritable_store_still_delivers_token() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let registry = TokenRegistry::new(TokenStore::new(file_path));
    let rx = registry.subscribe();
    registry.receive("abc");

    assert_eq!(rx.try_recv(), Ok("abc".to_string()));
    assert_eq!(registry.cached(), Some("abc".to_string()));
}
