#![cfg(target_arch = "wasm32")]

use browser_terminal::config::DEFAULT_FILES_KEY;
use browser_terminal::storage::{FilesStore, KeyValueStore, LocalStore, SharedStore};
use std::rc::Rc;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_local_store_round_trip() {
    let store = LocalStore::open().unwrap();
    store.set("terminal-test", "value").unwrap();
    assert_eq!(store.get("terminal-test").unwrap().as_deref(), Some("value"));
    store.remove("terminal-test").unwrap();
    assert_eq!(store.get("terminal-test").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_files_persist_in_local_storage() {
    let store: SharedStore = Rc::new(LocalStore::open().unwrap());
    store.clear().unwrap();

    let mut files = FilesStore::load_or_seed(store.clone(), DEFAULT_FILES_KEY);
    files.add_file("from-browser.txt", "hi", &[] as &[&str]);

    let reloaded = FilesStore::load_or_seed(store.clone(), DEFAULT_FILES_KEY);
    assert_eq!(reloaded.get_file("from-browser.txt", &[] as &[&str]), "hi");
    store.clear().unwrap();
}
