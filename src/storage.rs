use crate::error::{Result, TerminalError};
use crate::vfs::{NodeKind, VfsNode, VirtualFileSystem, ROOT_DIR};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// String key/value storage, shaped like the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// one store, shared by the filesystem and customization stores
pub type SharedStore = Rc<dyn KeyValueStore>;

/// in-process store for tests and the native repl
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

/// `window.localStorage`
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| TerminalError::Storage("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| TerminalError::Storage(format!("localStorage unavailable: {:?}", e)))?
            .ok_or_else(|| TerminalError::Storage("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| TerminalError::Storage(format!("read of '{}' failed: {:?}", key, e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| TerminalError::Storage(format!("write of '{}' failed: {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| TerminalError::Storage(format!("remove of '{}' failed: {:?}", key, e)))
    }

    fn clear(&self) -> Result<()> {
        self.storage
            .clear()
            .map_err(|e| TerminalError::Storage(format!("clear failed: {:?}", e)))
    }
}

/// Stored shape: a directory is a JSON object of its children in listing
/// order, a file is its content string.
pub fn tree_to_json(node: &VfsNode) -> Value {
    match node {
        VfsNode::File { content, .. } => Value::String(content.clone()),
        VfsNode::Directory { children, .. } => {
            let mut map = Map::new();
            for child in children {
                map.insert(child.name().to_string(), tree_to_json(child));
            }
            Value::Object(map)
        }
    }
}

pub fn tree_from_json(value: &Value) -> Result<VfsNode> {
    match value {
        Value::Object(_) => node_from_json(ROOT_DIR, value),
        _ => Err(TerminalError::MalformedTree("root must be an object".to_string())),
    }
}

fn node_from_json(name: &str, value: &Value) -> Result<VfsNode> {
    match value {
        Value::String(content) => Ok(VfsNode::file(name, content)),
        Value::Object(map) => {
            let children = map
                .iter()
                .map(|(child, v)| node_from_json(child, v))
                .collect::<Result<Vec<_>>>()?;
            Ok(VfsNode::with_children(name, children))
        }
        other => Err(TerminalError::MalformedTree(format!(
            "entry '{}' is neither a file nor a directory: {}",
            name, other
        ))),
    }
}

/// The virtual filesystem plus its persistence. Every mutating call writes
/// the whole tree back under one key; write failures are logged and dropped.
pub struct FilesStore {
    vfs: VirtualFileSystem,
    store: SharedStore,
    key: String,
}

impl FilesStore {
    /// Loads the saved tree, or seeds the defaults and writes them straight
    /// away when nothing (or nothing readable) is stored.
    pub fn load_or_seed(store: SharedStore, key: &str) -> Self {
        let loaded = match store.get(key) {
            Ok(Some(json)) => match serde_json::from_str::<Value>(&json)
                .map_err(TerminalError::from)
                .and_then(|v| tree_from_json(&v))
            {
                Ok(root) => {
                    info!("loaded filesystem from '{}' ({} bytes)", key, json.len());
                    Some(VirtualFileSystem::from_root(root))
                }
                Err(e) => {
                    warn!("stored filesystem under '{}' unreadable, reseeding: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("no filesystem stored under '{}', seeding defaults", key);
                None
            }
            Err(e) => {
                warn!("could not read filesystem: {}", e);
                None
            }
        };

        let seeded = loaded.is_none();
        let files = Self {
            vfs: loaded.unwrap_or_else(VirtualFileSystem::with_defaults),
            store,
            key: key.to_string(),
        };
        if seeded {
            files.persist();
        }
        files
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn to_json(&self) -> String {
        tree_to_json(&self.vfs.root).to_string()
    }

    pub fn save(&self) -> Result<()> {
        let json = self.to_json();
        self.store.set(&self.key, &json)?;
        debug!("saved filesystem ({} bytes)", json.len());
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("filesystem not persisted: {}", e);
        }
    }

    /// swap in a whole tree from its stored JSON form
    pub fn replace_from_json(&mut self, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        let root = tree_from_json(&value)?;
        self.vfs = VirtualFileSystem::from_root(root);
        self.persist();
        Ok(())
    }

    pub fn get_file<S: AsRef<str>>(&self, name: &str, path: &[S]) -> String {
        self.vfs.get_file(name, path)
    }

    pub fn add_file<S: AsRef<str>>(&mut self, name: &str, content: &str, path: &[S]) {
        self.vfs.add_file(name, content, path);
        self.persist();
    }

    pub fn add_folder<S: AsRef<str>>(&mut self, name: &str, path: &[S]) {
        self.vfs.add_folder(name, path);
        self.persist();
    }

    pub fn save_file<S: AsRef<str>>(&mut self, name: &str, content: &str, path: &[S]) -> bool {
        let saved = self.vfs.save_file(name, content, path);
        if saved {
            self.persist();
        }
        saved
    }

    pub fn delete_file(&mut self, name: &str) -> bool {
        let removed = self.vfs.delete_file(name);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn delete_folder(&mut self, name: &str) -> bool {
        let removed = self.vfs.delete_folder(name);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn delete_in<S: AsRef<str>>(&mut self, path: &[S], name: &str, kind: NodeKind) -> bool {
        let removed = self.vfs.delete_in(path, name, kind);
        if removed {
            self.persist();
        }
        removed
    }
}
