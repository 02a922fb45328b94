use crate::config::TerminalConfig;
use crate::customization::CustomizationStore;
use crate::diagnostics::{MemoryProbe, StaticMemoryProbe};
use crate::storage::{FilesStore, MemoryStore, SharedStore};
use crate::vfs::ROOT_DIR;
use serde::Serialize;
use std::rc::Rc;

/// what `vim` hands to the page's editor panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorState {
    pub visible: bool,
    pub filename: String,
    pub content: String,
}

/// Everything the interpreter reads and writes. Built once per session and
/// passed in explicitly; there is no global state behind it.
pub struct TerminalContext {
    pub files: FilesStore,
    pub customization: CustomizationStore,
    pub storage: SharedStore,
    /// `~` or `~/projects`, only `cd` (or the relay) moves it
    pub cwd: String,
    pub history: Vec<String>,
    pub editor: EditorState,
    pub memory: Box<dyn MemoryProbe>,
    pub config: TerminalConfig,
    command_names: Vec<String>,
}

impl TerminalContext {
    pub fn new(config: TerminalConfig, storage: SharedStore, memory: Box<dyn MemoryProbe>) -> Self {
        let files = FilesStore::load_or_seed(storage.clone(), &config.files_key);
        let customization =
            CustomizationStore::load_or_seed(storage.clone(), &config.customization_key, &config.theme_key);
        Self {
            files,
            customization,
            storage,
            cwd: ROOT_DIR.to_string(),
            history: Vec::new(),
            editor: EditorState::default(),
            memory,
            config,
            command_names: Vec::new(),
        }
    }

    /// throwaway context on a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::with_config(TerminalConfig::default())
    }

    pub fn with_config(config: TerminalConfig) -> Self {
        Self::new(config, Rc::new(MemoryStore::new()), Box::new(StaticMemoryProbe(None)))
    }

    /// cwd as path segments below the root, `~/a/b` -> ["a", "b"]
    pub fn cwd_segments(&self) -> Vec<String> {
        let rest = self.cwd.strip_prefix(ROOT_DIR).unwrap_or(&self.cwd);
        rest.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn set_cwd_segments<S: AsRef<str>>(&mut self, segments: &[S]) {
        let mut cwd = ROOT_DIR.to_string();
        for segment in segments {
            cwd.push('/');
            cwd.push_str(segment.as_ref());
        }
        self.cwd = cwd;
    }

    pub fn set_command_names(&mut self, names: Vec<String>) {
        self.command_names = names;
    }

    pub fn command_names(&self) -> &[String] {
        &self.command_names
    }

    pub fn open_editor(&mut self, filename: &str) {
        let content = self.files.get_file(filename, &self.cwd_segments());
        self.editor = EditorState {
            visible: true,
            filename: filename.to_string(),
            content,
        };
    }

    /// Writes the buffer back to the file in the current directory. False
    /// when no editor is open or a directory has that name.
    pub fn save_editor(&mut self, content: &str) -> bool {
        if !self.editor.visible {
            return false;
        }
        let path = self.cwd_segments();
        let saved = self.files.save_file(&self.editor.filename, content, &path);
        if saved {
            self.editor.content = content.to_string();
        }
        saved
    }

    pub fn close_editor(&mut self) {
        self.editor = EditorState::default();
    }
}
