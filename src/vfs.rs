use crate::messages;

/// extensions that make a name "look like" a file
pub const FILE_EXTENSIONS: [&str; 4] = ["txt", "md", "pem", "js"];

/// Name of the root directory as shown in prompts and `pwd`.
pub const ROOT_DIR: &str = "~";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsNode {
    File {
        name: String,
        content: String,
    },
    Directory {
        name: String,
        // insertion order is listing order
        children: Vec<VfsNode>,
    },
}

impl VfsNode {
    pub fn file(name: &str, content: &str) -> Self {
        VfsNode::File {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    pub fn directory(name: &str) -> Self {
        VfsNode::Directory {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: &str, children: Vec<VfsNode>) -> Self {
        VfsNode::Directory {
            name: name.to_string(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VfsNode::File { name, .. } | VfsNode::Directory { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            VfsNode::File { .. } => NodeKind::File,
            VfsNode::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    pub fn children(&self) -> &[VfsNode] {
        match self {
            VfsNode::Directory { children, .. } => children,
            VfsNode::File { .. } => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&VfsNode> {
        self.children().iter().find(|c| c.name() == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut VfsNode> {
        match self {
            VfsNode::Directory { children, .. } => children.iter_mut().find(|c| c.name() == name),
            VfsNode::File { .. } => None,
        }
    }

    /// insert, or replace in place so the entry keeps its listing position
    fn upsert(&mut self, node: VfsNode) {
        if let VfsNode::Directory { children, .. } = self {
            match children.iter_mut().find(|c| c.name() == node.name()) {
                Some(existing) => *existing = node,
                None => children.push(node),
            }
        }
    }
}

/// Extension heuristic: `notes.md` looks like a file, `projects` doesn't.
/// Only used for validating input and picking messages; the tree itself
/// stores the real kind.
pub fn is_file_name(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_lowercase();
            FILE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFileSystem {
    pub root: VfsNode,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    pub fn new() -> Self {
        Self {
            root: VfsNode::directory(ROOT_DIR),
        }
    }

    pub fn from_root(root: VfsNode) -> Self {
        Self { root }
    }

    /// the tree every fresh browser starts with
    pub fn with_defaults() -> Self {
        let root = VfsNode::with_children(
            ROOT_DIR,
            vec![
                VfsNode::file("bio.md", messages::WELCOME_MESSAGE),
                VfsNode::with_children(
                    "projects",
                    vec![
                        VfsNode::file("zip-diff-viewer.md", messages::ZIP_DIFF_VIEWER_PROJECT),
                        VfsNode::file("Neat.md", messages::NEAT_PROJECT),
                    ],
                ),
                VfsNode::file("secret_keys.pem", messages::SAMPLE_PEM_KEY),
            ],
        );
        Self { root }
    }

    /// Walks `path` from the root. Stops at the first segment that is missing
    /// or not a directory and hands back the deepest directory reached, so
    /// this never fails: a bogus path resolves to somewhere above it.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> &VfsNode {
        let mut node = &self.root;
        for segment in path {
            match node.child(segment.as_ref()) {
                Some(next) if next.is_dir() => node = next,
                _ => break,
            }
        }
        node
    }

    fn resolve_mut<S: AsRef<str>>(&mut self, path: &[S]) -> &mut VfsNode {
        descend(&mut self.root, path)
    }

    /// strict lookup, every segment has to exist
    pub fn resolve_exact<S: AsRef<str>>(&self, path: &[S]) -> Option<&VfsNode> {
        let mut node = &self.root;
        for segment in path {
            node = node.child(segment.as_ref())?;
        }
        Some(node)
    }

    /// Content of `name` in the directory at `path`, or "" when there is no
    /// such file or the name doesn't look like one.
    pub fn get_file<S: AsRef<str>>(&self, name: &str, path: &[S]) -> String {
        if !is_file_name(name) {
            return String::new();
        }
        match self.resolve(path).child(name) {
            Some(VfsNode::File { content, .. }) => content.clone(),
            _ => String::new(),
        }
    }

    /// overwrites whatever is already there under that name
    pub fn add_file<S: AsRef<str>>(&mut self, name: &str, content: &str, path: &[S]) {
        self.resolve_mut(path).upsert(VfsNode::file(name, content));
    }

    pub fn add_folder<S: AsRef<str>>(&mut self, name: &str, path: &[S]) {
        self.resolve_mut(path).upsert(VfsNode::directory(name));
    }

    /// Sets the content of `name` under `path`, creating the file if needed.
    /// Refuses to clobber a directory of the same name.
    pub fn save_file<S: AsRef<str>>(&mut self, name: &str, content: &str, path: &[S]) -> bool {
        let dir = self.resolve_mut(path);
        match dir.child_mut(name) {
            Some(VfsNode::File { content: existing, .. }) => {
                *existing = content.to_string();
                true
            }
            Some(VfsNode::Directory { .. }) => false,
            None => {
                dir.upsert(VfsNode::file(name, content));
                true
            }
        }
    }

    /// First entry of `kind` named `name` anywhere in the tree.
    pub fn find<'a>(&'a self, name: &str, kind: NodeKind) -> Option<&'a VfsNode> {
        find_in(&self.root, name, kind)
    }

    /// global delete, first match wins (see `find`)
    pub fn delete_file(&mut self, name: &str) -> bool {
        remove_first(&mut self.root, name, NodeKind::File)
    }

    pub fn delete_folder(&mut self, name: &str) -> bool {
        remove_first(&mut self.root, name, NodeKind::Directory)
    }

    /// Path-qualified delete: only looks at the direct children of the
    /// directory at exactly `path`.
    pub fn delete_in<S: AsRef<str>>(&mut self, path: &[S], name: &str, kind: NodeKind) -> bool {
        if self.resolve_exact(path).map_or(true, |n| !n.is_dir()) {
            return false;
        }
        match self.resolve_mut(path) {
            VfsNode::Directory { children, .. } => {
                match children.iter().position(|c| c.name() == name && c.kind() == kind) {
                    Some(pos) => {
                        children.remove(pos);
                        true
                    }
                    None => false,
                }
            }
            VfsNode::File { .. } => false,
        }
    }
}

fn descend<'a, S: AsRef<str>>(node: &'a mut VfsNode, path: &[S]) -> &'a mut VfsNode {
    let Some((first, rest)) = path.split_first() else {
        return node;
    };
    let pos = node
        .children()
        .iter()
        .position(|c| c.name() == first.as_ref() && c.is_dir());
    match (pos, node) {
        (Some(pos), VfsNode::Directory { children, .. }) => descend(&mut children[pos], rest),
        (_, node) => node,
    }
}

// Search order for the global lookups: a directory's own children first,
// then each subdirectory in listing order.
fn find_in<'a>(dir: &'a VfsNode, name: &str, kind: NodeKind) -> Option<&'a VfsNode> {
    if let Some(hit) = dir.children().iter().find(|c| c.name() == name && c.kind() == kind) {
        return Some(hit);
    }
    dir.children()
        .iter()
        .filter(|c| c.is_dir())
        .find_map(|sub| find_in(sub, name, kind))
}

fn remove_first(dir: &mut VfsNode, name: &str, kind: NodeKind) -> bool {
    let VfsNode::Directory { children, .. } = dir else {
        return false;
    };
    if let Some(pos) = children.iter().position(|c| c.name() == name && c.kind() == kind) {
        children.remove(pos);
        return true;
    }
    children
        .iter_mut()
        .filter(|c| c.is_dir())
        .any(|sub| remove_first(sub, name, kind))
}
