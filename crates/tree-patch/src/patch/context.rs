//! Per-call copy cache for the copy-on-write walk.

use std::collections::HashMap;

use crate::node::Node;

/// Records which containers have already been cloned during one patch call.
///
/// Keys are cumulative paths from the root (`projects/0/team`), values are the
/// identity of the clone installed at that path. A context belongs to exactly
/// one root: when it is used with a different root it starts over.
#[derive(Debug, Default)]
pub struct PatchContext {
    root: Option<usize>,
    copies: HashMap<String, usize>,
}

impl PatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every recorded clone and the tracked root.
    pub fn reset(&mut self) {
        self.root = None;
        self.copies.clear();
    }

    /// Track `root`, starting over if it is not the root seen last.
    pub(crate) fn bind_root(&mut self, root: &Node) {
        let id = root.container_id();
        if self.root != id {
            self.copies.clear();
            self.root = id;
        }
    }

    /// Returns true if `node` is the clone recorded at `path`.
    pub(crate) fn is_copy(&self, path: &str, node: &Node) -> bool {
        match (self.copies.get(path), node.container_id()) {
            (Some(recorded), Some(id)) => *recorded == id,
            _ => false,
        }
    }

    pub(crate) fn record(&mut self, path: &str, node: &Node) {
        if let Some(id) = node.container_id() {
            self.copies.insert(path.to_string(), id);
        }
    }

    /// Number of recorded clones.
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Returns true if a clone has been recorded at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.copies.contains_key(path)
    }
}
