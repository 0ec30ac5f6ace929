//! Tree shared between threads: one loader, many readers.

use std::path::Path;

use parking_lot::RwLock;

use crate::config::CodecConfig;
use crate::errors::{VssResult, VssTreeError};
use crate::search::{SearchQuery, SearchResult, search};
use crate::tree::{
    DecodeReport, Node, NodeId, PathIndex, VssTree, read_tree_from_path, write_tree_atomic,
};

struct Loaded {
    tree: VssTree,
    index: PathIndex,
}

/// A [`VssTree`] behind a read-write lock, plus an exact-path index.
///
/// Loading decodes outside the lock and only takes the write lock to swap the
/// new tree in, so readers never observe a half-built tree.
#[derive(Default)]
pub struct SharedTree {
    inner: RwLock<Option<Loaded>>,
}

impl SharedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, tree: VssTree) {
        let index = tree.path_index();
        *self.inner.write() = Some(Loaded { tree, index });
    }

    pub fn load<P: AsRef<Path>>(&self, path: P, config: &CodecConfig) -> VssResult<DecodeReport> {
        let (tree, report) = read_tree_from_path(path, config)?;
        self.install(tree);
        Ok(report)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Run `f` against the current tree under a shared guard.
    pub fn read<R>(&self, f: impl FnOnce(&VssTree) -> R) -> VssResult<R> {
        let guard = self.inner.read();
        let loaded = guard.as_ref().ok_or_else(not_loaded)?;
        Ok(f(&loaded.tree))
    }

    /// Handle of the node at full dot path `path`.
    ///
    /// The handle belongs to the tree installed at the time of the call. A
    /// later [`install`](Self::install) or [`load`](Self::load) invalidates
    /// it, and it may then name a different node or none at all. Use
    /// [`with_node`](Self::with_node) to resolve and read under one guard.
    pub fn lookup(&self, path: &str) -> VssResult<NodeId> {
        let guard = self.inner.read();
        let loaded = guard.as_ref().ok_or_else(not_loaded)?;
        loaded
            .index
            .lookup(path)
            .ok_or_else(|| VssTreeError::not_found(path.to_string()))
    }

    /// Resolve `path` and run `f` on the node while the same guard is held.
    pub fn with_node<R>(&self, path: &str, f: impl FnOnce(&Node) -> R) -> VssResult<R> {
        let guard = self.inner.read();
        let loaded = guard.as_ref().ok_or_else(not_loaded)?;
        let id = loaded
            .index
            .lookup(path)
            .ok_or_else(|| VssTreeError::not_found(path.to_string()))?;
        Ok(f(loaded.tree.get(id)?))
    }

    /// Search below the tree root.
    pub fn search(&self, query: &SearchQuery) -> VssResult<SearchResult> {
        let guard = self.inner.read();
        let loaded = guard.as_ref().ok_or_else(not_loaded)?;
        search(&loaded.tree, loaded.tree.root(), query)
    }

    /// Atomically write a snapshot of the current tree to `path`.
    ///
    /// The read guard is held for the whole write, so no new tree can be
    /// installed halfway through.
    pub fn save<P: AsRef<Path>>(&self, path: P, config: &CodecConfig) -> VssResult<usize> {
        let guard = self.inner.read();
        let loaded = guard.as_ref().ok_or_else(not_loaded)?;
        write_tree_atomic(&loaded.tree, path, config)
    }
}

fn not_loaded() -> VssTreeError {
    VssTreeError::not_found("no tree loaded")
}
