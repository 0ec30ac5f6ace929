//! In-memory VSS tree.
//!
//! Nodes live in an arena owned by [`VssTree`] and refer to each other through
//! [`NodeId`] handles. Children are listed by their parent; the parent link is
//! a plain handle, so dropping the tree releases every node at once.

use std::fmt;

use ahash::AHashMap;

use crate::codec::constants::MAX_CHILDREN;
use crate::codec::{Datatype, NodeKind, NodeRecord, Validate};
use crate::errors::{VssResult, VssTreeError};

/// Handle to a node inside one [`VssTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node: its record plus structural links.
#[derive(Clone, Debug)]
pub struct Node {
    record: NodeRecord,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(record: NodeRecord, parent: Option<NodeId>) -> Self {
        Self {
            record,
            parent,
            children: Vec::new(),
        }
    }

    pub fn record(&self) -> &NodeRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn kind(&self) -> NodeKind {
        self.record.kind
    }

    pub fn uuid(&self) -> &str {
        &self.record.uuid
    }

    pub fn description(&self) -> &str {
        &self.record.description
    }

    /// Datatype of a signal; branches never report one.
    pub fn datatype(&self) -> Option<Datatype> {
        if self.is_branch() {
            return None;
        }
        self.record.datatype
    }

    pub fn min(&self) -> Option<&str> {
        non_empty(&self.record.min).filter(|_| !self.is_branch())
    }

    pub fn max(&self) -> Option<&str> {
        non_empty(&self.record.max).filter(|_| !self.is_branch())
    }

    pub fn unit(&self) -> Option<&str> {
        non_empty(&self.record.unit).filter(|_| !self.is_branch())
    }

    pub fn validate(&self) -> Validate {
        self.record.validate
    }

    pub fn default_allowed(&self) -> Option<&str> {
        non_empty(&self.record.default_allowed).filter(|_| !self.is_branch())
    }

    pub fn allowed_count(&self) -> usize {
        if self.is_branch() {
            return 0;
        }
        self.record.allowed.len()
    }

    pub fn allowed(&self, index: usize) -> Option<&str> {
        if self.is_branch() {
            return None;
        }
        self.record.allowed.get(index).map(String::as_str)
    }

    pub fn allowed_values(&self) -> &[String] {
        if self.is_branch() {
            return &[];
        }
        &self.record.allowed
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_branch(&self) -> bool {
        self.record.kind.is_branch()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Arena-backed VSS tree with a single root.
///
/// Slots of detached subtrees are tombstoned, never reused, so handles held by
/// callers cannot silently start pointing at a different node.
#[derive(Clone, Debug)]
pub struct VssTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    live: usize,
}

impl VssTree {
    /// Create a tree holding only `root`.
    pub fn new(root: NodeRecord) -> Self {
        Self::with_capacity(root, 1)
    }

    pub fn with_capacity(root: NodeRecord, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Some(Node::new(root, None)));
        Self {
            nodes,
            root: NodeId(0),
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Like [`VssTree::node`] but reports stale handles as `NotFound`.
    pub fn get(&self, id: NodeId) -> VssResult<&Node> {
        self.node(id)
            .ok_or_else(|| VssTreeError::not_found(format!("node {id}")))
    }

    fn get_mut(&mut self, id: NodeId) -> VssResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| VssTreeError::not_found(format!("node {id}")))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).and_then(|node| node.child(index))
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, Node::child_count)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    /// Child of `id` called `name`, if any.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        node.children
            .iter()
            .copied()
            .find(|child| self.name(*child) == Some(name))
    }

    /// Replace the root's fields; its children stay attached.
    pub fn set_root(&mut self, record: NodeRecord) -> VssResult<()> {
        if record.name.is_empty() {
            return Err(VssTreeError::invalid_input("node name must not be empty"));
        }
        let root = self.root;
        self.get_mut(root)?.record = record;
        Ok(())
    }

    /// Append a new child under `parent` and return its handle.
    ///
    /// Sibling names must be unique and a node holds at most 255 children.
    pub fn add_child(&mut self, parent: NodeId, record: NodeRecord) -> VssResult<NodeId> {
        if record.name.is_empty() {
            return Err(VssTreeError::invalid_input("node name must not be empty"));
        }
        let siblings = self.get(parent)?.child_count();
        if siblings >= MAX_CHILDREN {
            return Err(VssTreeError::invalid_input(format!(
                "{} already has {MAX_CHILDREN} children",
                self.path(parent)
            )));
        }
        if self.find_child(parent, &record.name).is_some() {
            return Err(VssTreeError::invalid_input(format!(
                "{} already has a child named {}",
                self.path(parent),
                record.name
            )));
        }
        Ok(self.push_child(parent, record))
    }

    /// Append without the sibling checks; the decoder trusts the stream.
    pub(crate) fn push_child(&mut self, parent: NodeId, record: NodeRecord) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(record, Some(parent))));
        self.live += 1;
        if let Some(Some(node)) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    /// Copy every node of `subtree` under `parent`, returning the new handle
    /// of the subtree's root.
    pub fn graft(&mut self, parent: NodeId, subtree: &VssTree) -> VssResult<NodeId> {
        let top = self.add_child(parent, subtree.get(subtree.root)?.record.clone())?;
        let mut pending = vec![(subtree.root, top)];
        while let Some((source, target)) = pending.pop() {
            for &child in subtree.get(source)?.children() {
                let record = subtree.get(child)?.record.clone();
                let copied = self.push_child(target, record);
                pending.push((child, copied));
            }
        }
        Ok(top)
    }

    /// Remove the `index`-th child subtree of `parent` and return it as its own tree.
    pub fn detach_child(&mut self, parent: NodeId, index: usize) -> VssResult<VssTree> {
        let child = self.get(parent)?.child(index).ok_or_else(|| {
            VssTreeError::not_found(format!("child {index} of {}", self.path(parent)))
        })?;
        let detached = self.extract(child)?;
        for id in self.preorder(child).collect::<Vec<_>>() {
            self.nodes[id.0] = None;
            self.live -= 1;
        }
        self.get_mut(parent)?.children.remove(index);
        Ok(detached)
    }

    /// Copy the subtree rooted at `id` into a standalone tree.
    pub fn extract(&self, id: NodeId) -> VssResult<VssTree> {
        let mut copy = VssTree::new(self.get(id)?.record.clone());
        let mut pending = vec![(id, copy.root)];
        while let Some((source, target)) = pending.pop() {
            for &child in self.get(source)?.children() {
                let copied = copy.push_child(target, self.get(child)?.record.clone());
                pending.push((child, copied));
            }
        }
        Ok(copy)
    }

    /// Number of edges between the root and `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Dot-separated names from the root down to `id`, root included.
    pub fn path(&self, id: NodeId) -> String {
        self.path_from(self.root, id).unwrap_or_default()
    }

    /// Dot path of `id` starting at `ancestor` (inclusive). `None` when
    /// `ancestor` is not on the way up from `id`.
    pub fn path_from(&self, ancestor: NodeId, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            names.push(node.name());
            if node_id == ancestor {
                names.reverse();
                return Some(names.join("."));
            }
            current = node.parent;
        }
        None
    }

    /// Pre-order, left-to-right walk of the subtree rooted at `start`.
    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        let stack = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Preorder { tree: self, stack }
    }

    /// Pre-order walk of the whole tree.
    pub fn iter(&self) -> Preorder<'_> {
        self.preorder(self.root)
    }

    /// Build a lookup table from full dot path to handle.
    pub fn path_index(&self) -> PathIndex {
        let mut paths = AHashMap::with_capacity(self.live);
        let mut pending = vec![(self.root, self.get_name_unchecked(self.root).to_string())];
        while let Some((id, path)) = pending.pop() {
            if let Some(node) = self.node(id) {
                for &child in node.children.iter().rev() {
                    let child_path = format!("{path}.{}", self.get_name_unchecked(child));
                    pending.push((child, child_path));
                }
            }
            paths.insert(path, id);
        }
        PathIndex { paths }
    }

    fn get_name_unchecked(&self, id: NodeId) -> &str {
        self.name(id).unwrap_or_default()
    }
}

impl PartialEq for VssTree {
    /// Trees are equal when their pre-order walks yield equal records with
    /// equal child counts, regardless of arena layout.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().zip(other.iter()).all(|(a, b)| {
            match (self.node(a), other.node(b)) {
                (Some(left), Some(right)) => {
                    left.record == right.record && left.child_count() == right.child_count()
                }
                _ => false,
            }
        })
    }
}

impl Eq for VssTree {}

/// Iterator returned by [`VssTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a VssTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.node(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}

/// Exact full-path lookup built by [`VssTree::path_index`].
#[derive(Clone, Debug, Default)]
pub struct PathIndex {
    paths: AHashMap<String, NodeId>,
}

impl PathIndex {
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (VssTree, NodeId, NodeId, NodeId) {
        let mut tree = VssTree::new(NodeRecord::branch("Vehicle"));
        let cabin = tree
            .add_child(tree.root(), NodeRecord::branch("Cabin"))
            .unwrap();
        let speed = tree
            .add_child(
                tree.root(),
                NodeRecord::leaf("Speed", NodeKind::Sensor, Datatype::Float).with_unit("km/h"),
            )
            .unwrap();
        let light = tree
            .add_child(
                cabin,
                NodeRecord::leaf("Light", NodeKind::Actuator, Datatype::String)
                    .with_allowed(["OFF", "ON"]),
            )
            .unwrap();
        (tree, cabin, speed, light)
    }

    #[test]
    fn test_parent_links_point_to_owner() {
        let (tree, cabin, speed, light) = sample_tree();
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.parent(cabin), Some(tree.root()));
        assert_eq!(tree.parent(speed), Some(tree.root()));
        assert_eq!(tree.parent(light), Some(cabin));
        assert_eq!(tree.child(tree.root(), 1), Some(speed));
    }

    #[test]
    fn test_paths_and_depth() {
        let (tree, _, speed, light) = sample_tree();
        assert_eq!(tree.path(light), "Vehicle.Cabin.Light");
        assert_eq!(tree.path(speed), "Vehicle.Speed");
        assert_eq!(tree.depth(light), 2);
        assert_eq!(tree.path_from(light, light).as_deref(), Some("Light"));
        assert_eq!(tree.path_from(speed, light), None);
    }

    #[test]
    fn test_preorder_order() {
        let (tree, cabin, speed, light) = sample_tree();
        let order: Vec<_> = tree.iter().collect();
        assert_eq!(order, vec![tree.root(), cabin, light, speed]);
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let (mut tree, ..) = sample_tree();
        let err = tree
            .add_child(tree.root(), NodeRecord::branch("Cabin"))
            .unwrap_err();
        assert!(matches!(err, VssTreeError::InvalidInput(_)));
    }

    #[test]
    fn test_child_limit() {
        let mut tree = VssTree::new(NodeRecord::branch("Wide"));
        for idx in 0..MAX_CHILDREN {
            tree.add_child(tree.root(), NodeRecord::branch(format!("C{idx}")))
                .unwrap();
        }
        assert!(
            tree.add_child(tree.root(), NodeRecord::branch("Overflow"))
                .is_err()
        );
    }

    #[test]
    fn test_branch_accessors_hide_signal_metadata() {
        let mut tree = VssTree::new(
            NodeRecord::branch("B")
                .with_unit("m")
                .with_allowed(["x"])
                .with_default("x"),
        );
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.unit(), None);
        assert_eq!(root.allowed_count(), 0);
        assert_eq!(root.allowed(0), None);
        assert_eq!(root.default_allowed(), None);
        let leaf = tree
            .add_child(
                tree.root(),
                NodeRecord::leaf("L", NodeKind::Sensor, Datatype::Uint8)
                    .with_unit("m")
                    .with_default("3"),
            )
            .unwrap();
        let leaf = tree.get(leaf).unwrap();
        assert_eq!(leaf.unit(), Some("m"));
        assert_eq!(leaf.default_allowed(), Some("3"));
        assert_eq!(leaf.datatype(), Some(Datatype::Uint8));
        assert_eq!(leaf.min(), None);
    }

    #[test]
    fn test_set_root_keeps_children() {
        let (mut tree, cabin, ..) = sample_tree();
        tree.set_root(NodeRecord::branch("Car").with_uuid("u-1"))
            .unwrap();
        assert_eq!(tree.path(cabin), "Car.Cabin");
        assert_eq!(tree.get(tree.root()).unwrap().uuid(), "u-1");
        assert!(tree.set_root(NodeRecord::branch("")).is_err());
    }

    #[test]
    fn test_allowed_by_index() {
        let (tree, _, _, light) = sample_tree();
        let node = tree.get(light).unwrap();
        assert_eq!(node.allowed_count(), 2);
        assert_eq!(node.allowed(1), Some("ON"));
        assert_eq!(node.allowed(2), None);
    }

    #[test]
    fn test_detach_child_returns_subtree() {
        let (mut tree, cabin, speed, light) = sample_tree();
        let detached = tree.detach_child(tree.root(), 0).unwrap();
        assert_eq!(detached.len(), 2);
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(cabin));
        assert!(!tree.contains(light));
        assert_eq!(tree.child(tree.root(), 0), Some(speed));
        assert!(matches!(tree.get(light), Err(VssTreeError::NotFound(_))));
        let detached_root = detached.get(detached.root()).unwrap();
        assert_eq!(detached_root.name(), "Cabin");
        assert_eq!(detached_root.parent(), None);
    }

    #[test]
    fn test_graft_and_structural_eq() {
        let (tree, cabin, ..) = sample_tree();
        let cabin_copy = tree.extract(cabin).unwrap();

        let mut rebuilt = VssTree::new(NodeRecord::branch("Vehicle"));
        rebuilt.graft(rebuilt.root(), &cabin_copy).unwrap();
        rebuilt
            .add_child(
                rebuilt.root(),
                NodeRecord::leaf("Speed", NodeKind::Sensor, Datatype::Float).with_unit("km/h"),
            )
            .unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn test_path_index_lookup() {
        let (tree, _, speed, light) = sample_tree();
        let index = tree.path_index();
        assert_eq!(index.len(), 4);
        assert_eq!(index.lookup("Vehicle.Cabin.Light"), Some(light));
        assert_eq!(index.lookup("Vehicle.Speed"), Some(speed));
        assert_eq!(index.lookup("Vehicle.Nope"), None);
    }
}
