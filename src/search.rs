//! Wildcard path search.
//!
//! An expression is a dot-separated list of segments. Segment `k` is matched
//! against nodes `k + 1` levels below the search root, so the root's own name
//! never appears in the expression and resolved paths are relative to it. A
//! segment of exactly `*` matches any single node at that level; every other
//! segment compares by exact, case-sensitive equality.
//!
//! # Example
//!
//! ```rust
//! use vsstree::codec::{Datatype, NodeKind, NodeRecord};
//! use vsstree::search::{SearchQuery, search};
//! use vsstree::VssTree;
//!
//! let mut tree = VssTree::new(NodeRecord::branch("Vehicle"));
//! let seat = tree.add_child(tree.root(), NodeRecord::branch("Seat")).unwrap();
//! for name in ["Pos1", "Pos2"] {
//!     tree.add_child(seat, NodeRecord::leaf(name, NodeKind::Sensor, Datatype::Uint8))
//!         .unwrap();
//! }
//!
//! let result = search(&tree, tree.root(), &SearchQuery::new("Seat.*")).unwrap();
//! assert_eq!(result.count(), 2);
//! assert_eq!(result.matches[1].path, "Seat.Pos2");
//! ```

use log::debug;

use crate::codec::Validate;
use crate::codec::constants::ANY_DEPTH_LIMIT;
use crate::config::SearchConfig;
use crate::errors::{VssResult, VssTreeError};
use crate::tree::{NodeId, VssTree};

const WILDCARD: &str = "*";

/// Parameters of one search call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub expression: String,
    pub max_results: usize,
    pub leaf_nodes_only: bool,
    /// A trailing `*` also matches every level below it.
    pub any_depth: bool,
    /// Matches to pass over before collecting; used for paging.
    pub skip: usize,
    /// Resolved paths below which the search does not descend.
    pub no_scope: Vec<String>,
}

impl SearchQuery {
    pub fn new(expression: impl Into<String>) -> Self {
        Self::from_config(expression, &SearchConfig::default())
    }

    pub fn from_config(expression: impl Into<String>, config: &SearchConfig) -> Self {
        Self {
            expression: expression.into(),
            max_results: config.max_results,
            leaf_nodes_only: config.leaf_nodes_only,
            any_depth: config.any_depth,
            skip: 0,
            no_scope: Vec::new(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Count branches as matches too.
    pub fn all_kinds(mut self) -> Self {
        self.leaf_nodes_only = false;
        self
    }

    pub fn with_any_depth(mut self, any_depth: bool) -> Self {
        self.any_depth = any_depth;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_no_scope<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_scope = paths.into_iter().map(Into::into).collect();
        self
    }

    fn segments(&self) -> VssResult<Vec<&str>> {
        if self.expression.is_empty() {
            return Err(VssTreeError::invalid_input("empty search expression"));
        }
        let segments: Vec<&str> = self.expression.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(VssTreeError::invalid_input(format!(
                "empty segment in search expression '{}'",
                self.expression
            )));
        }
        Ok(segments)
    }
}

/// One resolved node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub node: NodeId,
    /// Dot path relative to the search root.
    pub path: String,
}

/// Matches of one page, in pre-order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    /// More matches exist after this page.
    pub truncated: bool,
    /// Strongest `validate` seen on the way from the search root to any match
    /// in this page.
    pub validation: Validate,
}

impl SearchResult {
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.matches.iter().map(|m| m.node)
    }

    /// Query for the page after this one, or `None` when this was the last.
    ///
    /// An empty page never advances, so it has no successor either.
    pub fn next_page(&self, query: &SearchQuery) -> Option<SearchQuery> {
        if !self.truncated || self.matches.is_empty() {
            return None;
        }
        Some(query.clone().with_skip(query.skip + self.matches.len()))
    }
}

struct Frame {
    node: NodeId,
    /// Segments consumed when this node was reached.
    depth: usize,
    path: String,
    validation: Validate,
}

/// Resolve `query` below `search_root`.
///
/// Traversal is depth-first, left to right, and stops as soon as one match
/// beyond the page is seen. An empty result is not an error.
pub fn search(tree: &VssTree, search_root: NodeId, query: &SearchQuery) -> VssResult<SearchResult> {
    let segments = query.segments()?;
    if query.max_results == 0 {
        return Err(VssTreeError::invalid_input("max_results must be at least 1"));
    }
    let root = tree.get(search_root)?;
    let open_ended = query.any_depth && segments.last() == Some(&WILDCARD);

    let mut result = SearchResult::default();
    let mut skipped = 0usize;
    let mut visited = 0usize;
    let mut stack: Vec<Frame> = Vec::new();
    push_children(
        tree,
        &mut stack,
        search_root,
        "",
        0,
        root.validate(),
        segments[0],
    );

    while let Some(frame) = stack.pop() {
        visited += 1;
        let Some(node) = tree.node(frame.node) else {
            continue;
        };
        let consumed = frame.depth >= segments.len();

        if consumed && (!query.leaf_nodes_only || !node.is_branch()) {
            if skipped < query.skip {
                skipped += 1;
            } else if result.matches.len() == query.max_results {
                result.truncated = true;
                break;
            } else {
                result.validation = result.validation.strongest(frame.validation);
                result.matches.push(SearchMatch {
                    node: frame.node,
                    path: frame.path.clone(),
                });
            }
        }

        if query.no_scope.iter().any(|scope| *scope == frame.path) {
            continue;
        }
        let next_segment = if !consumed {
            segments[frame.depth]
        } else if open_ended && frame.depth < ANY_DEPTH_LIMIT {
            WILDCARD
        } else {
            continue;
        };
        push_children(
            tree,
            &mut stack,
            frame.node,
            &frame.path,
            frame.depth,
            frame.validation,
            next_segment,
        );
    }

    debug!(
        "search '{}' visited {visited} nodes, {} matches (skip {}, truncated {})",
        query.expression,
        result.matches.len(),
        query.skip,
        result.truncated
    );
    Ok(result)
}

/// Push the children of `parent` matching `segment`, last first, so they pop
/// in left-to-right order.
fn push_children(
    tree: &VssTree,
    stack: &mut Vec<Frame>,
    parent: NodeId,
    parent_path: &str,
    parent_depth: usize,
    parent_validation: Validate,
    segment: &str,
) {
    let Some(node) = tree.node(parent) else {
        return;
    };
    for &child in node.children().iter().rev() {
        let Some(child_node) = tree.node(child) else {
            continue;
        };
        if segment != WILDCARD && child_node.name() != segment {
            continue;
        }
        let path = if parent_path.is_empty() {
            child_node.name().to_string()
        } else {
            format!("{parent_path}.{}", child_node.name())
        };
        stack.push(Frame {
            node: child,
            depth: parent_depth + 1,
            path,
            validation: parent_validation.strongest(child_node.validate()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Datatype, NodeKind, NodeRecord};

    fn sensor(name: &str) -> NodeRecord {
        NodeRecord::leaf(name, NodeKind::Sensor, Datatype::Boolean)
    }

    #[test]
    fn test_rejects_empty_segments() {
        let tree = VssTree::new(NodeRecord::branch("Root"));
        for expr in ["", "A..B", ".A", "A."] {
            let err = search(&tree, tree.root(), &SearchQuery::new(expr)).unwrap_err();
            assert!(matches!(err, VssTreeError::InvalidInput(_)), "{expr}");
        }
    }

    #[test]
    fn test_empty_truncated_page_has_no_successor() {
        let page = SearchResult {
            truncated: true,
            ..SearchResult::default()
        };
        assert!(page.next_page(&SearchQuery::new("*")).is_none());
    }

    #[test]
    fn test_case_sensitive() {
        let mut tree = VssTree::new(NodeRecord::branch("Root"));
        tree.add_child(tree.root(), sensor("Speed")).unwrap();
        let result = search(&tree, tree.root(), &SearchQuery::new("speed")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_branch_end_needs_all_kinds() {
        let mut tree = VssTree::new(NodeRecord::branch("Root"));
        tree.add_child(tree.root(), NodeRecord::branch("Cabin"))
            .unwrap();
        let query = SearchQuery::new("Cabin");
        assert!(search(&tree, tree.root(), &query).unwrap().is_empty());
        assert_eq!(
            search(&tree, tree.root(), &query.all_kinds())
                .unwrap()
                .count(),
            1
        );
    }

    #[test]
    fn test_validation_is_strongest_on_path() {
        let mut tree = VssTree::new(NodeRecord::branch("Root"));
        let body = tree
            .add_child(
                tree.root(),
                NodeRecord::branch("Body").with_validate(Validate::WriteOnly),
            )
            .unwrap();
        tree.add_child(body, sensor("Lock").with_validate(Validate::ReadWriteConsent))
            .unwrap();
        tree.add_child(body, sensor("Horn")).unwrap();

        let horn = search(&tree, tree.root(), &SearchQuery::new("Body.Horn")).unwrap();
        assert_eq!(horn.validation, Validate::WriteOnly);
        let all = search(&tree, tree.root(), &SearchQuery::new("Body.*")).unwrap();
        assert_eq!(all.validation, Validate::ReadWriteConsent);
    }
}
