//! Stateful up/down/left/right navigation over a [`VssTree`].

use crate::errors::{VssResult, VssTreeError};
use crate::tree::{NodeId, VssTree};

/// Cursor tracking a current node and which of its children is selected.
///
/// Moves that have nowhere to go leave the cursor unchanged.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    tree: &'a VssTree,
    current: NodeId,
    child_index: usize,
}

impl<'a> Cursor<'a> {
    /// Cursor at the tree root with the first child selected.
    pub fn new(tree: &'a VssTree) -> Self {
        Self {
            tree,
            current: tree.root(),
            child_index: 0,
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn child_index(&self) -> usize {
        self.child_index
    }

    pub fn selected_child(&self) -> Option<NodeId> {
        self.tree.child(self.current, self.child_index)
    }

    /// Move to the parent and select its first child.
    pub fn up(&mut self) {
        if let Some(parent) = self.tree.parent(self.current) {
            self.current = parent;
            self.child_index = 0;
        }
    }

    /// Descend into the selected child.
    pub fn down(&mut self) {
        if let Some(child) = self.selected_child() {
            self.current = child;
            self.child_index = 0;
        }
    }

    pub fn left(&mut self) {
        self.child_index = self.child_index.saturating_sub(1);
    }

    pub fn right(&mut self) {
        let count = self.tree.child_count(self.current);
        if self.child_index + 1 < count {
            self.child_index += 1;
        }
    }

    /// Place the cursor on `node` with its first child selected.
    pub fn jump_to(&mut self, node: NodeId) -> VssResult<()> {
        self.tree.get(node)?;
        self.current = node;
        self.child_index = 0;
        Ok(())
    }

    /// Run a step script made of `u`, `d`, `l` and `r`. Whitespace is ignored.
    ///
    /// The script is checked before any step runs, so a bad character leaves
    /// the cursor where it was.
    pub fn apply(&mut self, steps: &str) -> VssResult<()> {
        if let Some(bad) = steps
            .chars()
            .find(|c| !c.is_whitespace() && !matches!(c, 'u' | 'd' | 'l' | 'r'))
        {
            return Err(VssTreeError::invalid_input(format!(
                "unknown navigation step '{bad}' (expected u, d, l or r)"
            )));
        }
        for step in steps.chars() {
            match step {
                'u' => self.up(),
                'd' => self.down(),
                'l' => self.left(),
                'r' => self.right(),
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NodeRecord;

    fn tree() -> VssTree {
        let mut tree = VssTree::new(NodeRecord::branch("Vehicle"));
        let cabin = tree
            .add_child(tree.root(), NodeRecord::branch("Cabin"))
            .unwrap();
        tree.add_child(tree.root(), NodeRecord::branch("Body"))
            .unwrap();
        tree.add_child(cabin, NodeRecord::branch("Door")).unwrap();
        tree
    }

    #[test]
    fn test_up_at_root_is_noop() {
        let tree = tree();
        let mut cursor = Cursor::new(&tree);
        cursor.up();
        assert_eq!(cursor.current(), tree.root());
        assert_eq!(cursor.child_index(), 0);
    }

    #[test]
    fn test_left_right_clamp() {
        let tree = tree();
        let mut cursor = Cursor::new(&tree);
        cursor.left();
        assert_eq!(cursor.child_index(), 0);
        cursor.right();
        cursor.right();
        assert_eq!(cursor.child_index(), 1);
    }

    #[test]
    fn test_down_into_leaf_then_down_is_noop() {
        let tree = tree();
        let mut cursor = Cursor::new(&tree);
        cursor.apply("dd").unwrap();
        assert_eq!(tree.path(cursor.current()), "Vehicle.Cabin.Door");
        cursor.down();
        assert_eq!(tree.path(cursor.current()), "Vehicle.Cabin.Door");
    }

    #[test]
    fn test_up_resets_child_index() {
        let tree = tree();
        let mut cursor = Cursor::new(&tree);
        cursor.right();
        cursor.down();
        assert_eq!(tree.name(cursor.current()), Some("Body"));
        cursor.up();
        assert_eq!(cursor.current(), tree.root());
        assert_eq!(cursor.child_index(), 0);
        assert_eq!(tree.name(cursor.selected_child().unwrap()), Some("Cabin"));
    }

    #[test]
    fn test_down_resets_child_index() {
        let mut tree = tree();
        let cabin = tree.child(tree.root(), 0).unwrap();
        tree.add_child(cabin, NodeRecord::branch("Seat")).unwrap();
        let mut cursor = Cursor::new(&tree);
        cursor.apply("d r u d").unwrap();
        assert_eq!(cursor.current(), cabin);
        assert_eq!(cursor.child_index(), 0);
    }

    #[test]
    fn test_jump_to_resets_selection() {
        let mut tree = tree();
        let cabin = tree.child(tree.root(), 0).unwrap();
        let mut cursor = Cursor::new(&tree);
        cursor.right();
        cursor.jump_to(cabin).unwrap();
        assert_eq!(cursor.child_index(), 0);
        assert_eq!(tree.name(cursor.selected_child().unwrap()), Some("Door"));

        tree.detach_child(tree.root(), 0).unwrap();
        let mut cursor = Cursor::new(&tree);
        assert!(cursor.jump_to(cabin).is_err());
        assert_eq!(cursor.current(), tree.root());
    }

    #[test]
    fn test_bad_step_leaves_cursor() {
        let tree = tree();
        let mut cursor = Cursor::new(&tree);
        assert!(cursor.apply("dx").is_err());
        assert_eq!(cursor.current(), tree.root());
    }
}
