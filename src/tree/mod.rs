//! Tree model, whole-tree codec and file I/O.

pub mod builder;
pub mod file;
pub mod model;

pub use builder::{DecodeReport, decode_tree, encode_subtree, encode_tree};
pub use file::{RecordAppender, read_tree_from_path, write_tree_atomic, write_tree_to_path};
pub use model::{Node, NodeId, PathIndex, Preorder, VssTree};
