//! Binary codec, in-memory model and path search for VSS signal trees.
//!
//! A tree file is a pre-order stream of length-prefixed records. Decode it
//! with [`decode_tree`] or [`read_tree_from_path`], walk it with a
//! [`cursor::Cursor`], resolve wildcard paths with [`search::search`] and
//! flatten it with the [`export`] helpers.
//!
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod bench_utils;
pub mod client;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod export;
pub mod search;
pub mod shared;
pub mod tree;

pub use crate::codec::{Datatype, NodeKind, NodeRecord, Validate};
pub use crate::config::{CodecConfig, RecordLayout, SearchConfig, TreeConfig};
pub use crate::cursor::Cursor;
pub use crate::errors::{VssResult, VssTreeError};
pub use crate::search::{SearchMatch, SearchQuery, SearchResult, search};
pub use crate::shared::SharedTree;
pub use crate::tree::{
    DecodeReport, Node, NodeId, RecordAppender, VssTree, decode_tree, encode_subtree, encode_tree,
    read_tree_from_path, write_tree_atomic, write_tree_to_path,
};
