//! Whole-tree encode and decode.
//!
//! The byte stream is a pre-order sequence of records; each record's child
//! count says how many complete subtrees follow it. Decoding keeps an explicit
//! stack of open parents instead of recursing, so hostile input cannot blow the
//! native stack.

use log::{debug, info, warn};

use crate::codec::{decode_record, encode_record_into};
use crate::config::CodecConfig;
use crate::errors::{VssResult, VssTreeError};
use crate::tree::model::{NodeId, VssTree};

/// Summary of a successful decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub total_nodes: usize,
    /// Deepest level reached; the root is level 0.
    pub max_depth: usize,
    /// Bytes that made up the root subtree.
    pub bytes_consumed: usize,
    /// Bytes left over after the root subtree.
    pub trailing_bytes: usize,
}

struct OpenParent {
    id: NodeId,
    remaining: usize,
    depth: usize,
}

/// Decode a complete tree from `bytes`.
///
/// Fails with a format error on truncation, on a malformed record, or when
/// nesting exceeds `config.max_depth`. No partial tree is ever returned.
pub fn decode_tree(bytes: &[u8], config: &CodecConfig) -> VssResult<(VssTree, DecodeReport)> {
    if bytes.is_empty() {
        return Err(VssTreeError::format("empty input: no root record"));
    }
    let layout = config.layout;
    let first = decode_record(bytes, 0, layout)?;
    let mut tree = VssTree::with_capacity(first.record, bytes.len() / layout.min_record_size());
    let mut offset = first.next_offset;
    let mut report = DecodeReport::default();

    let mut stack = vec![OpenParent {
        id: tree.root(),
        remaining: first.child_count,
        depth: 0,
    }];

    while let Some(top) = stack.last_mut() {
        if top.remaining == 0 {
            stack.pop();
            continue;
        }
        top.remaining -= 1;
        let parent = top.id;
        let depth = top.depth + 1;
        if depth > config.max_depth {
            return Err(VssTreeError::format(format!(
                "nesting deeper than {} levels at offset {offset}",
                config.max_depth
            )));
        }

        let decoded = decode_record(bytes, offset, layout)?;
        offset = decoded.next_offset;
        let id = tree.push_child(parent, decoded.record);
        report.max_depth = report.max_depth.max(depth);
        stack.push(OpenParent {
            id,
            remaining: decoded.child_count,
            depth,
        });
    }

    report.total_nodes = tree.len();
    report.bytes_consumed = offset;
    report.trailing_bytes = bytes.len() - offset;

    if report.trailing_bytes > 0 {
        if config.strict_trailing {
            return Err(VssTreeError::format(format!(
                "{} trailing bytes after root subtree at offset {offset}",
                report.trailing_bytes
            )));
        }
        warn!(
            "ignoring {} trailing bytes after root subtree at offset {offset}",
            report.trailing_bytes
        );
    }

    info!(
        "decoded {} nodes (max depth {}) from {} bytes",
        report.total_nodes, report.max_depth, report.bytes_consumed
    );
    debug!("decode report: {report:?}");
    Ok((tree, report))
}

/// Encode the whole tree in pre-order.
pub fn encode_tree(tree: &VssTree, config: &CodecConfig) -> VssResult<Vec<u8>> {
    encode_subtree(tree, tree.root(), config)
}

/// Encode the subtree rooted at `start`; the result decodes with `start` as root.
pub fn encode_subtree(tree: &VssTree, start: NodeId, config: &CodecConfig) -> VssResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut written = 0usize;
    for id in tree.preorder(start) {
        let node = tree.get(id)?;
        encode_record_into(&mut buffer, node.record(), node.child_count(), config.layout)?;
        written += 1;
    }
    if written == 0 {
        return Err(VssTreeError::not_found(format!("node {start}")));
    }
    debug!("encoded {written} nodes into {} bytes", buffer.len());
    Ok(buffer)
}
