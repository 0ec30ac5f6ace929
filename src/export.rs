//! Flat exports of a whole (sub)tree: leaf paths and UUIDs.
//!
//! Paths here are full dot paths that start with the walk root's own name,
//! unlike search results which are relative to the search root.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::errors::VssResult;
use crate::tree::{NodeId, VssTree};

/// Path and UUID of one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UuidEntry {
    pub path: String,
    pub uuid: String,
}

#[derive(Serialize)]
struct LeafPathDocument<'a> {
    leafpaths: &'a [String],
}

#[derive(Serialize)]
struct UuidDocument<'a> {
    leafuuids: &'a [UuidEntry],
}

/// What to export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    LeafPaths,
    Uuids,
}

/// How to write it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// One entry per line.
    #[default]
    Lines,
    /// `{"leafpaths":[...]}` or `{"leafuuids":[{"path":..,"uuid":..}]}`.
    Json,
}

/// Dot paths of every childless node under `root`, in pre-order.
pub fn leaf_paths(tree: &VssTree, root: NodeId) -> (usize, Vec<String>) {
    let paths: Vec<String> = walk(tree, root)
        .filter(|(id, _)| tree.child_count(*id) == 0)
        .map(|(_, path)| path)
        .collect();
    (paths.len(), paths)
}

/// UUID of every node under `root` (root included), in pre-order.
pub fn uuid_list(tree: &VssTree, root: NodeId) -> (usize, Vec<String>) {
    let uuids: Vec<String> = uuid_entries(tree, root)
        .into_iter()
        .map(|entry| entry.uuid)
        .collect();
    (uuids.len(), uuids)
}

/// Like [`uuid_list`] but keeps the path next to each UUID.
pub fn uuid_entries(tree: &VssTree, root: NodeId) -> Vec<UuidEntry> {
    walk(tree, root)
        .map(|(id, path)| UuidEntry {
            uuid: tree.node(id).map(|n| n.uuid().to_string()).unwrap_or_default(),
            path,
        })
        .collect()
}

/// Write `lines` one per line and return how many were written.
pub fn write_lines<W, I, S>(out: &mut W, lines: I) -> VssResult<usize>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut count = 0;
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
        count += 1;
    }
    Ok(count)
}

pub fn write_leaf_paths<W: Write>(tree: &VssTree, root: NodeId, out: &mut W) -> VssResult<usize> {
    let (_, paths) = leaf_paths(tree, root);
    write_lines(out, &paths)
}

pub fn write_uuid_list<W: Write>(tree: &VssTree, root: NodeId, out: &mut W) -> VssResult<usize> {
    let (_, uuids) = uuid_list(tree, root);
    write_lines(out, &uuids)
}

pub fn write_leaf_paths_json<W: Write>(
    tree: &VssTree,
    root: NodeId,
    out: &mut W,
) -> VssResult<usize> {
    let (count, paths) = leaf_paths(tree, root);
    write_json(out, &LeafPathDocument { leafpaths: &paths })?;
    Ok(count)
}

pub fn write_uuid_list_json<W: Write>(
    tree: &VssTree,
    root: NodeId,
    out: &mut W,
) -> VssResult<usize> {
    let entries = uuid_entries(tree, root);
    write_json(out, &UuidDocument { leafuuids: &entries })?;
    Ok(entries.len())
}

/// Export to a file at `path`, created or truncated. Returns the entry count.
pub fn export_to_path<P: AsRef<Path>>(
    tree: &VssTree,
    root: NodeId,
    kind: ExportKind,
    format: ExportFormat,
    path: P,
) -> VssResult<usize> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    let count = match (kind, format) {
        (ExportKind::LeafPaths, ExportFormat::Lines) => write_leaf_paths(tree, root, &mut out)?,
        (ExportKind::LeafPaths, ExportFormat::Json) => {
            write_leaf_paths_json(tree, root, &mut out)?
        }
        (ExportKind::Uuids, ExportFormat::Lines) => write_uuid_list(tree, root, &mut out)?,
        (ExportKind::Uuids, ExportFormat::Json) => write_uuid_list_json(tree, root, &mut out)?,
    };
    out.flush()?;
    info!("exported {count} {kind:?} entries to {}", path.display());
    Ok(count)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> VssResult<()> {
    serde_json::to_writer(&mut *out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Pre-order walk yielding each node with its full path.
fn walk(tree: &VssTree, root: NodeId) -> impl Iterator<Item = (NodeId, String)> + '_ {
    tree.preorder(root).filter_map(move |id| {
        tree.path_from(root, id).map(|path| (id, path))
    })
}
