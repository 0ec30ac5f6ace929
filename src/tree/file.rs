//! Reading and writing tree files.
//!
//! Every function opens its own handle and drops it before returning, so no
//! file stays open between calls.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::codec::{NodeRecord, encode_record_into};
use crate::config::{CodecConfig, RecordLayout};
use crate::errors::VssResult;
use crate::tree::builder::{DecodeReport, decode_tree, encode_tree};
use crate::tree::model::VssTree;

/// Load and decode the tree stored at `path`.
pub fn read_tree_from_path<P: AsRef<Path>>(
    path: P,
    config: &CodecConfig,
) -> VssResult<(VssTree, DecodeReport)> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let loaded = decode_tree(&bytes, config)?;
    info!("loaded {} nodes from {}", loaded.1.total_nodes, path.display());
    Ok(loaded)
}

/// Encode `tree` and write it to `path`, truncating any existing file.
///
/// The tree is fully encoded before the file is touched, but a failing disk
/// can still leave a partial file behind. Use [`write_tree_atomic`] when that
/// matters.
pub fn write_tree_to_path<P: AsRef<Path>>(
    tree: &VssTree,
    path: P,
    config: &CodecConfig,
) -> VssResult<usize> {
    let path = path.as_ref();
    let bytes = encode_tree(tree, config)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    info!("wrote {} nodes ({} bytes) to {}", tree.len(), bytes.len(), path.display());
    Ok(bytes.len())
}

/// Write `tree` to a temporary file next to `path`, then rename it into place.
pub fn write_tree_atomic<P: AsRef<Path>>(
    tree: &VssTree,
    path: P,
    config: &CodecConfig,
) -> VssResult<usize> {
    let path = path.as_ref();
    let bytes = encode_tree(tree, config)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    info!(
        "atomically wrote {} nodes ({} bytes) to {}",
        tree.len(),
        bytes.len(),
        path.display()
    );
    Ok(bytes.len())
}

/// Producer-side writer that appends one record at a time in pre-order.
///
/// Each call opens the file in append mode, writes one record and closes it,
/// so a producer can stream a tree without holding it in memory. The caller is
/// responsible for emitting records in pre-order with correct child counts.
#[derive(Debug)]
pub struct RecordAppender {
    path: PathBuf,
    layout: RecordLayout,
    records: usize,
}

impl RecordAppender {
    /// Start a new file at `path`, truncating anything already there.
    pub fn create<P: AsRef<Path>>(path: P, layout: RecordLayout) -> VssResult<Self> {
        let path = path.as_ref().to_path_buf();
        File::create(&path)?;
        Ok(Self {
            path,
            layout,
            records: 0,
        })
    }

    /// Continue appending to an existing file.
    pub fn open<P: AsRef<Path>>(path: P, layout: RecordLayout) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            layout,
            records: 0,
        }
    }

    pub fn append(&mut self, record: &NodeRecord, child_count: usize) -> VssResult<()> {
        let mut bytes = Vec::new();
        encode_record_into(&mut bytes, record, child_count, self.layout)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        self.records += 1;
        Ok(())
    }

    /// Records appended through this writer.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Datatype, NodeKind};
    use tempfile::tempdir;

    #[test]
    fn test_appender_produces_decodable_stream() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.binary");
        let mut appender = RecordAppender::create(&path, RecordLayout::Wide).unwrap();
        appender.append(&NodeRecord::branch("Vehicle"), 2).unwrap();
        appender
            .append(&NodeRecord::leaf("Speed", NodeKind::Sensor, Datatype::Float), 0)
            .unwrap();
        appender.append(&NodeRecord::branch("Cabin"), 0).unwrap();
        assert_eq!(appender.records(), 3);

        let (tree, report) = read_tree_from_path(&path, &CodecConfig::default()).unwrap();
        assert_eq!(report.total_nodes, 3);
        assert_eq!(tree.child_count(tree.root()), 2);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.binary");
        fs::write(&path, b"stale").unwrap();

        let tree = VssTree::new(NodeRecord::branch("Vehicle"));
        let written = write_tree_atomic(&tree, &path, &CodecConfig::default()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len() as usize, written);

        let (reloaded, _) = read_tree_from_path(&path, &CodecConfig::default()).unwrap();
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_tree_from_path(dir.path().join("absent"), &CodecConfig::default())
            .unwrap_err();
        assert!(matches!(err, crate::errors::VssTreeError::Io(_)));
    }
}
