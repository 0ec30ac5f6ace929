//! Configuration for the binary codec and the search engine.
//!
//! The record layout is a versioned format choice: producers in the wild
//! disagree on the width of the description and allowed length prefixes, so
//! callers pick one explicitly instead of the decoder guessing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_RESULTS, MIN_RECORD_SIZE_NARROW, MIN_RECORD_SIZE_WIDE,
    SHORT_LEN_SIZE, WIDE_LEN_SIZE,
};
use crate::errors::{VssResult, VssTreeError};

/// Width of the `DescrLen` and `AllowedLen` prefixes.
///
/// # Default Behavior
///
/// The default is [`RecordLayout::Wide`], which is what the C binary tool, the
/// Go parser and the Python exporter all write.
///
/// ```rust
/// use vsstree::{CodecConfig, RecordLayout};
///
/// let cfg = CodecConfig::default();
/// assert_eq!(cfg.layout, RecordLayout::Wide);
/// assert_eq!(CodecConfig::narrow().layout, RecordLayout::Narrow);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// Format version 2: description and allowed lengths are 2-byte little-endian.
    #[default]
    Wide,
    /// Format version 1: every length prefix is a single byte.
    Narrow,
}

impl RecordLayout {
    pub fn version(self) -> u8 {
        match self {
            RecordLayout::Narrow => 1,
            RecordLayout::Wide => 2,
        }
    }

    pub fn from_version(version: u8) -> VssResult<Self> {
        match version {
            1 => Ok(RecordLayout::Narrow),
            2 => Ok(RecordLayout::Wide),
            other => Err(VssTreeError::invalid_input(format!(
                "unsupported record layout version {other} (supported: 1, 2)"
            ))),
        }
    }

    pub fn description_len_size(self) -> usize {
        match self {
            RecordLayout::Narrow => SHORT_LEN_SIZE,
            RecordLayout::Wide => WIDE_LEN_SIZE,
        }
    }

    pub fn allowed_len_size(self) -> usize {
        self.description_len_size()
    }

    /// Size of a record whose fields are all empty.
    pub fn min_record_size(self) -> usize {
        match self {
            RecordLayout::Narrow => MIN_RECORD_SIZE_NARROW,
            RecordLayout::Wide => MIN_RECORD_SIZE_WIDE,
        }
    }
}

/// Options for encoding and decoding whole trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Length-prefix layout of every record.
    ///
    /// **Default:** [`RecordLayout::Wide`]
    pub layout: RecordLayout,

    /// Deepest nesting the decoder accepts before failing.
    ///
    /// **Default:** 64
    ///
    /// Corrupt input can claim children at every level; this bounds the work
    /// and memory spent before the stream runs out.
    pub max_depth: usize,

    /// Treat bytes after the root subtree as a format error.
    ///
    /// **Default:** `false` (trailing bytes are logged and reported)
    pub strict_trailing: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            layout: RecordLayout::Wide,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_trailing: false,
        }
    }
}

impl CodecConfig {
    pub fn wide() -> Self {
        Self::default()
    }

    pub fn narrow() -> Self {
        Self {
            layout: RecordLayout::Narrow,
            ..Self::default()
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict_trailing = true;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Default options for path searches.
///
/// ```rust
/// use vsstree::SearchConfig;
///
/// let cfg = SearchConfig::default();
/// assert_eq!(cfg.max_results, 1500);
/// assert!(cfg.leaf_nodes_only);
/// assert!(!cfg.any_depth);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hard cap on returned matches.
    ///
    /// **Default:** 1500
    pub max_results: usize,

    /// Only nodes that are not branches count as matches.
    ///
    /// **Default:** `true`
    pub leaf_nodes_only: bool,

    /// A trailing `*` also matches every deeper level.
    ///
    /// **Default:** `false` (wildcards are single-level)
    pub any_depth: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            leaf_nodes_only: true,
            any_depth: false,
        }
    }
}

/// Combined configuration, loadable from a JSON file.
///
/// ```rust
/// use vsstree::{TreeConfig, RecordLayout};
///
/// let cfg = TreeConfig::from_json(r#"{"codec": {"layout": "narrow"}}"#).unwrap();
/// assert_eq!(cfg.codec.layout, RecordLayout::Narrow);
/// assert_eq!(cfg.search.max_results, 1500);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub codec: CodecConfig,
    pub search: SearchConfig,
}

impl TreeConfig {
    pub fn from_json(text: &str) -> VssResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| VssTreeError::invalid_input(format!("invalid config: {e}")))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> VssResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_versions() {
        assert_eq!(RecordLayout::Narrow.version(), 1);
        assert_eq!(RecordLayout::Wide.version(), 2);
        assert_eq!(RecordLayout::from_version(2).unwrap(), RecordLayout::Wide);
        assert!(RecordLayout::from_version(3).is_err());
    }

    #[test]
    fn test_layout_widths() {
        assert_eq!(RecordLayout::Wide.description_len_size(), 2);
        assert_eq!(RecordLayout::Narrow.allowed_len_size(), 1);
        assert_eq!(RecordLayout::Narrow.min_record_size(), 12);
        assert_eq!(RecordLayout::Wide.min_record_size(), 14);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = TreeConfig::from_json(r#"{"search": {"max_results": 10}}"#).unwrap();
        assert_eq!(cfg.search.max_results, 10);
        assert!(cfg.search.leaf_nodes_only);
        assert_eq!(cfg.codec, CodecConfig::default());
    }

    #[test]
    fn test_bad_json_is_invalid_input() {
        let err = TreeConfig::from_json("{").unwrap_err();
        assert!(matches!(err, VssTreeError::InvalidInput(_)));
    }
}
