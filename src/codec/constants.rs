//! Constants for the binary VSS record format.
//!
//! Field order, length-prefix widths and hard limits for a single node record.
//! Widths that differ between layout versions live in [`crate::config::RecordLayout`].

/// Width in bytes of every length prefix that is not layout dependent.
pub const SHORT_LEN_SIZE: usize = 1;

/// Width in bytes of the description and allowed prefixes in the wide layout.
pub const WIDE_LEN_SIZE: usize = 2;

/// Width in bytes of the trailing child count.
pub const CHILD_COUNT_SIZE: usize = 1;

/// Number of length-prefixed string fields in one record.
pub const STRING_FIELD_COUNT: usize = 11;

/// Smallest possible record: every field empty, zero children.
pub const MIN_RECORD_SIZE_NARROW: usize = STRING_FIELD_COUNT * SHORT_LEN_SIZE + CHILD_COUNT_SIZE;

/// Smallest possible wide record.
pub const MIN_RECORD_SIZE_WIDE: usize =
    (STRING_FIELD_COUNT - 2) * SHORT_LEN_SIZE + 2 * WIDE_LEN_SIZE + CHILD_COUNT_SIZE;

/// Maximum number of children a record can declare.
pub const MAX_CHILDREN: usize = u8::MAX as usize;

/// Allowed-value sub-string limits
pub mod allowed {
    /// Number of hex characters in front of every allowed value.
    pub const HEX_LEN_SIZE: usize = 2;
    /// Longest single allowed value.
    pub const MAX_VALUE_LENGTH: usize = 0xFF;
    /// Shortest single allowed value.
    pub const MIN_VALUE_LENGTH: usize = 1;
}

/// Field names in on-disk order, used in error messages.
pub mod field {
    pub const NAME: &str = "name";
    pub const NODE_TYPE: &str = "node type";
    pub const UUID: &str = "uuid";
    pub const DESCRIPTION: &str = "description";
    pub const DATATYPE: &str = "datatype";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const UNIT: &str = "unit";
    pub const ALLOWED: &str = "allowed";
    pub const DEFAULT: &str = "default";
    pub const VALIDATE: &str = "validate";
    pub const CHILDREN: &str = "children";
}

/// Default bound on tree depth accepted by the decoder
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Depth used by any-depth searches; VSS trees are far shallower.
pub const ANY_DEPTH_LIMIT: usize = 100;

/// Default result bound for searches.
pub const DEFAULT_MAX_RESULTS: usize = 1500;
