//! Binary record codec.
//!
//! Encodes and decodes one node's fixed-field record. The tree builder in
//! [`crate::tree::builder`] drives these functions in pre-order.

pub mod allowed;
pub mod constants;
pub mod record;
pub mod types;

pub use allowed::{count_allowed, decode_allowed, encode_allowed};
pub use record::{DecodedRecord, NodeRecord, decode_record, encode_record, encode_record_into};
pub use types::{Datatype, NodeKind, Validate};
