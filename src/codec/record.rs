//! Single-record serialization.
//!
//! A record is eleven length-prefixed string fields followed by a child count
//! byte. The codec never recurses; walking children is the builder's job.

use crate::codec::allowed::{decode_allowed, encode_allowed, encoded_len};
use crate::codec::constants::{CHILD_COUNT_SIZE, MAX_CHILDREN, SHORT_LEN_SIZE, field};
use crate::codec::types::{Datatype, NodeKind, Validate};
use crate::config::RecordLayout;
use crate::errors::{VssResult, VssTreeError};

/// Field values of one node, independent of tree structure.
///
/// Optional string fields use the empty string for "absent", exactly as the
/// on-disk format does, so records round-trip byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub name: String,
    pub kind: NodeKind,
    pub uuid: String,
    pub description: String,
    pub datatype: Option<Datatype>,
    pub min: String,
    pub max: String,
    pub unit: String,
    pub allowed: Vec<String>,
    pub default_allowed: String,
    pub validate: Validate,
}

impl NodeRecord {
    /// Create a record with just a name and kind; everything else empty.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Branch)
    }

    /// A leaf record of the given kind and datatype.
    pub fn leaf(name: impl Into<String>, kind: NodeKind, datatype: Datatype) -> Self {
        Self {
            datatype: Some(datatype),
            ..Self::new(name, kind)
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_bounds(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min = min.into();
        self.max = max.into();
        self
    }

    pub fn with_allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, default_allowed: impl Into<String>) -> Self {
        self.default_allowed = default_allowed.into();
        self
    }

    pub fn with_validate(mut self, validate: Validate) -> Self {
        self.validate = validate;
        self
    }

    /// Check the fields against the widths of `layout` without encoding.
    pub fn validate_fields(&self, layout: RecordLayout) -> VssResult<()> {
        if self.name.is_empty() {
            return Err(VssTreeError::format("node name must not be empty"));
        }
        if self.datatype == Some(Datatype::Unknown) {
            return Err(VssTreeError::format(format!(
                "node '{}' has an unknown datatype with no wire string",
                self.name
            )));
        }
        check_width(field::NAME, self.name.len(), SHORT_LEN_SIZE)?;
        check_width(field::UUID, self.uuid.len(), SHORT_LEN_SIZE)?;
        check_width(
            field::DESCRIPTION,
            self.description.len(),
            layout.description_len_size(),
        )?;
        check_width(field::MIN, self.min.len(), SHORT_LEN_SIZE)?;
        check_width(field::MAX, self.max.len(), SHORT_LEN_SIZE)?;
        check_width(field::UNIT, self.unit.len(), SHORT_LEN_SIZE)?;
        check_width(
            field::ALLOWED,
            encoded_len(&self.allowed),
            layout.allowed_len_size(),
        )?;
        check_width(field::DEFAULT, self.default_allowed.len(), SHORT_LEN_SIZE)?;
        Ok(())
    }
}

/// Output of [`decode_record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedRecord {
    pub record: NodeRecord,
    /// Number of child records that follow this one in pre-order.
    pub child_count: usize,
    /// Offset of the first byte after this record.
    pub next_offset: usize,
}

/// Encode one record followed by its child count byte.
pub fn encode_record(
    record: &NodeRecord,
    child_count: usize,
    layout: RecordLayout,
) -> VssResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(layout.min_record_size() + 64);
    encode_record_into(&mut buffer, record, child_count, layout)?;
    Ok(buffer)
}

/// Append one encoded record to `buffer`. On error `buffer` is left unchanged.
pub fn encode_record_into(
    buffer: &mut Vec<u8>,
    record: &NodeRecord,
    child_count: usize,
    layout: RecordLayout,
) -> VssResult<()> {
    record.validate_fields(layout)?;
    if child_count > MAX_CHILDREN {
        return Err(VssTreeError::format(format!(
            "node {} has {child_count} children, format allows {MAX_CHILDREN}",
            record.name
        )));
    }
    let allowed = encode_allowed(&record.allowed)?;
    let wide = layout.allowed_len_size();

    put_field(buffer, SHORT_LEN_SIZE, record.name.as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.kind.as_str().as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.uuid.as_bytes());
    put_field(
        buffer,
        layout.description_len_size(),
        record.description.as_bytes(),
    );
    let datatype = record.datatype.map(Datatype::as_str).unwrap_or("");
    put_field(buffer, SHORT_LEN_SIZE, datatype.as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.min.as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.max.as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.unit.as_bytes());
    put_field(buffer, wide, &allowed);
    put_field(buffer, SHORT_LEN_SIZE, record.default_allowed.as_bytes());
    put_field(buffer, SHORT_LEN_SIZE, record.validate.as_str().as_bytes());
    buffer.push(child_count as u8);
    Ok(())
}

/// Decode the record starting at `offset`.
pub fn decode_record(bytes: &[u8], offset: usize, layout: RecordLayout) -> VssResult<DecodedRecord> {
    let mut reader = FieldReader::new(bytes, offset);

    let name = reader.read_string(field::NAME, SHORT_LEN_SIZE)?;
    let kind = NodeKind::from_wire(&reader.read_string(field::NODE_TYPE, SHORT_LEN_SIZE)?);
    let uuid = reader.read_string(field::UUID, SHORT_LEN_SIZE)?;
    let description = reader.read_string(field::DESCRIPTION, layout.description_len_size())?;
    let datatype = Datatype::from_wire(&reader.read_string(field::DATATYPE, SHORT_LEN_SIZE)?);
    let min = reader.read_string(field::MIN, SHORT_LEN_SIZE)?;
    let max = reader.read_string(field::MAX, SHORT_LEN_SIZE)?;
    let unit = reader.read_string(field::UNIT, SHORT_LEN_SIZE)?;
    let allowed = decode_allowed(reader.read_field(field::ALLOWED, layout.allowed_len_size())?)?;
    let default_allowed = reader.read_string(field::DEFAULT, SHORT_LEN_SIZE)?;
    let validate = Validate::from_wire(&reader.read_string(field::VALIDATE, SHORT_LEN_SIZE)?);
    let child_count = reader.read_len(field::CHILDREN, CHILD_COUNT_SIZE)?;

    Ok(DecodedRecord {
        record: NodeRecord {
            name,
            kind,
            uuid,
            description,
            datatype,
            min,
            max,
            unit,
            allowed,
            default_allowed,
            validate,
        },
        child_count,
        next_offset: reader.offset,
    })
}

fn check_width(name: &str, len: usize, width: usize) -> VssResult<()> {
    let max = max_for_width(width);
    if len > max {
        return Err(VssTreeError::format(format!(
            "{name} is {len} bytes, length prefix of {width} byte(s) allows {max}"
        )));
    }
    Ok(())
}

fn max_for_width(width: usize) -> usize {
    match width {
        1 => u8::MAX as usize,
        _ => u16::MAX as usize,
    }
}

fn put_field(buffer: &mut Vec<u8>, width: usize, bytes: &[u8]) {
    match width {
        1 => buffer.push(bytes.len() as u8),
        _ => buffer.extend_from_slice(&(bytes.len() as u16).to_le_bytes()),
    }
    buffer.extend_from_slice(bytes);
}

/// Bounds-checked cursor over a record buffer.
struct FieldReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    fn take(&mut self, name: &str, len: usize) -> VssResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(VssTreeError::truncated(
                name,
                self.offset,
                len,
                self.remaining(),
            ));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_len(&mut self, name: &str, width: usize) -> VssResult<usize> {
        let raw = self.take(name, width)?;
        Ok(match raw {
            [single] => *single as usize,
            [lo, hi] => u16::from_le_bytes([*lo, *hi]) as usize,
            _ => unreachable!("length prefixes are one or two bytes"),
        })
    }

    fn read_field(&mut self, name: &str, width: usize) -> VssResult<&'a [u8]> {
        let len = self.read_len(name, width)?;
        self.take(name, len)
    }

    fn read_string(&mut self, name: &str, width: usize) -> VssResult<String> {
        let raw = self.read_field(name, width)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| VssTreeError::format(format!("{name} is not UTF-8: {e}")))
    }
}
