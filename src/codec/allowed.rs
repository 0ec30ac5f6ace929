//! Encoding of the allowed-values blob.
//!
//! The blob is a concatenation of values, each preceded by its length as two
//! uppercase hexadecimal characters: `["abc", "cd"]` becomes `03abc02cd`.

use crate::codec::constants::allowed::{HEX_LEN_SIZE, MAX_VALUE_LENGTH, MIN_VALUE_LENGTH};
use crate::errors::{VssResult, VssTreeError};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Number of bytes [`encode_allowed`] will produce for `values`.
pub fn encoded_len<S: AsRef<str>>(values: &[S]) -> usize {
    values
        .iter()
        .map(|value| value.as_ref().len() + HEX_LEN_SIZE)
        .sum()
}

/// Encode allowed values into a hex-length-prefixed blob.
pub fn encode_allowed<S: AsRef<str>>(values: &[S]) -> VssResult<Vec<u8>> {
    let mut blob = Vec::with_capacity(encoded_len(values));
    for value in values {
        let bytes = value.as_ref().as_bytes();
        if bytes.len() < MIN_VALUE_LENGTH || bytes.len() > MAX_VALUE_LENGTH {
            return Err(VssTreeError::format(format!(
                "allowed value {:?} has length {}, must be {MIN_VALUE_LENGTH}-{MAX_VALUE_LENGTH}",
                value.as_ref(),
                bytes.len()
            )));
        }
        blob.push(HEX_DIGITS[bytes.len() >> 4]);
        blob.push(HEX_DIGITS[bytes.len() & 0x0F]);
        blob.extend_from_slice(bytes);
    }
    Ok(blob)
}

/// Decode a blob back into its values.
///
/// Fails when a length prefix is not hex, is zero, or claims more bytes than
/// the blob holds, i.e. when the sub-lengths do not sum to the blob length.
pub fn decode_allowed(blob: &[u8]) -> VssResult<Vec<String>> {
    let mut values = Vec::new();
    let mut offset = 0;
    while offset < blob.len() {
        if offset + HEX_LEN_SIZE > blob.len() {
            return Err(VssTreeError::format(format!(
                "allowed blob ends inside a length prefix at offset {offset}"
            )));
        }
        let len = hex_value(blob[offset], offset)? << 4 | hex_value(blob[offset + 1], offset + 1)?;
        if len < MIN_VALUE_LENGTH {
            return Err(VssTreeError::format(format!(
                "zero-length allowed value at offset {offset}"
            )));
        }
        let start = offset + HEX_LEN_SIZE;
        let end = start + len;
        if end > blob.len() {
            return Err(VssTreeError::format(format!(
                "allowed value at offset {offset} declares {len} bytes, blob has {} left",
                blob.len() - start
            )));
        }
        let value = std::str::from_utf8(&blob[start..end])
            .map_err(|e| VssTreeError::format(format!("allowed value is not UTF-8: {e}")))?;
        values.push(value.to_string());
        offset = end;
    }
    Ok(values)
}

/// Count the values in a blob without materialising them.
pub fn count_allowed(blob: &[u8]) -> VssResult<usize> {
    decode_allowed(blob).map(|values| values.len())
}

fn hex_value(digit: u8, offset: usize) -> VssResult<usize> {
    match digit {
        b'0'..=b'9' => Ok((digit - b'0') as usize),
        b'A'..=b'F' => Ok((digit - b'A' + 10) as usize),
        b'a'..=b'f' => Ok((digit - b'a' + 10) as usize),
        other => Err(VssTreeError::format(format!(
            "invalid hex digit {:?} in allowed blob at offset {offset}",
            other as char
        ))),
    }
}
