//! EBML (Extensible Binary Meta Language) primitives.
//!
//! EBML is the binary format underlying Matroska/WebM. It uses variable-length
//! integers (VINTs) for both element IDs and sizes.
//!
//! Decoding works on byte slices rather than readers so that the same code
//! serves complete files and partially received streams. Running out of input
//! is reported as [`EbmlError::TruncatedElement`] and can be retried once more
//! bytes arrive; corrupt encodings are [`EbmlError::MalformedHeader`].
//! Every decoder takes the absolute offset of `data[0]` for error reporting.

use crate::error::{EbmlError, Result};
use chrono::{DateTime, Utc};
use std::io::Write;

/// Maximum VINT length in bytes.
pub const MAX_VINT_LENGTH: usize = 8;

/// Maximum element ID length in bytes.
pub const MAX_ID_LENGTH: usize = 4;

/// Default limit on master element nesting.
pub const MAX_RECURSION_DEPTH: usize = 64;

/// Seconds between the Unix epoch and the EBML date epoch (2001-01-01T00:00:00Z).
pub const EBML_EPOCH_UNIX_SECS: i64 = 978_307_200;

const EBML_EPOCH_UNIX_NANOS: i64 = EBML_EPOCH_UNIX_SECS * 1_000_000_000;

/// Width of a VINT given its first byte, or `None` for a `0x00` lead byte.
pub fn vint_width(first: u8) -> Option<usize> {
    if first == 0 {
        None
    } else {
        Some(first.leading_zeros() as usize + 1)
    }
}

/// Read a variable-length integer (VINT) from the start of `data`.
///
/// EBML VINTs use a leading bit pattern to indicate the length:
/// - 1xxxxxxx: 1 byte (7 bits of data)
/// - 01xxxxxx xxxxxxxx: 2 bytes (14 bits)
/// - 001xxxxx xxxxxxxx xxxxxxxx: 3 bytes (21 bits)
/// - etc.
///
/// Returns the decoded value and the number of bytes read.
pub fn read_vint(data: &[u8], offset: u64) -> Result<(u64, usize)> {
    let first = *data
        .first()
        .ok_or_else(|| EbmlError::truncated(offset, 1, 0))?;
    let length = vint_width(first)
        .ok_or_else(|| EbmlError::malformed(offset, "VINT lead byte is 0x00"))?;

    if data.len() < length {
        return Err(EbmlError::truncated(
            offset,
            length as u64,
            data.len() as u64,
        ));
    }

    // Mask out the length marker; for 8-byte VINTs the first byte carries no data
    let mask = (0xFFu16 >> length) as u8;
    let value = data[1..length]
        .iter()
        .fold((first & mask) as u64, |acc, &b| (acc << 8) | b as u64);

    Ok((value, length))
}

/// Read a VINT as an element ID.
///
/// Element IDs keep the VINT marker bits as part of the ID.
pub fn read_element_id(data: &[u8], offset: u64) -> Result<(u32, usize)> {
    let first = *data
        .first()
        .ok_or_else(|| EbmlError::truncated(offset, 1, 0))?;
    let length = vint_width(first)
        .ok_or_else(|| EbmlError::malformed(offset, "element ID lead byte is 0x00"))?;

    if length > MAX_ID_LENGTH {
        return Err(EbmlError::malformed(
            offset,
            format!("element ID width {} exceeds {} bytes", length, MAX_ID_LENGTH),
        ));
    }
    if data.len() < length {
        return Err(EbmlError::truncated(
            offset,
            length as u64,
            data.len() as u64,
        ));
    }

    let id = data[..length]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);
    Ok((id, length))
}

/// The all-ones payload that marks an unknown size at the given width.
pub fn unknown_size_marker(length: usize) -> u64 {
    (1u64 << (7 * length as u32)) - 1
}

/// Read an element size (VINT with possible unknown size).
///
/// Returns `None` if the size is unknown (live streaming mode).
pub fn read_element_size(data: &[u8], offset: u64) -> Result<(Option<u64>, usize)> {
    let (value, length) = read_vint(data, offset)?;

    if value == unknown_size_marker(length) {
        Ok((None, length))
    } else {
        Ok((Some(value), length))
    }
}

/// Write a variable-length integer.
pub fn write_vint<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let (bytes, length) = encode_vint(value)?;
    writer.write_all(&bytes[..length])?;
    Ok(length)
}

/// Encode a value as a VINT of minimal width.
///
/// Returns the encoded bytes and the length.
pub fn encode_vint(value: u64) -> Result<([u8; 8], usize)> {
    encode_vint_with_length(value, vint_length(value))
}

/// Encode a value as a VINT of exactly `length` bytes.
///
/// Fails if the value does not fit, or would collide with the unknown-size
/// marker of that width.
pub fn encode_vint_with_length(value: u64, length: usize) -> Result<([u8; 8], usize)> {
    if !(1..=MAX_VINT_LENGTH).contains(&length) || value >= unknown_size_marker(length) {
        return Err(EbmlError::malformed(
            0,
            format!("value {} does not fit a {}-byte VINT", value, length),
        ));
    }

    let mut bytes = [0u8; 8];
    let mut v = value;
    for i in (0..length).rev() {
        bytes[i] = (v & 0xFF) as u8;
        v >>= 8;
    }

    // Set the length marker bit
    bytes[0] |= 0x80 >> (length - 1);

    Ok((bytes, length))
}

/// Calculate the minimum number of bytes needed to encode a value as a VINT.
pub fn vint_length(value: u64) -> usize {
    (1..=MAX_VINT_LENGTH)
        .find(|&len| value < unknown_size_marker(len))
        .unwrap_or(MAX_VINT_LENGTH)
}

/// Number of bytes an element ID occupies.
pub fn element_id_length(id: u32) -> usize {
    match id {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Write an element ID.
pub fn write_element_id<W: Write>(writer: &mut W, id: u32) -> Result<usize> {
    let length = element_id_length(id);
    writer.write_all(&id.to_be_bytes()[4 - length..])?;
    Ok(length)
}

/// Write an element size of unknown length (live streaming mode).
pub fn write_unknown_size<W: Write>(writer: &mut W, length: usize) -> Result<usize> {
    if !(1..=MAX_VINT_LENGTH).contains(&length) {
        return Err(EbmlError::malformed(
            0,
            format!("unknown size width {} out of range", length),
        ));
    }

    let marker = unknown_size_marker(length) | (1u64 << (7 * length as u32));
    writer.write_all(&marker.to_be_bytes()[8 - length..])?;
    Ok(length)
}

/// An EBML element header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// The element ID.
    pub id: u32,
    /// The element size (None for unknown size).
    pub size: Option<u64>,
    /// Total header size in bytes.
    pub header_size: usize,
}

impl ElementHeader {
    /// Decode an element header from the start of `data`.
    pub fn read(data: &[u8], offset: u64) -> Result<Self> {
        let (id, id_len) = read_element_id(data, offset)?;
        let (size, size_len) = read_element_size(&data[id_len..], offset + id_len as u64)
            .map_err(|e| match e {
                // Report truncation relative to the header start
                EbmlError::TruncatedElement {
                    needed, available, ..
                } => EbmlError::truncated(offset, needed + id_len as u64, available + id_len as u64),
                other => other,
            })?;

        Ok(Self {
            id,
            size,
            header_size: id_len + size_len,
        })
    }

    /// Write an element header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let id_len = write_element_id(writer, self.id)?;
        let size_len = match self.size {
            Some(size) => write_vint(writer, size)?,
            None => write_unknown_size(writer, 8)?,
        };
        Ok(id_len + size_len)
    }

    /// Get the total size of this element (header + content).
    pub fn total_size(&self) -> Option<u64> {
        self.size.map(|s| s + self.header_size as u64)
    }
}

/// Read a signed integer from EBML data (0-8 bytes, two's complement).
pub fn read_signed_int(data: &[u8]) -> i64 {
    let Some(&first) = data.first() else {
        return 0;
    };

    // Sign-extend from the first byte
    let seed = if first & 0x80 != 0 { -1i64 } else { 0i64 };
    data.iter().fold(seed, |acc, &b| (acc << 8) | b as i64)
}

/// Read an unsigned integer from EBML data (0-8 bytes).
pub fn read_unsigned_int(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Read a float from EBML data.
///
/// Returns `None` unless the payload is 0, 4 or 8 bytes long.
pub fn read_float(data: &[u8]) -> Option<f64> {
    match data.len() {
        0 => Some(0.0),
        4 => {
            let bits = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
            Some(f32::from_bits(bits) as f64)
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(data);
            Some(f64::from_bits(u64::from_be_bytes(raw)))
        }
        _ => None,
    }
}

/// Read a string from EBML data, stopping at the first NUL byte.
pub fn read_string(data: &[u8]) -> std::result::Result<&str, std::str::Utf8Error> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    std::str::from_utf8(&data[..end])
}

/// Read a date from EBML data (nanoseconds since 2001-01-01).
pub fn read_date(data: &[u8]) -> i64 {
    read_signed_int(data)
}

/// Convert an EBML date to UTC. Returns `None` when out of range.
pub fn date_to_utc(nanos: i64) -> Option<DateTime<Utc>> {
    EBML_EPOCH_UNIX_NANOS
        .checked_add(nanos)
        .map(DateTime::from_timestamp_nanos)
}

/// Convert a UTC timestamp to an EBML date.
pub fn utc_to_date(time: DateTime<Utc>) -> Option<i64> {
    time.timestamp_nanos_opt()?.checked_sub(EBML_EPOCH_UNIX_NANOS)
}

/// Minimal big-endian bytes of an unsigned integer (empty for zero).
pub fn encode_unsigned_int(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(8);
    bytes[start..].to_vec()
}

/// Minimal two's complement bytes of a signed integer (empty for zero).
pub fn encode_signed_int(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Write an unsigned integer in minimal bytes.
pub fn write_unsigned_int<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
    let bytes = encode_unsigned_int(value);
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Write a signed integer in minimal bytes.
pub fn write_signed_int<W: Write>(writer: &mut W, value: i64) -> Result<usize> {
    let bytes = encode_signed_int(value);
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Write a float (always 8 bytes for precision).
pub fn write_float<W: Write>(writer: &mut W, value: f64) -> Result<usize> {
    writer.write_all(&value.to_bits().to_be_bytes())?;
    Ok(8)
}

/// Write a complete element with a known size.
pub fn write_element<W: Write>(writer: &mut W, id: u32, payload: &[u8]) -> Result<usize> {
    let header = ElementHeader {
        id,
        size: Some(payload.len() as u64),
        header_size: 0,
    };
    let header_len = header.write(writer)?;
    writer.write_all(payload)?;
    Ok(header_len + payload.len())
}

/// Encode a complete element with a known size into a new buffer.
pub fn encode_element(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 12);
    out.extend_from_slice(&id.to_be_bytes()[4 - element_id_length(id)..]);
    let (size, size_len) = encode_vint(payload.len() as u64)
        .unwrap_or(([0x01, 0, 0, 0, 0, 0, 0, 0], 8));
    out.extend_from_slice(&size[..size_len]);
    out.extend_from_slice(payload);
    out
}

/// Encode a master element header with unknown size followed by `children`.
pub fn encode_unknown_size_element(id: u32, children: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(children.len() + 12);
    out.extend_from_slice(&id.to_be_bytes()[4 - element_id_length(id)..]);
    out.push(0x01);
    out.extend_from_slice(&[0xFF; 7]);
    out.extend_from_slice(children);
    out
}
