//! Parsed element tree nodes.

use crate::ebml::{
    date_to_utc, read_date, read_float, read_signed_int, read_string, read_unsigned_int,
};
use crate::error::{EbmlError, Result};
use crate::reader::ElementStart;
use crate::schema::ElementKind;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;

/// Payload of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementBody {
    /// Raw payload of a non-master element.
    Data(Bytes),
    /// Children of a master element, in stream order.
    Children(Vec<Element>),
}

/// One node of a parsed document. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: u32,
    kind: ElementKind,
    offset: u64,
    header_size: usize,
    declared_size: Option<u64>,
    data_size: u64,
    body: ElementBody,
}

/// A decoded scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Master element with this many children.
    Master(usize),
    /// Unsigned integer.
    Unsigned(u64),
    /// Signed integer.
    Signed(i64),
    /// Floating point.
    Float(f64),
    /// String (ASCII or UTF-8).
    String(String),
    /// Nanoseconds since 2001-01-01.
    Date(i64),
    /// Binary payload.
    Binary(Bytes),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Master(count) => write!(f, "(master) {} subelements", count),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Signed(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Date(ns) => match date_to_utc(*ns) {
                Some(time) => write!(f, "{}", time.to_rfc3339()),
                None => write!(f, "{} ns", ns),
            },
            Value::Binary(data) => write!(f, "<{} bytes>", data.len()),
        }
    }
}

impl Element {
    /// Build a leaf from its header and payload slice.
    pub(crate) fn leaf(start: &ElementStart, payload: Bytes) -> Self {
        Self {
            id: start.id,
            kind: start.kind,
            offset: start.offset,
            header_size: start.header_size,
            declared_size: start.size,
            data_size: payload.len() as u64,
            body: ElementBody::Data(payload),
        }
    }

    /// Build a master from its header, resolved end offset and children.
    pub(crate) fn master(start: &ElementStart, end: u64, children: Vec<Element>) -> Self {
        Self {
            id: start.id,
            kind: start.kind,
            offset: start.offset,
            header_size: start.header_size,
            declared_size: start.size,
            data_size: end.saturating_sub(start.data_offset()),
            body: ElementBody::Children(children),
        }
    }

    /// The element ID.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Absolute offset of the element header.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Header size in bytes.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Declared payload size; `None` when the stream used unknown size.
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    /// Check if the size was resolved by lookahead.
    pub fn has_unknown_size(&self) -> bool {
        self.declared_size.is_none()
    }

    /// Payload size in bytes (resolved for unknown-size masters).
    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Header plus payload size.
    pub fn total_size(&self) -> u64 {
        self.header_size as u64 + self.data_size
    }

    /// Absolute offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.total_size()
    }

    /// Check if this is a master element.
    pub fn is_master(&self) -> bool {
        matches!(self.body, ElementBody::Children(_))
    }

    /// The element payload.
    pub fn body(&self) -> &ElementBody {
        &self.body
    }

    /// Children of a master; empty for leaves.
    pub fn children(&self) -> &[Element] {
        match &self.body {
            ElementBody::Children(children) => children,
            ElementBody::Data(_) => &[],
        }
    }

    /// First child with the given ID.
    pub fn child(&self, id: u32) -> Option<&Element> {
        self.children().iter().find(|c| c.id == id)
    }

    /// All children with the given ID.
    pub fn children_with_id(&self, id: u32) -> impl Iterator<Item = &Element> + '_ {
        self.children().iter().filter(move |c| c.id == id)
    }

    /// Raw payload of a leaf; empty for masters.
    pub fn data(&self) -> &[u8] {
        match &self.body {
            ElementBody::Data(data) => data,
            ElementBody::Children(_) => &[],
        }
    }

    /// Shared payload handle of a leaf.
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            ElementBody::Data(data) => Some(data),
            ElementBody::Children(_) => None,
        }
    }

    fn expect_kind(&self, expected: &[ElementKind]) -> Result<()> {
        if expected.contains(&self.kind) {
            Ok(())
        } else {
            Err(EbmlError::TypeMismatch {
                id: self.id,
                expected: expected[0],
                actual: self.kind,
            })
        }
    }

    fn int_payload(&self) -> Result<&[u8]> {
        let data = self.data();
        if data.len() > 8 {
            return Err(EbmlError::InvalidScalar {
                id: self.id,
                kind: self.kind,
                length: data.len() as u64,
            });
        }
        Ok(data)
    }

    /// Decode an unsigned integer.
    pub fn as_unsigned(&self) -> Result<u64> {
        self.expect_kind(&[ElementKind::UnsignedInt])?;
        Ok(read_unsigned_int(self.int_payload()?))
    }

    /// Decode a signed integer.
    pub fn as_signed(&self) -> Result<i64> {
        self.expect_kind(&[ElementKind::SignedInt])?;
        Ok(read_signed_int(self.int_payload()?))
    }

    /// Decode a float.
    pub fn as_float(&self) -> Result<f64> {
        self.expect_kind(&[ElementKind::Float])?;
        read_float(self.data()).ok_or(EbmlError::InvalidScalar {
            id: self.id,
            kind: self.kind,
            length: self.data_size,
        })
    }

    /// Decode a string (ASCII or UTF-8), stopping at the first NUL.
    pub fn as_str(&self) -> Result<&str> {
        self.expect_kind(&[ElementKind::Utf8, ElementKind::String])?;
        read_string(self.data()).map_err(|_| EbmlError::InvalidString { id: self.id })
    }

    /// Decode a date as nanoseconds since 2001-01-01.
    pub fn as_date_nanos(&self) -> Result<i64> {
        self.expect_kind(&[ElementKind::Date])?;
        Ok(read_date(self.int_payload()?))
    }

    /// Decode a date as a UTC timestamp.
    pub fn as_date(&self) -> Result<DateTime<Utc>> {
        let nanos = self.as_date_nanos()?;
        date_to_utc(nanos).ok_or(EbmlError::InvalidScalar {
            id: self.id,
            kind: self.kind,
            length: self.data_size,
        })
    }

    /// Payload of a binary element.
    pub fn as_binary(&self) -> Result<&Bytes> {
        self.expect_kind(&[ElementKind::Binary])?;
        self.bytes().ok_or(EbmlError::TypeMismatch {
            id: self.id,
            expected: ElementKind::Binary,
            actual: self.kind,
        })
    }

    /// Decode the payload according to the element kind.
    pub fn value(&self) -> Result<Value> {
        Ok(match self.kind {
            ElementKind::Master => Value::Master(self.children().len()),
            ElementKind::UnsignedInt => Value::Unsigned(self.as_unsigned()?),
            ElementKind::SignedInt => Value::Signed(self.as_signed()?),
            ElementKind::Float => Value::Float(self.as_float()?),
            ElementKind::String | ElementKind::Utf8 => Value::String(self.as_str()?.to_owned()),
            ElementKind::Date => Value::Date(self.as_date_nanos()?),
            ElementKind::Binary => Value::Binary(self.bytes().cloned().unwrap_or_default()),
        })
    }

    /// Unsigned value of the first child with `id`.
    pub fn child_unsigned(&self, id: u32) -> Result<Option<u64>> {
        self.child(id).map(Element::as_unsigned).transpose()
    }

    /// String value of the first child with `id`.
    pub fn child_str(&self, id: u32) -> Result<Option<&str>> {
        self.child(id).map(Element::as_str).transpose()
    }

    /// Float value of the first child with `id`.
    pub fn child_float(&self, id: u32) -> Result<Option<f64>> {
        self.child(id).map(Element::as_float).transpose()
    }

    /// Payload of the first binary child with `id`.
    pub fn child_binary(&self, id: u32) -> Result<Option<&Bytes>> {
        self.child(id).map(Element::as_binary).transpose()
    }

    /// Structural equality: IDs, kinds and payloads, ignoring offsets.
    pub fn same_structure(&self, other: &Element) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && match (&self.body, &other.body) {
                (ElementBody::Data(a), ElementBody::Data(b)) => a == b,
                (ElementBody::Children(a), ElementBody::Children(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
                }
                _ => false,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(id: u32, kind: ElementKind, size: u64) -> ElementStart {
        ElementStart {
            id,
            kind,
            offset: 10,
            header_size: 2,
            size: Some(size),
            depth: 0,
        }
    }

    fn leaf(kind: ElementKind, payload: &'static [u8]) -> Element {
        Element::leaf(&start(0x81, kind, payload.len() as u64), Bytes::from_static(payload))
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(leaf(ElementKind::UnsignedInt, &[0x01, 0x00]).as_unsigned().unwrap(), 256);
        assert_eq!(leaf(ElementKind::SignedInt, &[0xFF]).as_signed().unwrap(), -1);
        assert_eq!(leaf(ElementKind::Utf8, b"abc\0").as_str().unwrap(), "abc");
        let float = 2.5f64.to_bits().to_be_bytes().to_vec();
        let element = Element::leaf(&start(0x81, ElementKind::Float, 8), Bytes::from(float));
        assert_eq!(element.as_float().unwrap(), 2.5);
    }

    #[test]
    fn test_zero_length_payloads() {
        assert_eq!(leaf(ElementKind::UnsignedInt, &[]).as_unsigned().unwrap(), 0);
        assert_eq!(leaf(ElementKind::SignedInt, &[]).as_signed().unwrap(), 0);
        assert_eq!(leaf(ElementKind::Float, &[]).as_float().unwrap(), 0.0);
        assert_eq!(leaf(ElementKind::String, &[]).as_str().unwrap(), "");
        assert_eq!(leaf(ElementKind::Date, &[]).as_date_nanos().unwrap(), 0);
    }

    #[test]
    fn test_type_mismatch() {
        let err = leaf(ElementKind::Utf8, b"x").as_unsigned().unwrap_err();
        assert!(matches!(
            err,
            EbmlError::TypeMismatch {
                expected: ElementKind::UnsignedInt,
                actual: ElementKind::Utf8,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_scalar_lengths() {
        let err = leaf(ElementKind::UnsignedInt, &[0; 9]).as_unsigned().unwrap_err();
        assert!(matches!(err, EbmlError::InvalidScalar { length: 9, .. }));
        let err = leaf(ElementKind::Float, &[0; 3]).as_float().unwrap_err();
        assert!(matches!(err, EbmlError::InvalidScalar { length: 3, .. }));
        let err = leaf(ElementKind::Utf8, &[0xC3, 0x28]).as_str().unwrap_err();
        assert!(matches!(err, EbmlError::InvalidString { id: 0x81 }));
    }

    #[test]
    fn test_master_navigation() {
        let a = leaf(ElementKind::UnsignedInt, &[1]);
        let b = Element::leaf(
            &ElementStart {
                id: 0x82,
                ..start(0x82, ElementKind::Utf8, 2)
            },
            Bytes::from_static(b"hi"),
        );
        let master = Element::master(&start(0xA0, ElementKind::Master, 7), 19, vec![a, b]);

        assert!(master.is_master());
        assert_eq!(master.data_size(), 7);
        assert_eq!(master.end(), 19);
        assert_eq!(master.child_unsigned(0x81).unwrap(), Some(1));
        assert_eq!(master.child_str(0x82).unwrap(), Some("hi"));
        assert_eq!(master.child_unsigned(0x99).unwrap(), None);
        assert_eq!(master.children_with_id(0x81).count(), 1);
        assert_eq!(master.value().unwrap(), Value::Master(2));
        assert!(master.data().is_empty());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Unsigned(7).to_string(), "7");
        assert_eq!(Value::String("x".into()).to_string(), "\"x\"");
        assert_eq!(Value::Binary(Bytes::from_static(&[1, 2])).to_string(), "<2 bytes>");
        assert_eq!(Value::Date(0).to_string(), "2001-01-01T00:00:00+00:00");
        assert_eq!(Value::Master(3).to_string(), "(master) 3 subelements");
    }
}
