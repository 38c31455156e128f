//! Tag extraction.
//!
//! Kinesis Video attaches fragment metadata (fragment number, server and
//! producer timestamps) as `SimpleTag`s under `Segment/Tags`. Producers may
//! add their own tags next to them.

use crate::error::ProcessorError;
use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use kvstream_consumer::Fragment;
use kvstream_ebml::elements::*;
use kvstream_ebml::{Document, Element};
use std::collections::HashMap;
use std::fmt;

/// Target of a `Tag`.
///
/// An empty target applies to the whole fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTarget {
    /// Logical level (50 = movie/fragment, 30 = chapter, ...).
    pub target_type_value: Option<u64>,
    /// Informational level name.
    pub target_type: Option<String>,
    /// Targeted track UIDs.
    pub track_uids: Vec<u64>,
    /// Targeted chapter UIDs.
    pub chapter_uids: Vec<u64>,
    /// Targeted edition UIDs.
    pub edition_uids: Vec<u64>,
    /// Targeted attachment UIDs.
    pub attachment_uids: Vec<u64>,
}

impl TagTarget {
    /// First targeted track UID, or `None` for fragment-wide tags.
    pub fn track_uid(&self) -> Option<u64> {
        self.track_uids.first().copied()
    }

    /// Check if the tag applies to the whole fragment.
    pub fn is_fragment_wide(&self) -> bool {
        self.track_uids.is_empty()
            && self.chapter_uids.is_empty()
            && self.edition_uids.is_empty()
            && self.attachment_uids.is_empty()
    }

    fn from_element(targets: &Element) -> Result<Self> {
        let uids = |id| -> Result<Vec<u64>> {
            targets
                .children_with_id(id)
                .map(|e| e.as_unsigned().map_err(ProcessorError::from))
                .collect()
        };

        Ok(Self {
            target_type_value: targets.child_unsigned(TARGET_TYPE_VALUE)?,
            target_type: targets.child_str(TARGET_TYPE)?.map(str::to_owned),
            track_uids: uids(TAG_TRACK_UID)?,
            chapter_uids: uids(TAG_CHAPTER_UID)?,
            edition_uids: uids(TAG_EDITION_UID)?,
            attachment_uids: uids(TAG_ATTACHMENT_UID)?,
        })
    }
}

/// Value of a `SimpleTag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// `TagString` payload.
    String(String),
    /// `TagBinary` payload.
    Binary(Bytes),
    /// Neither `TagString` nor `TagBinary` present.
    Empty,
}

impl TagValue {
    /// String value, if this is a string tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::String(s) => f.write_str(s),
            TagValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            TagValue::Empty => Ok(()),
        }
    }
}

/// One `SimpleTag` with the target of its enclosing `Tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    /// What the tag applies to.
    pub target: TagTarget,
    /// Tag name.
    pub name: String,
    /// Tag language.
    pub language: Option<String>,
    /// Tag value.
    pub value: TagValue,
}

impl TagRecord {
    fn from_element(target: &TagTarget, simple_tag: &Element) -> Result<Self> {
        let name = simple_tag
            .child_str(TAG_NAME)?
            .ok_or(ProcessorError::MissingElement("TagName"))?
            .to_owned();

        let language = match simple_tag.child_str(TAG_LANGUAGE_BCP47)? {
            Some(lang) => Some(lang.to_owned()),
            None => simple_tag.child_str(TAG_LANGUAGE)?.map(str::to_owned),
        };

        // The last value element wins when both are present
        let mut value = TagValue::Empty;
        for child in simple_tag.children() {
            match child.id() {
                TAG_STRING => value = TagValue::String(child.as_str()?.to_owned()),
                TAG_BINARY => value = TagValue::Binary(child.as_binary()?.clone()),
                _ => {}
            }
        }

        Ok(Self {
            target: target.clone(),
            name,
            language,
            value,
        })
    }
}

/// All `SimpleTag`s of a fragment in document order.
///
/// A fragment without `Tags` yields an empty list. Malformed `SimpleTag`s
/// are skipped.
pub fn extract_tags(fragment: &Fragment) -> Result<Vec<TagRecord>> {
    tags_from_document(fragment.document())
}

pub(crate) fn tags_from_document(document: &Document) -> Result<Vec<TagRecord>> {
    let segment = document
        .segment()
        .ok_or(ProcessorError::MissingElement("Segment"))?;

    let mut records = Vec::new();
    for tag in segment
        .children_with_id(TAGS)
        .flat_map(|tags| tags.children_with_id(TAG))
    {
        let target = match tag.child(TARGETS).map(TagTarget::from_element).transpose() {
            Ok(target) => target.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(offset = tag.offset(), error = %e, "skipping tag with malformed targets");
                continue;
            }
        };

        for simple_tag in tag.children_with_id(SIMPLE_TAG) {
            match TagRecord::from_element(&target, simple_tag) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(offset = simple_tag.offset(), error = %e, "skipping malformed SimpleTag");
                }
            }
        }
    }

    Ok(records)
}

/// Collapse tag records into a name → value map.
///
/// Later records override earlier ones with the same name.
pub fn tag_map(records: &[TagRecord]) -> HashMap<String, TagValue> {
    records
        .iter()
        .map(|r| (r.name.clone(), r.value.clone()))
        .collect()
}

/// Tag names Kinesis Video attaches to every fragment.
pub mod names {
    /// Fragment number assigned by the service.
    pub const FRAGMENT_NUMBER: &str = "AWS_KINESISVIDEO_FRAGMENT_NUMBER";
    /// Server-side ingestion timestamp.
    pub const SERVER_TIMESTAMP: &str = "AWS_KINESISVIDEO_SERVER_TIMESTAMP";
    /// Producer-side timestamp.
    pub const PRODUCER_TIMESTAMP: &str = "AWS_KINESISVIDEO_PRODUCER_TIMESTAMP";
    /// How far the consumer lags behind the head of the stream.
    pub const MILLIS_BEHIND_NOW: &str = "AWS_KINESISVIDEO_MILLIS_BEHIND_NOW";
    /// Token to resume consumption after this fragment.
    pub const CONTINUATION_TOKEN: &str = "AWS_KINESISVIDEO_CONTINUATION_TOKEN";
    /// Service error code.
    pub const ERROR_CODE: &str = "AWS_KINESISVIDEO_ERROR_CODE";
    /// Service error ID.
    pub const ERROR_ID: &str = "AWS_KINESISVIDEO_ERROR_ID";
}

/// The well-known Kinesis Video fragment tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KinesisTags {
    /// Service fragment number.
    pub fragment_number: Option<String>,
    /// Server-side timestamp.
    pub server_timestamp: Option<DateTime<Utc>>,
    /// Producer-side timestamp.
    pub producer_timestamp: Option<DateTime<Utc>>,
    /// Consumer lag in milliseconds.
    pub millis_behind_now: Option<u64>,
    /// Resume token.
    pub continuation_token: Option<String>,
    /// Service error code.
    pub error_code: Option<String>,
    /// Service error ID.
    pub error_id: Option<String>,
}

impl KinesisTags {
    /// Read the well-known tags from a list of records.
    ///
    /// Tags that are absent or fail to parse are left as `None`.
    pub fn from_records(records: &[TagRecord]) -> Self {
        let map = tag_map(records);
        let string = |name: &str| map.get(name).and_then(TagValue::as_str).map(str::to_owned);

        Self {
            fragment_number: string(names::FRAGMENT_NUMBER),
            server_timestamp: string(names::SERVER_TIMESTAMP)
                .as_deref()
                .and_then(parse_epoch_seconds),
            producer_timestamp: string(names::PRODUCER_TIMESTAMP)
                .as_deref()
                .and_then(parse_epoch_seconds),
            millis_behind_now: string(names::MILLIS_BEHIND_NOW).and_then(|s| s.trim().parse().ok()),
            continuation_token: string(names::CONTINUATION_TOKEN),
            error_code: string(names::ERROR_CODE),
            error_id: string(names::ERROR_ID),
        }
    }

    /// Read the well-known tags of a fragment.
    pub fn from_fragment(fragment: &Fragment) -> Result<Self> {
        Ok(Self::from_records(&extract_tags(fragment)?))
    }

    /// Check if the service reported an error for this fragment.
    pub fn has_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Parse `seconds[.fraction]` since the Unix epoch.
fn parse_epoch_seconds(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let (secs, frac) = value.split_once('.').unwrap_or((value, ""));
    let secs: i64 = secs.parse().ok()?;

    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanos = if frac.is_empty() {
        0
    } else {
        frac.parse::<u32>().ok()? * 10u32.pow(9 - frac.len() as u32)
    };

    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstream_ebml::ebml::{encode_element, encode_unsigned_int};

    fn simple_tag(name: &str, value: &str) -> Vec<u8> {
        let mut body = encode_element(TAG_NAME, name.as_bytes());
        body.extend(encode_element(TAG_STRING, value.as_bytes()));
        encode_element(SIMPLE_TAG, &body)
    }

    fn fragment_with_tags(tags: &[Vec<u8>]) -> Fragment {
        let tags = encode_element(TAGS, &tags.concat());
        Fragment::parse(encode_element(SEGMENT, &tags)).unwrap()
    }

    fn kinesis_fragment() -> Fragment {
        let mut body = simple_tag(names::FRAGMENT_NUMBER, "91343852333181432392682062622220590765191907586");
        body.extend(simple_tag(names::SERVER_TIMESTAMP, "1665090834.843"));
        body.extend(simple_tag(names::PRODUCER_TIMESTAMP, "1665090833.5"));
        body.extend(simple_tag(names::MILLIS_BEHIND_NOW, "2150"));
        fragment_with_tags(&[encode_element(TAG, &body)])
    }

    #[test]
    fn test_extract_tags() {
        let fragment = kinesis_fragment();
        let tags = extract_tags(&fragment).unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0].name, names::FRAGMENT_NUMBER);
        assert!(tags[0].target.is_fragment_wide());
        assert_eq!(tags[3].value, TagValue::String("2150".into()));
    }

    #[test]
    fn test_no_tags_is_empty() {
        let fragment = Fragment::parse(encode_element(SEGMENT, &[])).unwrap();
        assert!(extract_tags(&fragment).unwrap().is_empty());
    }

    #[test]
    fn test_missing_segment() {
        let fragment = Fragment::parse(encode_element(EBML, &[])).unwrap();
        assert!(matches!(
            extract_tags(&fragment),
            Err(ProcessorError::MissingElement("Segment"))
        ));
    }

    #[test]
    fn test_track_target_and_binary_value() {
        let mut targets = encode_element(TARGET_TYPE_VALUE, &encode_unsigned_int(30));
        targets.extend(encode_element(TAG_TRACK_UID, &encode_unsigned_int(7)));

        let mut simple = encode_element(TAG_NAME, b"THUMB");
        simple.extend(encode_element(TAG_BINARY, &[0xDE, 0xAD]));

        let mut tag = encode_element(TARGETS, &targets);
        tag.extend(encode_element(SIMPLE_TAG, &simple));

        let fragment = fragment_with_tags(&[encode_element(TAG, &tag)]);
        let tags = extract_tags(&fragment).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].target.track_uid(), Some(7));
        assert_eq!(tags[0].target.target_type_value, Some(30));
        assert_eq!(tags[0].value, TagValue::Binary(Bytes::from_static(&[0xDE, 0xAD])));
        assert_eq!(tags[0].value.to_string(), "<2 bytes>");
    }

    #[test]
    fn test_nameless_tag_skipped() {
        let nameless = encode_element(SIMPLE_TAG, &encode_element(TAG_STRING, b"orphan"));
        let mut body = nameless;
        body.extend(simple_tag("KEPT", "yes"));

        let fragment = fragment_with_tags(&[encode_element(TAG, &body)]);
        let tags = extract_tags(&fragment).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "KEPT");
    }

    #[test]
    fn test_tag_map_later_wins() {
        let mut body = simple_tag("A", "first");
        body.extend(simple_tag("B", "other"));
        body.extend(simple_tag("A", "second"));
        let fragment = fragment_with_tags(&[encode_element(TAG, &body)]);

        let map = tag_map(&extract_tags(&fragment).unwrap());
        assert_eq!(map.len(), 2);
        assert_eq!(map["A"], TagValue::String("second".into()));
    }

    #[test]
    fn test_extract_tags_idempotent() {
        let fragment = kinesis_fragment();
        assert_eq!(extract_tags(&fragment).unwrap(), extract_tags(&fragment).unwrap());
    }

    #[test]
    fn test_kinesis_tags() {
        let kinesis = KinesisTags::from_fragment(&kinesis_fragment()).unwrap();
        assert_eq!(
            kinesis.fragment_number.as_deref(),
            Some("91343852333181432392682062622220590765191907586")
        );
        let server = kinesis.server_timestamp.unwrap();
        assert_eq!(server.timestamp(), 1_665_090_834);
        assert_eq!(server.timestamp_subsec_millis(), 843);
        assert_eq!(
            kinesis.producer_timestamp.unwrap().timestamp_subsec_millis(),
            500
        );
        assert_eq!(kinesis.millis_behind_now, Some(2150));
        assert!(!kinesis.has_error());
    }

    #[test]
    fn test_parse_epoch_seconds() {
        assert_eq!(parse_epoch_seconds("10").unwrap().timestamp(), 10);
        assert!(parse_epoch_seconds("10.x").is_none());
        assert!(parse_epoch_seconds("abc").is_none());
        assert!(parse_epoch_seconds("1.0123456789").is_none());
    }
}
