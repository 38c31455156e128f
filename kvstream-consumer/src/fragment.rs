//! Complete fragments delivered by the detector.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use kvstream_ebml::{elements, Document, Element, Schema};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One complete fragment: the exact bytes of a run of top-level elements
/// ending with the root element, and their parsed tree.
///
/// Offsets inside the document are relative to the fragment's first byte,
/// so a fragment saved to disk parses back to the same tree.
#[derive(Debug, Clone)]
pub struct Fragment {
    document: Document,
    fragment_number: u64,
    stream_name: Arc<str>,
    receive_timestamp: DateTime<Utc>,
    receive_duration: Duration,
}

impl Fragment {
    /// Create a fragment from a parsed document.
    pub fn new(
        document: Document,
        fragment_number: u64,
        stream_name: Arc<str>,
        receive_timestamp: DateTime<Utc>,
        receive_duration: Duration,
    ) -> Self {
        Self {
            document,
            fragment_number,
            stream_name,
            receive_timestamp,
            receive_duration,
        }
    }

    /// Parse standalone Matroska bytes (for example a saved fragment file).
    pub fn parse(data: impl Into<Bytes>) -> kvstream_ebml::Result<Self> {
        Self::parse_with_schema(Schema::matroska_shared(), data)
    }

    /// Parse standalone bytes with a custom schema.
    pub fn parse_with_schema(
        schema: Arc<Schema>,
        data: impl Into<Bytes>,
    ) -> kvstream_ebml::Result<Self> {
        let document = Document::parse(schema, data)?;
        Ok(Self::new(document, 0, Arc::from(""), Utc::now(), Duration::ZERO))
    }

    /// The parsed tree.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The exact bytes of this fragment as received.
    pub fn raw_bytes(&self) -> &Bytes {
        self.document.as_bytes()
    }

    /// Fragment size in bytes.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Check if the fragment has no bytes.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Position in the stream, starting at 0.
    pub fn fragment_number(&self) -> u64 {
        self.fragment_number
    }

    /// Name of the stream this fragment came from.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Wall-clock time the fragment was completed.
    pub fn receive_timestamp(&self) -> DateTime<Utc> {
        self.receive_timestamp
    }

    /// Time between the fragment's first byte arriving and its completion.
    pub fn receive_duration(&self) -> Duration {
        self.receive_duration
    }

    /// The Matroska Segment of this fragment.
    pub fn segment(&self) -> Option<&Element> {
        self.document.segment()
    }

    /// First element with `id` anywhere in the fragment.
    pub fn find(&self, id: u32) -> Option<&Element> {
        self.document.find(id)
    }

    /// Number of clusters in the fragment.
    pub fn cluster_count(&self) -> usize {
        self.document.find_all(elements::CLUSTER).count()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fragment #{} of {} ({} bytes, received {})",
            self.fragment_number,
            self.stream_name,
            self.len(),
            self.receive_timestamp.to_rfc3339()
        )?;
        fmt::Display::fmt(&self.document, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvstream_ebml::ebml::encode_element;

    #[test]
    fn test_parse_standalone() {
        let cluster = encode_element(elements::CLUSTER, &encode_element(elements::TIMESTAMP, &[1]));
        let data = encode_element(elements::SEGMENT, &cluster);
        let fragment = Fragment::parse(data.clone()).unwrap();

        assert_eq!(fragment.raw_bytes().as_ref(), data.as_slice());
        assert_eq!(fragment.fragment_number(), 0);
        assert_eq!(fragment.cluster_count(), 1);
        assert!(fragment.segment().is_some());
        assert!(fragment.to_string().contains("Cluster (ID 0x1F43B675)"));
    }
}
