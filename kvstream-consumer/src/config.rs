//! Consumer configuration

use crate::{ConsumerError, Result};
use kvstream_ebml::{ebml, elements};
use serde::{Deserialize, Serialize};

/// Default limit for one in-flight fragment (64 MiB)
pub const DEFAULT_MAX_FRAGMENT_BYTES: usize = 64 * 1024 * 1024;
/// Smallest accepted fragment limit (1 KiB)
pub const MIN_FRAGMENT_BYTES: usize = 1024;
/// Largest accepted fragment limit (1 GiB)
pub const MAX_FRAGMENT_BYTES_LIMIT: usize = 1024 * 1024 * 1024;
/// Default read size for `std::io::Read` sources (16 KiB)
pub const DEFAULT_READ_CHUNK_SIZE: usize = 16 * 1024;

/// Stream consumer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Stream name, reported with every fragment and callback
    pub stream_name: String,
    /// Maximum bytes buffered for one fragment
    pub max_fragment_bytes: usize,
    /// ID of the top-level element that ends a fragment
    pub root_element_id: u32,
    /// Read size used by [`ReaderSource`](crate::ReaderSource)
    pub read_chunk_size: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            stream_name: "stream".to_string(),
            max_fragment_bytes: DEFAULT_MAX_FRAGMENT_BYTES,
            root_element_id: elements::SEGMENT,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl ConsumerConfig {
    /// Create a configuration for the named stream
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Default::default()
        }
    }

    /// Set the stream name
    pub fn with_stream_name(mut self, stream_name: impl Into<String>) -> Self {
        self.stream_name = stream_name.into();
        self
    }

    /// Set the fragment size limit
    pub fn with_max_fragment_bytes(mut self, max_fragment_bytes: usize) -> Self {
        self.max_fragment_bytes = max_fragment_bytes;
        self
    }

    /// Set the root element ID
    pub fn with_root_element_id(mut self, root_element_id: u32) -> Self {
        self.root_element_id = root_element_id;
        self
    }

    /// Set the read chunk size
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    /// Validate the consumer configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stream name is empty
    /// - The fragment limit is outside `[MIN_FRAGMENT_BYTES, MAX_FRAGMENT_BYTES_LIMIT]`
    /// - The read chunk size is zero or larger than the fragment limit
    /// - The root element ID is not a valid EBML ID
    pub fn validate(&self) -> Result<()> {
        if self.stream_name.trim().is_empty() {
            return Err(ConsumerError::Configuration(
                "stream name must not be empty".to_string(),
            ));
        }

        if !(MIN_FRAGMENT_BYTES..=MAX_FRAGMENT_BYTES_LIMIT).contains(&self.max_fragment_bytes) {
            return Err(ConsumerError::Configuration(format!(
                "max fragment bytes {} out of valid range [{}, {}]",
                self.max_fragment_bytes, MIN_FRAGMENT_BYTES, MAX_FRAGMENT_BYTES_LIMIT
            )));
        }

        if self.read_chunk_size == 0 || self.read_chunk_size > self.max_fragment_bytes {
            return Err(ConsumerError::Configuration(format!(
                "read chunk size {} out of valid range [1, {}]",
                self.read_chunk_size, self.max_fragment_bytes
            )));
        }

        let width = ebml::element_id_length(self.root_element_id);
        let encoded = self.root_element_id.to_be_bytes();
        match ebml::read_element_id(&encoded[4 - width..], 0) {
            Ok((id, len)) if id == self.root_element_id && len == width => Ok(()),
            _ => Err(ConsumerError::Configuration(format!(
                "root element ID 0x{:X} is not a valid EBML ID",
                self.root_element_id
            ))),
        }
    }
}
