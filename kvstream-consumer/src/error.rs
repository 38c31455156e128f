//! Stream consumption errors

use kvstream_ebml::EbmlError;
use thiserror::Error;

/// Errors from stream consumption
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// Malformed or unresolvable element data
    #[error("parse error: {0}")]
    Ebml(#[from] EbmlError),

    /// Byte source failed
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    /// Stream ended part-way through a fragment
    #[error("incomplete fragment at stream offset {offset} ({buffered} bytes buffered)")]
    IncompleteFragment {
        /// Stream offset of the first byte of the partial fragment
        offset: u64,
        /// Bytes buffered for it
        buffered: usize,
    },

    /// In-flight fragment grew past the configured limit
    #[error("fragment exceeds {limit} bytes")]
    FragmentTooLarge {
        /// Configured maximum
        limit: usize,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Consumer thread could not be started
    #[error("failed to spawn consumer thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Consumer thread panicked
    #[error("consumer thread panicked")]
    ThreadPanicked,
}

impl ConsumerError {
    /// Check if the stream ended inside a fragment.
    pub fn is_incomplete_fragment(&self) -> bool {
        matches!(
            self,
            ConsumerError::IncompleteFragment { .. }
                | ConsumerError::Ebml(EbmlError::UnresolvableUnknownSizeMaster { .. })
        )
    }
}
