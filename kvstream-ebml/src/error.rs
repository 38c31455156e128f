//! EBML-specific error types.
//!
//! This module provides the error types produced while decoding EBML headers,
//! walking element trees and reading scalar payloads.

use crate::schema::ElementKind;
use thiserror::Error;

/// EBML decoding error types.
#[derive(Error, Debug)]
pub enum EbmlError {
    /// Corrupt element ID or size encoding.
    #[error("Malformed element header at offset {offset}: {message}")]
    MalformedHeader {
        /// Byte offset where the corrupt header starts.
        offset: u64,
        /// Description of the encoding problem.
        message: String,
    },

    /// Not enough bytes are available to finish the element.
    #[error("Truncated element at offset {offset}: need {needed} bytes, have {available}")]
    TruncatedElement {
        /// Byte offset of the element (or header) being decoded.
        offset: u64,
        /// Number of bytes required from `offset`.
        needed: u64,
        /// Number of bytes available from `offset`.
        available: u64,
    },

    /// An unknown-size master never met a terminating element before the
    /// input ended part-way through one of its children.
    #[error("Unknown-size master 0x{id:X} at offset {offset} could not be resolved before end of stream")]
    UnresolvableUnknownSizeMaster {
        /// ID of the outermost unresolved master.
        id: u32,
        /// Byte offset of that master.
        offset: u64,
    },

    /// Unknown size declared on an element that is not a master.
    #[error("Unknown size is only valid for master elements (0x{id:X} at offset {offset})")]
    UnknownSizeNotAllowed {
        /// The element ID.
        id: u32,
        /// Byte offset of the element.
        offset: u64,
    },

    /// A child element extends past the end of its parent.
    #[error("Element 0x{id:X} at offset {offset} overruns its parent ending at {parent_end}")]
    ChildOverrun {
        /// The child element ID.
        id: u32,
        /// Byte offset of the child.
        offset: u64,
        /// End offset of the enclosing master.
        parent_end: u64,
    },

    /// Master elements are nested deeper than the reader allows.
    #[error("Nesting limit exceeded at depth {depth}")]
    NestingTooDeep {
        /// The depth at which nesting was limited.
        depth: usize,
    },

    /// A typed accessor was used on an element of a different kind.
    #[error("Element 0x{id:X} is {actual}, not {expected}")]
    TypeMismatch {
        /// The element ID.
        id: u32,
        /// Kind requested by the caller.
        expected: ElementKind,
        /// Kind recorded in the schema.
        actual: ElementKind,
    },

    /// A scalar payload has a length its type cannot hold.
    #[error("Invalid {kind} payload length {length} for element 0x{id:X}")]
    InvalidScalar {
        /// The element ID.
        id: u32,
        /// Declared element kind.
        kind: ElementKind,
        /// Payload length in bytes.
        length: u64,
    },

    /// String payload is not valid UTF-8.
    #[error("Invalid UTF-8 string in element 0x{id:X}")]
    InvalidString {
        /// The element ID.
        id: u32,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EbmlError {
    /// Whether more input could make the failed operation succeed.
    ///
    /// Only [`EbmlError::TruncatedElement`] is recoverable; every other
    /// variant describes data that will stay invalid.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EbmlError::TruncatedElement { .. })
    }

    pub(crate) fn truncated(offset: u64, needed: u64, available: u64) -> Self {
        EbmlError::TruncatedElement {
            offset,
            needed,
            available,
        }
    }

    pub(crate) fn malformed(offset: u64, message: impl Into<String>) -> Self {
        EbmlError::MalformedHeader {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for EBML operations.
pub type Result<T> = std::result::Result<T, EbmlError>;
