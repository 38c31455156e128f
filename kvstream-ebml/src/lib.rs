//! # kvstream-ebml
//!
//! EBML decoding and element trees for streamed Matroska fragments.
//!
//! ## Features
//!
//! - Variable-length integer (VINT) decoding and encoding over byte slices
//! - Schema tables mapping element IDs to names, kinds and allowed parents
//! - A resumable, event-based [`ElementReader`] for partially received data
//! - Unknown-size masters resolved by schema lookahead
//! - Zero-copy [`Element`] trees and a [`Document`] model with a pretty printer
//!
//! ## Example: Parsing a fragment
//!
//! ```
//! use kvstream_ebml::{ebml, elements, Document};
//!
//! let cluster = ebml::encode_unknown_size_element(
//!     elements::CLUSTER,
//!     &ebml::encode_element(elements::TIMESTAMP, &[0x10]),
//! );
//! let data = ebml::encode_element(elements::SEGMENT, &cluster);
//!
//! let doc = Document::parse_matroska(data).unwrap();
//! let timestamp = doc.find(elements::TIMESTAMP).unwrap();
//! assert_eq!(timestamp.as_unsigned().unwrap(), 16);
//! println!("{}", doc);
//! ```
//!
//! ## Unknown-size masters
//!
//! Live encoders often cannot predict a Cluster's size and write the
//! all-ones "unknown" marker instead. Such a master stays open while the
//! following IDs are valid children (per [`Schema::accepts_child`]), global
//! elements, or IDs the schema does not define. The first known ID that is
//! none of these closes it without being consumed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod document;
pub mod ebml;
pub mod element;
pub mod elements;
pub mod error;
pub mod reader;
pub mod schema;

pub use builder::TreeBuilder;
pub use document::{Document, Walk};
pub use ebml::ElementHeader;
pub use element::{Element, ElementBody, Value};
pub use error::{EbmlError, Result};
pub use reader::{ElementReader, ElementStart, ReadEvent, Step};
pub use schema::{ElementDef, ElementKind, Placement, Schema};

/// Check if data starts with the EBML header signature.
pub fn is_ebml_signature(data: &[u8]) -> bool {
    // EBML header element ID: 0x1A45DFA3
    data.len() >= 4 && data[0..4] == [0x1A, 0x45, 0xDF, 0xA3]
}
