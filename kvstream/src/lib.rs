//! # kvstream
//!
//! Consume a live stream of Matroska fragments, such as the body of a
//! Kinesis Video `GetMedia` response, and post-process each fragment.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvstream::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let body = std::fs::File::open("get_media_response.bin")?;
//!     let config = ConsumerConfig::new("front-door");
//!     let source = ReaderSource::new(body, config.read_chunk_size);
//!
//!     let handler = CallbackHandler::new(|fragment: Fragment| {
//!         let tags = KinesisTags::from_fragment(&fragment).unwrap_or_default();
//!         println!("fragment {:?}: {} bytes", tags.fragment_number, fragment.len());
//!     });
//!
//!     let handle = StreamConsumer::new(config, source, handler)?.spawn()?;
//!     match handle.join() {
//!         StreamOutcome::Failed(e) => eprintln!("stream failed: {}", e),
//!         outcome => println!("stream ended: {:?}", outcome),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `kvstream-ebml`: EBML decoding, schema table, element trees and documents
//! - `kvstream-consumer`: fragment boundary detection and the consumption loop
//! - `kvstream-processor`: tags, tracks, frames, fragment files and images
//!
//! This crate re-exports the most commonly used types.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prelude;

pub use kvstream_ebml as ebml;

// Element model
pub use kvstream_ebml::{
    elements, Document, EbmlError, Element, ElementBody, ElementKind, ElementReader, Schema,
    TreeBuilder, Value,
};

// Stream consumption
pub use kvstream_consumer::{
    ByteSource, CallbackHandler, CancellationToken, ConsumerConfig, ConsumerError, ConsumerHandle,
    ConsumerStats, DetectorState, Fragment, FragmentDetector, FragmentHandler, IterSource,
    ReaderSource, StreamConsumer, StreamOutcome,
};

// Fragment processing
pub use kvstream_processor::{
    decode_frames, extract_frames, extract_tags, extract_track_descriptors,
    materialize_frames_as_images, save_fragment_as_file, tag_map, DecodedFrame, FragmentProcessor,
    FrameDecoder, FrameRecord, FrameSelection, Frames, ImageCrateDecoder, ImageFormat,
    ImageOptions, KinesisTags, PixelBuffer, ProcessorError, SampleRatio, TagRecord, TagTarget,
    TagValue, TrackDescriptor, TrackFilter, TrackType,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string.
pub fn version() -> &'static str {
    VERSION
}

/// Get build information.
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        target: std::env::consts::ARCH,
        os: std::env::consts::OS,
        debug: cfg!(debug_assertions),
    }
}

/// Build information.
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Library version.
    pub version: &'static str,
    /// Target architecture.
    pub target: &'static str,
    /// Operating system.
    pub os: &'static str,
    /// Debug build.
    pub debug: bool,
}
