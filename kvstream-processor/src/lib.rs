//! # kvstream-processor
//!
//! Post-processing for parsed Matroska fragments.
//!
//! ## Features
//!
//! - Tag extraction, including the Kinesis Video fragment metadata tags
//! - Track descriptors with codec ID and codec private data
//! - Lazy frame extraction with lacing expansion, track filtering and
//!   deterministic sampling
//! - Saving a fragment as a standalone `.mkv` file
//! - Decoding frames to pixels and writing them as PNG or JPEG images
//!
//! ## Example
//!
//! ```no_run
//! use kvstream_consumer::Fragment;
//! use kvstream_processor::{extract_frames, extract_tags, FrameSelection, SampleRatio};
//!
//! # fn main() -> kvstream_processor::Result<()> {
//! let data = std::fs::read("fragment.mkv").unwrap();
//! let fragment = Fragment::parse(data)?;
//!
//! for tag in extract_tags(&fragment)? {
//!     println!("{} = {}", tag.name, tag.value);
//! }
//!
//! let selection = FrameSelection::all()
//!     .with_tracks([1])
//!     .with_sample_ratio(SampleRatio::one_in(10)?);
//! for frame in extract_frames(&fragment, &selection)? {
//!     println!("track {} @ {} ns: {} bytes", frame.track_number, frame.timestamp, frame.payload.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
mod error;
mod file;
pub mod frames;
pub mod images;
mod processor;
pub mod tags;
pub mod tracks;

pub use block::{Block, BlockFlags};
pub use error::ProcessorError;
pub use file::save_fragment_as_file;
pub use frames::{extract_frames, FrameRecord, FrameSelection, Frames, SampleRatio, TrackFilter};
pub use images::{
    decode_frames, materialize_frames_as_images, DecodedFrame, FrameDecoder, ImageCrateDecoder,
    ImageFormat, ImageOptions, PixelBuffer,
};
pub use processor::FragmentProcessor;
pub use tags::{extract_tags, tag_map, KinesisTags, TagRecord, TagTarget, TagValue};
pub use tracks::{extract_track_descriptors, AudioSettings, TrackDescriptor, TrackType, VideoSettings};

/// Result type for fragment processing.
pub type Result<T> = std::result::Result<T, ProcessorError>;
