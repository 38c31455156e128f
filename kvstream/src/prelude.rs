//! Prelude module for convenient imports.
//!
//! ```rust
//! use kvstream::prelude::*;
//! ```

// Errors
pub use crate::{ConsumerError, EbmlError, ProcessorError};

// Element model
pub use crate::{Document, Element, ElementKind, Schema};

// Stream consumption
pub use crate::{
    ByteSource, CallbackHandler, CancellationToken, ConsumerConfig, ConsumerHandle, Fragment,
    FragmentHandler, ReaderSource, StreamConsumer, StreamOutcome,
};

// Fragment processing
pub use crate::{
    FragmentProcessor, FrameDecoder, FrameRecord, FrameSelection, ImageFormat, ImageOptions,
    KinesisTags, SampleRatio, TagRecord, TagValue, TrackDescriptor, TrackFilter,
};
