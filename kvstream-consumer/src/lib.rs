//! Streaming fragment consumer for live Matroska streams
//!
//! This crate turns an incoming byte stream (for example the body of a
//! Kinesis Video `GetMedia` response) into a sequence of complete
//! [`Fragment`]s and hands them to a [`FragmentHandler`], one at a time, on
//! a dedicated thread.
//!
//! ## Example
//!
//! ```no_run
//! use kvstream_consumer::{CallbackHandler, ConsumerConfig, ReaderSource, StreamConsumer};
//!
//! let file = std::fs::File::open("stream.mkv").unwrap();
//! let config = ConsumerConfig::new("front-door");
//! let source = ReaderSource::new(file, config.read_chunk_size);
//! let handler = CallbackHandler::new(|fragment| {
//!     println!("fragment {} ({} bytes)", fragment.fragment_number(), fragment.len());
//! })
//! .on_exception(|stream, error| eprintln!("{}: {}", stream, error));
//!
//! let handle = StreamConsumer::new(config, source, handler).unwrap().spawn().unwrap();
//! let outcome = handle.join();
//! assert!(outcome.is_success());
//! ```
//!
//! ## Backpressure
//!
//! Fragment delivery is synchronous: the loop does not read more bytes until
//! `on_fragment_arrived` returns, so a slow handler throttles consumption
//! instead of growing a queue. Memory is bounded by
//! [`ConsumerConfig::max_fragment_bytes`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod consumer;
mod detector;
mod error;
mod fragment;
mod handler;
mod source;

pub use config::*;
pub use consumer::{
    CancellationToken, ConsumerHandle, ConsumerStats, StreamConsumer, StreamOutcome,
};
pub use detector::{DetectorState, FragmentDetector};
pub use error::*;
pub use fragment::Fragment;
pub use handler::{CallbackHandler, FragmentHandler};
pub use source::{ByteSource, IterSource, ReaderSource};

/// Result type for consumer operations
pub type Result<T> = std::result::Result<T, ConsumerError>;
