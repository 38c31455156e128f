//! Fragment boundary detection.
//!
//! The detector buffers incoming bytes and drives an [`ElementReader`] over
//! them. A fragment is complete when the root element (Segment by default)
//! closes at the top level, either at its declared size or, for unknown-size
//! roots, when the next top-level header arrives. The bytes up to that point
//! (including any EBML header in front of the root) become one [`Fragment`];
//! bytes after it stay buffered for the next one.

use crate::config::ConsumerConfig;
use crate::error::ConsumerError;
use crate::Result;
use crate::fragment::Fragment;
use bytes::BytesMut;
use chrono::Utc;
use kvstream_ebml::{
    Document, EbmlError, ElementReader, ReadEvent, Schema, Step, TreeBuilder,
};
use std::sync::Arc;
use std::time::Instant;

/// Detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No root element header seen yet for the current fragment.
    AwaitingFragmentStart,
    /// Inside the root element, waiting for it to close.
    AccumulatingFragment,
}

/// Splits a byte stream into fragments.
#[derive(Debug)]
pub struct FragmentDetector {
    schema: Arc<Schema>,
    reader: ElementReader,
    buffer: BytesMut,
    state: DetectorState,
    root_id: u32,
    max_fragment_bytes: usize,
    stream_name: Arc<str>,
    stream_offset: u64,
    next_fragment_number: u64,
    first_byte_at: Option<Instant>,
}

impl FragmentDetector {
    /// Create a detector using the Matroska schema.
    pub fn new(config: &ConsumerConfig) -> Self {
        Self::with_schema(config, Schema::matroska_shared())
    }

    /// Create a detector with a custom schema.
    pub fn with_schema(config: &ConsumerConfig, schema: Arc<Schema>) -> Self {
        Self {
            reader: ElementReader::new(schema.clone()),
            schema,
            buffer: BytesMut::new(),
            state: DetectorState::AwaitingFragmentStart,
            root_id: config.root_element_id,
            max_fragment_bytes: config.max_fragment_bytes,
            stream_name: Arc::from(config.stream_name.as_str()),
            stream_offset: 0,
            next_fragment_number: 0,
            first_byte_at: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Bytes buffered for the pending fragment.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Stream offset of the first buffered byte.
    pub fn stream_offset(&self) -> u64 {
        self.stream_offset
    }

    /// Number of fragments emitted so far.
    pub fn fragments_emitted(&self) -> u64 {
        self.next_fragment_number
    }

    /// Append a chunk of stream bytes.
    pub fn feed(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        if self.buffer.is_empty() {
            self.first_byte_at = Some(Instant::now());
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete fragment from the buffered bytes, if any.
    ///
    /// Call repeatedly after each [`feed`](Self::feed): one chunk may
    /// complete several fragments.
    pub fn poll_fragment(&mut self) -> Result<Option<Fragment>> {
        self.advance(false)
    }

    /// Signal end of stream and return the next remaining fragment.
    ///
    /// Call until it returns `Ok(None)`. A partial fragment left in the
    /// buffer is reported as an error, never dropped.
    pub fn finish(&mut self) -> Result<Option<Fragment>> {
        self.advance(true)
    }

    fn advance(&mut self, end_of_stream: bool) -> Result<Option<Fragment>> {
        loop {
            let step = match self.reader.next_event(&self.buffer, end_of_stream) {
                Ok(step) => step,
                Err(e) if e.is_recoverable() => return Err(self.incomplete()),
                Err(e) => return Err(e.into()),
            };

            match step {
                Step::NeedMore => {
                    if self.buffer.len() > self.max_fragment_bytes {
                        return Err(ConsumerError::FragmentTooLarge {
                            limit: self.max_fragment_bytes,
                        });
                    }
                    return Ok(None);
                }
                Step::Finished => {
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    // Complete top-level elements but no root
                    return Err(ConsumerError::IncompleteFragment {
                        offset: self.stream_offset,
                        buffered: self.buffer.len(),
                    });
                }
                Step::Event(ReadEvent::Enter(start))
                    if start.depth == 0 && start.id == self.root_id =>
                {
                    tracing::trace!(
                        stream = %self.stream_name,
                        offset = self.stream_offset + start.offset,
                        "fragment root started"
                    );
                    self.state = DetectorState::AccumulatingFragment;
                }
                Step::Event(ReadEvent::Exit { start, end })
                    if start.depth == 0 && start.id == self.root_id =>
                {
                    return self.emit(end).map(Some);
                }
                Step::Event(_) => {}
            }
        }
    }

    fn incomplete(&self) -> ConsumerError {
        match self.reader.open_unknown_size() {
            Some(open) => ConsumerError::Ebml(EbmlError::UnresolvableUnknownSizeMaster {
                id: open.id,
                offset: self.stream_offset + open.offset,
            }),
            None => ConsumerError::IncompleteFragment {
                offset: self.stream_offset,
                buffered: self.buffer.len(),
            },
        }
    }

    fn emit(&mut self, end: u64) -> Result<Fragment> {
        let len = end as usize;
        if len > self.max_fragment_bytes {
            return Err(ConsumerError::FragmentTooLarge {
                limit: self.max_fragment_bytes,
            });
        }

        let raw = self.buffer.split_to(len).freeze();
        self.reader.reset(0);
        self.state = DetectorState::AwaitingFragmentStart;
        self.stream_offset += len as u64;

        let roots = TreeBuilder::new(self.schema.clone()).build(&raw)?;
        let document = Document::from_parts(self.schema.clone(), raw, roots);

        let now = Instant::now();
        let receive_duration = self
            .first_byte_at
            .map(|at| now.duration_since(at))
            .unwrap_or_default();
        self.first_byte_at = if self.buffer.is_empty() {
            None
        } else {
            Some(now)
        };

        let fragment = Fragment::new(
            document,
            self.next_fragment_number,
            self.stream_name.clone(),
            Utc::now(),
            receive_duration,
        );
        self.next_fragment_number += 1;

        tracing::debug!(
            stream = %self.stream_name,
            fragment = fragment.fragment_number(),
            bytes = len,
            "fragment complete"
        );
        Ok(fragment)
    }
}
