//! The stream consumption loop.

use crate::config::ConsumerConfig;
use crate::detector::FragmentDetector;
use crate::error::ConsumerError;
use crate::Result;
use crate::fragment::Fragment;
use crate::handler::FragmentHandler;
use crate::source::ByteSource;
use kvstream_ebml::Schema;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Shared flag requesting the loop to stop.
///
/// Checked before each read and before each fragment delivery; a read that
/// is already blocked finishes first.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a consumer run ended.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The source reached end of stream and every fragment was delivered.
    Completed,
    /// Cancellation was requested; a partially buffered fragment was dropped.
    Cancelled,
    /// An unrecoverable error stopped the stream.
    Failed(ConsumerError),
}

impl StreamOutcome {
    /// Check if the run ended without error.
    pub fn is_success(&self) -> bool {
        !matches!(self, StreamOutcome::Failed(_))
    }

    /// The error, if the run failed.
    pub fn error(&self) -> Option<&ConsumerError> {
        match self {
            StreamOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Counters updated by the consumption loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Chunks read from the source
    pub chunks_read: u64,
    /// Bytes read from the source
    pub bytes_read: u64,
    /// Fragments handed to the handler
    pub fragments_delivered: u64,
}

/// Pulls bytes from a source, splits them into fragments and hands each one
/// to a [`FragmentHandler`].
pub struct StreamConsumer<S, H> {
    config: ConsumerConfig,
    schema: Arc<Schema>,
    source: S,
    handler: H,
    cancel: CancellationToken,
    stats: Arc<Mutex<ConsumerStats>>,
}

impl<S, H> StreamConsumer<S, H>
where
    S: ByteSource,
    H: FragmentHandler,
{
    /// Create a consumer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ConsumerConfig, source: S, handler: H) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            schema: Schema::matroska_shared(),
            source,
            handler,
            cancel: CancellationToken::new(),
            stats: Arc::new(Mutex::new(ConsumerStats::default())),
        })
    }

    /// Use a custom schema.
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = schema;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The token that stops this consumer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The configuration.
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Run the loop on the calling thread until the stream ends, fails or
    /// is cancelled. Exactly one terminal callback fires.
    pub fn run(mut self) -> StreamOutcome {
        let stream = self.config.stream_name.clone();
        tracing::info!(stream = %stream, "starting stream consumer");

        match self.consume() {
            Ok(outcome) => {
                let stats = *self.stats.lock();
                tracing::info!(
                    stream = %stream,
                    fragments = stats.fragments_delivered,
                    bytes = stats.bytes_read,
                    cancelled = matches!(outcome, StreamOutcome::Cancelled),
                    "stream consumer finished"
                );
                self.handler.on_stream_read_complete(&stream);
                outcome
            }
            Err(error) => {
                tracing::warn!(stream = %stream, error = %error, "stream consumer failed");
                self.handler.on_stream_read_exception(&stream, &error);
                StreamOutcome::Failed(error)
            }
        }
    }

    fn consume(&mut self) -> Result<StreamOutcome> {
        let mut detector = FragmentDetector::with_schema(&self.config, self.schema.clone());

        loop {
            if self.cancel.is_cancelled() {
                return Ok(StreamOutcome::Cancelled);
            }

            match self.source.read_chunk().map_err(ConsumerError::Read)? {
                Some(chunk) => {
                    {
                        let mut stats = self.stats.lock();
                        stats.chunks_read += 1;
                        stats.bytes_read += chunk.len() as u64;
                    }
                    tracing::trace!(
                        stream = %self.config.stream_name,
                        bytes = chunk.len(),
                        buffered = detector.buffered(),
                        "chunk received"
                    );
                    detector.feed(&chunk);
                    while let Some(fragment) = detector.poll_fragment()? {
                        if self.cancel.is_cancelled() {
                            return Ok(StreamOutcome::Cancelled);
                        }
                        self.deliver(fragment);
                    }
                }
                None => {
                    while let Some(fragment) = detector.finish()? {
                        if self.cancel.is_cancelled() {
                            return Ok(StreamOutcome::Cancelled);
                        }
                        self.deliver(fragment);
                    }
                    return Ok(StreamOutcome::Completed);
                }
            }
        }
    }

    fn deliver(&mut self, fragment: Fragment) {
        tracing::debug!(
            stream = %self.config.stream_name,
            fragment = fragment.fragment_number(),
            bytes = fragment.len(),
            receive_ms = fragment.receive_duration().as_millis() as u64,
            "delivering fragment"
        );
        self.handler.on_fragment_arrived(fragment);
        self.stats.lock().fragments_delivered += 1;
    }
}

impl<S, H> StreamConsumer<S, H>
where
    S: ByteSource + Send + 'static,
    H: FragmentHandler + Send + 'static,
{
    /// Run the loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(self) -> Result<ConsumerHandle> {
        let cancel = self.cancel.clone();
        let stats = self.stats.clone();
        let stream_name = self.config.stream_name.clone();

        let thread = thread::Builder::new()
            .name(format!("kvstream-{}", stream_name))
            .spawn(move || self.run())
            .map_err(ConsumerError::Spawn)?;

        Ok(ConsumerHandle {
            thread,
            cancel,
            stats,
            stream_name,
        })
    }
}

/// Handle to a consumer running on its own thread.
#[derive(Debug)]
pub struct ConsumerHandle {
    thread: JoinHandle<StreamOutcome>,
    cancel: CancellationToken,
    stats: Arc<Mutex<ConsumerStats>>,
    stream_name: String,
}

impl ConsumerHandle {
    /// Request the consumer to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if the consumer thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Snapshot of the loop counters.
    pub fn stats(&self) -> ConsumerStats {
        *self.stats.lock()
    }

    /// Name of the consumed stream.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Wait for the consumer to exit.
    pub fn join(self) -> StreamOutcome {
        self.thread
            .join()
            .unwrap_or(StreamOutcome::Failed(ConsumerError::ThreadPanicked))
    }
}
