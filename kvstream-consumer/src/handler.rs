//! Callbacks invoked by the consumption loop.

use crate::error::ConsumerError;
use crate::fragment::Fragment;

/// Receives fragments and the terminal stream event.
///
/// `on_fragment_arrived` runs on the consumer thread and blocks it: no more
/// bytes are read until it returns. Exactly one of
/// `on_stream_read_complete` / `on_stream_read_exception` is called per run.
pub trait FragmentHandler {
    /// A complete fragment, in stream order.
    fn on_fragment_arrived(&mut self, fragment: Fragment);

    /// The stream ended normally or the consumer was cancelled.
    fn on_stream_read_complete(&mut self, _stream_name: &str) {}

    /// The stream stopped on an unrecoverable error.
    fn on_stream_read_exception(&mut self, _stream_name: &str, _error: &ConsumerError) {}
}

type CompleteFn = Box<dyn FnMut(&str) + Send>;
type ExceptionFn = Box<dyn FnMut(&str, &ConsumerError) + Send>;

/// A [`FragmentHandler`] built from closures.
pub struct CallbackHandler<F> {
    on_fragment: F,
    on_complete: Option<CompleteFn>,
    on_exception: Option<ExceptionFn>,
}

impl<F> CallbackHandler<F>
where
    F: FnMut(Fragment),
{
    /// Handle fragments with `on_fragment`.
    pub fn new(on_fragment: F) -> Self {
        Self {
            on_fragment,
            on_complete: None,
            on_exception: None,
        }
    }

    /// Called when the stream completes.
    pub fn on_complete(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called when the stream fails.
    pub fn on_exception(
        mut self,
        f: impl FnMut(&str, &ConsumerError) + Send + 'static,
    ) -> Self {
        self.on_exception = Some(Box::new(f));
        self
    }
}

impl<F> FragmentHandler for CallbackHandler<F>
where
    F: FnMut(Fragment),
{
    fn on_fragment_arrived(&mut self, fragment: Fragment) {
        (self.on_fragment)(fragment)
    }

    fn on_stream_read_complete(&mut self, stream_name: &str) {
        if let Some(f) = self.on_complete.as_mut() {
            f(stream_name)
        }
    }

    fn on_stream_read_exception(&mut self, stream_name: &str, error: &ConsumerError) {
        if let Some(f) = self.on_exception.as_mut() {
            f(stream_name, error)
        }
    }
}

impl<H: FragmentHandler + ?Sized> FragmentHandler for Box<H> {
    fn on_fragment_arrived(&mut self, fragment: Fragment) {
        (**self).on_fragment_arrived(fragment)
    }

    fn on_stream_read_complete(&mut self, stream_name: &str) {
        (**self).on_stream_read_complete(stream_name)
    }

    fn on_stream_read_exception(&mut self, stream_name: &str, error: &ConsumerError) {
        (**self).on_stream_read_exception(stream_name, error)
    }
}
