//! Element tree construction from reader events.

use crate::element::Element;
use crate::error::{EbmlError, Result};
use crate::reader::{ElementReader, ElementStart, ReadEvent, Step};
use crate::schema::Schema;
use bytes::Bytes;
use std::sync::Arc;

/// Builds [`Element`] trees over a complete byte range.
///
/// Masters are assembled on an explicit stack of open contexts; leaf payloads
/// are zero-copy slices of the input buffer.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    schema: Arc<Schema>,
    max_depth: Option<usize>,
}

struct OpenContext {
    start: ElementStart,
    children: Vec<Element>,
}

impl TreeBuilder {
    /// Create a builder for the given schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            max_depth: None,
        }
    }

    /// Limit master nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Parse every top-level element in `data`.
    ///
    /// `data` must be complete: unknown-size masters still open at the end
    /// close there, and any truncated element is an error.
    pub fn build(&self, data: &Bytes) -> Result<Vec<Element>> {
        let mut reader = ElementReader::new(self.schema.clone());
        if let Some(depth) = self.max_depth {
            reader = reader.with_max_depth(depth);
        }

        let mut stack: Vec<OpenContext> = Vec::new();
        let mut roots = Vec::new();

        loop {
            let element = match reader.next_event(data, true)? {
                Step::Event(ReadEvent::Enter(start)) => {
                    stack.push(OpenContext {
                        start,
                        children: Vec::new(),
                    });
                    continue;
                }
                Step::Event(ReadEvent::Leaf(start)) => {
                    let from = start.data_offset() as usize;
                    let to = from + start.size.unwrap_or(0) as usize;
                    Element::leaf(&start, data.slice(from..to))
                }
                Step::Event(ReadEvent::Exit { start, end }) => {
                    let open = stack.pop().ok_or_else(|| {
                        EbmlError::malformed(start.offset, "exit without matching enter")
                    })?;
                    Element::master(&open.start, end, open.children)
                }
                Step::Finished => break,
                Step::NeedMore => {
                    return Err(EbmlError::truncated(
                        reader.position(),
                        1,
                        0,
                    ))
                }
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None => roots.push(element),
            }
        }

        Ok(roots)
    }
}
