//! Resumable, event-based element reader.
//!
//! [`ElementReader`] walks EBML data one header at a time and reports
//! [`ReadEvent`]s. It keeps an explicit stack of open masters instead of
//! recursing, so nesting depth in the input never grows the call stack.
//!
//! The reader never copies input. Each call receives the buffered bytes
//! (starting at the offset given to [`ElementReader::new`] or
//! [`ElementReader::reset`]) and a flag telling it whether more bytes can
//! still arrive. When the next header or leaf payload is incomplete and the
//! stream is still open it returns [`Step::NeedMore`] without changing state,
//! so the same call can be repeated once more data is buffered.

use crate::ebml::{ElementHeader, MAX_RECURSION_DEPTH};
use crate::error::{EbmlError, Result};
use crate::schema::{ElementKind, Schema};
use std::sync::Arc;

/// A decoded element header with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementStart {
    /// The element ID.
    pub id: u32,
    /// Kind from the schema (undefined IDs are binary).
    pub kind: ElementKind,
    /// Absolute offset of the first ID byte.
    pub offset: u64,
    /// Header size in bytes.
    pub header_size: usize,
    /// Declared payload size; `None` for unknown size.
    pub size: Option<u64>,
    /// Number of masters enclosing this element.
    pub depth: usize,
}

impl ElementStart {
    /// Absolute offset of the first payload byte.
    pub fn data_offset(&self) -> u64 {
        self.offset + self.header_size as u64
    }

    /// Absolute end offset, if the size is known.
    pub fn end(&self) -> Option<u64> {
        self.size.map(|size| self.data_offset() + size)
    }
}

/// Events produced by [`ElementReader::next_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEvent {
    /// A master element was opened; its children follow.
    Enter(ElementStart),
    /// A non-master element whose payload is fully buffered.
    Leaf(ElementStart),
    /// A master element closed at absolute offset `end`.
    Exit {
        /// The master that closed.
        start: ElementStart,
        /// Absolute offset one past its last byte.
        end: u64,
    },
}

/// Outcome of one reader step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An element event.
    Event(ReadEvent),
    /// More bytes are needed before anything else can be reported.
    NeedMore,
    /// End of stream reached with every master closed.
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct OpenMaster {
    start: ElementStart,
    end: Option<u64>,
}

/// Streaming EBML element reader.
#[derive(Debug, Clone)]
pub struct ElementReader {
    schema: Arc<Schema>,
    base: u64,
    position: u64,
    stack: Vec<OpenMaster>,
    max_depth: usize,
}

impl ElementReader {
    /// Create a reader whose input starts at absolute offset 0.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            base: 0,
            position: 0,
            stack: Vec::new(),
            max_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Set the maximum master nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The schema in use.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Absolute offset of the first byte of the buffer passed to `next_event`.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Number of currently open masters.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The outermost open master of unknown size, if any.
    pub fn open_unknown_size(&self) -> Option<&ElementStart> {
        self.stack
            .iter()
            .find(|open| open.end.is_none())
            .map(|open| &open.start)
    }

    /// The outermost open master, if any.
    pub fn outermost(&self) -> Option<&ElementStart> {
        self.stack.first().map(|open| &open.start)
    }

    /// Drop all open masters and restart at absolute offset `base`.
    pub fn reset(&mut self, base: u64) {
        self.base = base;
        self.position = base;
        self.stack.clear();
    }

    /// Tightest known end among the open masters.
    fn bound(&self) -> Option<u64> {
        self.stack.iter().rev().find_map(|open| open.end)
    }

    fn close_top(&mut self) -> Result<Step> {
        let open = self
            .stack
            .pop()
            .ok_or_else(|| EbmlError::malformed(self.position, "no open master to close"))?;
        if open.end.is_none() {
            tracing::trace!(
                id = open.start.id,
                offset = open.start.offset,
                end = self.position,
                "resolved unknown-size master"
            );
        }
        Ok(Step::Event(ReadEvent::Exit {
            start: open.start,
            end: self.position,
        }))
    }

    /// Advance by one event.
    ///
    /// `data` holds the buffered input starting at [`ElementReader::base`].
    /// `end_of_stream` signals that no bytes will follow `data`.
    pub fn next_event(&mut self, data: &[u8], end_of_stream: bool) -> Result<Step> {
        let available_end = self.base + data.len() as u64;

        // Close masters whose end has been reached
        if let Some(top) = self.stack.last() {
            let at_own_end = top.end == Some(self.position);
            let at_parent_end = top.end.is_none() && self.bound() == Some(self.position);
            if at_own_end || at_parent_end {
                return self.close_top();
            }
        }

        if self.position >= available_end {
            if !end_of_stream {
                return Ok(Step::NeedMore);
            }
            return match self.stack.last() {
                None => Ok(Step::Finished),
                Some(top) if top.end.is_none() => self.close_top(),
                Some(top) => Err(EbmlError::truncated(
                    top.start.offset,
                    top.end.unwrap_or(self.position) - top.start.offset,
                    self.position - top.start.offset,
                )),
            };
        }

        let rel = (self.position - self.base) as usize;
        let header = match ElementHeader::read(&data[rel..], self.position) {
            Ok(header) => header,
            Err(e) if e.is_recoverable() && !end_of_stream => return Ok(Step::NeedMore),
            Err(e) => return Err(e),
        };

        // A header that cannot be a child ends an unknown-size master; it is
        // left unread for the enclosing level.
        if let Some(top) = self.stack.last() {
            if top.end.is_none() && !self.schema.accepts_child(top.start.id, header.id) {
                return self.close_top();
            }
        }

        let start = ElementStart {
            id: header.id,
            kind: self.schema.kind_of(header.id),
            offset: self.position,
            header_size: header.header_size,
            size: header.size,
            depth: self.stack.len(),
        };

        if start.size.is_none() && !start.kind.is_master() {
            return Err(EbmlError::UnknownSizeNotAllowed {
                id: start.id,
                offset: start.offset,
            });
        }

        let end = match start.size {
            Some(size) => Some(start.data_offset().checked_add(size).ok_or_else(|| {
                EbmlError::malformed(start.offset, "element size overflows offset range")
            })?),
            None => None,
        };

        if let Some(parent_end) = self.bound() {
            if end.unwrap_or_else(|| start.data_offset()) > parent_end {
                return Err(EbmlError::ChildOverrun {
                    id: start.id,
                    offset: start.offset,
                    parent_end,
                });
            }
        }

        if start.kind.is_master() {
            if self.stack.len() >= self.max_depth {
                return Err(EbmlError::NestingTooDeep {
                    depth: self.stack.len(),
                });
            }
            self.position = start.data_offset();
            self.stack.push(OpenMaster { start, end });
            return Ok(Step::Event(ReadEvent::Enter(start)));
        }

        let end = end.unwrap_or_else(|| start.data_offset());
        if end > available_end {
            if end_of_stream {
                return Err(EbmlError::truncated(
                    start.offset,
                    end - start.offset,
                    available_end - start.offset,
                ));
            }
            return Ok(Step::NeedMore);
        }

        self.position = end;
        Ok(Step::Event(ReadEvent::Leaf(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebml::{encode_element, encode_unknown_size_element};
    use crate::elements::*;

    fn events(data: &[u8]) -> Result<Vec<ReadEvent>> {
        let mut reader = ElementReader::new(Schema::matroska_shared());
        let mut out = Vec::new();
        loop {
            match reader.next_event(data, true)? {
                Step::Event(event) => out.push(event),
                Step::Finished => return Ok(out),
                Step::NeedMore => unreachable!("end of stream was signalled"),
            }
        }
    }

    fn kinds(events: &[ReadEvent]) -> Vec<(char, u32)> {
        events
            .iter()
            .map(|e| match e {
                ReadEvent::Enter(s) => ('>', s.id),
                ReadEvent::Leaf(s) => ('.', s.id),
                ReadEvent::Exit { start, .. } => ('<', start.id),
            })
            .collect()
    }

    #[test]
    fn test_known_size_tree() {
        let cluster = encode_element(CLUSTER, &encode_element(TIMESTAMP, &[0x05]));
        let data = encode_element(SEGMENT, &cluster);
        let events = events(&data).unwrap();
        assert_eq!(
            kinds(&events),
            vec![
                ('>', SEGMENT),
                ('>', CLUSTER),
                ('.', TIMESTAMP),
                ('<', CLUSTER),
                ('<', SEGMENT)
            ]
        );
    }

    #[test]
    fn test_unknown_size_cluster_closes_before_sibling() {
        let first = encode_unknown_size_element(CLUSTER, &encode_element(TIMESTAMP, &[1]));
        let second = encode_element(CLUSTER, &encode_element(TIMESTAMP, &[2]));
        let mut body = first.clone();
        body.extend_from_slice(&second);
        let data = encode_unknown_size_element(SEGMENT, &body);

        let events = events(&data).unwrap();
        let exit = events
            .iter()
            .find_map(|e| match e {
                ReadEvent::Exit { start, end } if start.id == CLUSTER && start.size.is_none() => {
                    Some((*start, *end))
                }
                _ => None,
            })
            .unwrap();
        // Segment header is 12 bytes
        assert_eq!(exit.0.offset, 12);
        assert_eq!(exit.1, 12 + first.len() as u64);
    }

    #[test]
    fn test_unknown_id_kept_inside_unknown_size_master() {
        let mut body = encode_element(TIMESTAMP, &[1]);
        body.extend_from_slice(&encode_element(0x4F4F, &[9, 9]));
        body.extend_from_slice(&encode_element(SIMPLE_BLOCK, &[0x81, 0, 0, 0x80]));
        let data = encode_unknown_size_element(CLUSTER, &body);

        let events = events(&data).unwrap();
        assert_eq!(
            kinds(&events),
            vec![
                ('>', CLUSTER),
                ('.', TIMESTAMP),
                ('.', 0x4F4F),
                ('.', SIMPLE_BLOCK),
                ('<', CLUSTER)
            ]
        );
    }

    #[test]
    fn test_need_more_is_resumable() {
        let data = encode_element(SEGMENT, &encode_element(TIMESTAMP_SCALE, &[0x0F, 0x42, 0x40]));
        let mut reader = ElementReader::new(Schema::matroska_shared());

        assert_eq!(reader.next_event(&data[..3], false).unwrap(), Step::NeedMore);
        assert_eq!(reader.position(), 0);

        let step = reader.next_event(&data[..7], false).unwrap();
        assert!(matches!(step, Step::Event(ReadEvent::Enter(s)) if s.id == SEGMENT));

        // Leaf payload incomplete
        assert_eq!(reader.next_event(&data[..9], false).unwrap(), Step::NeedMore);
        let step = reader.next_event(&data, false).unwrap();
        assert!(matches!(step, Step::Event(ReadEvent::Leaf(s)) if s.id == TIMESTAMP_SCALE));
    }

    #[test]
    fn test_zero_lead_byte_is_malformed() {
        let err = events(&[0x00, 0x81]).unwrap_err();
        assert!(matches!(err, EbmlError::MalformedHeader { offset: 0, .. }));
    }

    #[test]
    fn test_truncated_at_end_of_stream() {
        let data = encode_element(SEGMENT, &encode_element(TIMESTAMP_SCALE, &[1, 2, 3]));
        let err = events(&data[..data.len() - 1]).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_child_overrun() {
        // Segment claims 3 bytes but holds a 4-byte child
        let mut data = vec![0x18, 0x53, 0x80, 0x67, 0x83];
        data.extend_from_slice(&encode_element(TIMESTAMP_SCALE, &[1]));
        let err = events(&data).unwrap_err();
        assert!(matches!(err, EbmlError::ChildOverrun { id: TIMESTAMP_SCALE, .. }));
    }

    #[test]
    fn test_unknown_size_leaf_rejected() {
        let data = [0xE7, 0xFF];
        let err = events(&data).unwrap_err();
        assert!(matches!(err, EbmlError::UnknownSizeNotAllowed { id: TIMESTAMP, .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let inner = encode_element(SIMPLE_TAG, &encode_element(SIMPLE_TAG, &[]));
        let data = encode_element(TAG, &inner);
        let mut reader = ElementReader::new(Schema::matroska_shared()).with_max_depth(2);
        let mut result = Ok(Step::NeedMore);
        for _ in 0..4 {
            result = reader.next_event(&data, true);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(EbmlError::NestingTooDeep { depth: 2 })));
    }

    #[test]
    fn test_unknown_size_master_closes_at_parent_end() {
        let cluster = encode_unknown_size_element(CLUSTER, &encode_element(TIMESTAMP, &[1]));
        let mut data = encode_element(SEGMENT, &cluster);
        data.extend_from_slice(&encode_element(VOID, &[0]));

        let events = events(&data).unwrap();
        assert_eq!(
            kinds(&events),
            vec![
                ('>', SEGMENT),
                ('>', CLUSTER),
                ('.', TIMESTAMP),
                ('<', CLUSTER),
                ('<', SEGMENT),
                ('.', VOID)
            ]
        );
    }

    #[test]
    fn test_open_unknown_size() {
        let data = encode_unknown_size_element(SEGMENT, &encode_unknown_size_element(CLUSTER, &[]));
        let mut reader = ElementReader::new(Schema::matroska_shared());
        reader.next_event(&data, false).unwrap();
        reader.next_event(&data, false).unwrap();
        assert_eq!(reader.depth(), 2);
        assert_eq!(reader.open_unknown_size().map(|s| s.id), Some(SEGMENT));

        reader.reset(100);
        assert_eq!(reader.depth(), 0);
        assert_eq!(reader.position(), 100);
        assert!(reader.open_unknown_size().is_none());
    }
}
