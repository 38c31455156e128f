//! Byte sources feeding the consumption loop.

use bytes::{Bytes, BytesMut};
use std::io::{self, ErrorKind, Read};

/// A sequential producer of byte chunks.
///
/// Chunks may have any size and arrive at any pace; `read_chunk` blocks until
/// data, end of stream or an error is available.
pub trait ByteSource {
    /// Next chunk, or `Ok(None)` at end of stream.
    fn read_chunk(&mut self) -> io::Result<Option<Bytes>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        (**self).read_chunk()
    }
}

/// Adapts any [`Read`] (HTTP body, socket, file) into a [`ByteSource`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReaderSource<R> {
    /// Read up to `chunk_size` bytes per chunk.
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Recover the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let mut buf = BytesMut::zeroed(self.chunk_size);
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf.freeze()));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// A source backed by an iterator of chunk results.
#[derive(Debug)]
pub struct IterSource<I> {
    chunks: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = io::Result<Bytes>>,
{
    /// Wrap an iterator of chunk results.
    pub fn new(chunks: I) -> Self {
        Self { chunks }
    }
}

impl IterSource<std::vec::IntoIter<io::Result<Bytes>>> {
    /// A source yielding the given chunks, then end of stream.
    pub fn from_chunks<B: Into<Bytes>>(chunks: impl IntoIterator<Item = B>) -> Self {
        let chunks: Vec<io::Result<Bytes>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        Self::new(chunks.into_iter())
    }
}

impl<I> ByteSource for IterSource<I>
where
    I: Iterator<Item = io::Result<Bytes>>,
{
    fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        self.chunks.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_source_chunks() {
        let mut source = ReaderSource::new(Cursor::new(vec![1u8; 10]), 4);
        let mut sizes = Vec::new();
        while let Some(chunk) = source.read_chunk().unwrap() {
            sizes.push(chunk.len());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_iter_source() {
        let mut source = IterSource::from_chunks(vec![vec![1u8, 2], vec![3]]);
        assert_eq!(source.read_chunk().unwrap().unwrap().as_ref(), &[1, 2]);
        assert_eq!(source.read_chunk().unwrap().unwrap().as_ref(), &[3]);
        assert!(source.read_chunk().unwrap().is_none());
    }

    #[test]
    fn test_iter_source_error() {
        let chunks = vec![
            Ok(Bytes::from_static(&[1])),
            Err(io::Error::new(ErrorKind::ConnectionReset, "reset")),
        ];
        let mut source: Box<dyn ByteSource> = Box::new(IterSource::new(chunks.into_iter()));
        assert!(source.read_chunk().unwrap().is_some());
        let err = source.read_chunk().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
    }
}
