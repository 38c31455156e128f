//! Parsed documents.

use crate::builder::TreeBuilder;
use crate::element::Element;
use crate::elements::{DOC_TYPE, EBML, SEGMENT};
use crate::error::Result;
use crate::schema::Schema;
use bytes::Bytes;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// A parsed element tree together with its source bytes and schema.
#[derive(Debug, Clone)]
pub struct Document {
    schema: Arc<Schema>,
    data: Bytes,
    roots: Vec<Element>,
}

impl Document {
    /// Parse a complete byte buffer.
    pub fn parse(schema: Arc<Schema>, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let roots = TreeBuilder::new(schema.clone()).build(&data)?;
        Ok(Self {
            schema,
            data,
            roots,
        })
    }

    /// Parse with the shared Matroska schema.
    pub fn parse_matroska(data: impl Into<Bytes>) -> Result<Self> {
        Self::parse(Schema::matroska_shared(), data)
    }

    /// Read and parse a file.
    pub fn from_file(schema: Arc<Schema>, path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(schema, data)
    }

    /// Assemble a document from an already built tree.
    pub fn from_parts(schema: Arc<Schema>, data: Bytes, roots: Vec<Element>) -> Self {
        Self {
            schema,
            data,
            roots,
        }
    }

    /// The schema used for parsing.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Source bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Number of source bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the document has no source bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Top-level elements in stream order.
    pub fn roots(&self) -> &[Element] {
        &self.roots
    }

    /// First top-level element with `id`.
    pub fn root(&self, id: u32) -> Option<&Element> {
        self.roots.iter().find(|e| e.id() == id)
    }

    /// The Matroska Segment, if present at the top level.
    pub fn segment(&self) -> Option<&Element> {
        self.root(SEGMENT)
    }

    /// DocType from the EBML header ("matroska", "webm").
    pub fn doc_type(&self) -> Option<&str> {
        self.root(EBML)?.child_str(DOC_TYPE).ok().flatten()
    }

    /// Depth-first, pre-order traversal yielding `(depth, element)`.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self.roots.iter())],
        }
    }

    /// Every element with `id`, in document order.
    pub fn find_all(&self, id: u32) -> impl Iterator<Item = &Element> + '_ {
        self.walk().map(|(_, e)| e).filter(move |e| e.id() == id)
    }

    /// First element with `id`, in document order.
    pub fn find(&self, id: u32) -> Option<&Element> {
        self.find_all(id).next()
    }

    /// Display name of an element ID.
    pub fn name_of(&self, id: u32) -> &'static str {
        self.schema.name_of(id).unwrap_or("Unknown")
    }

    /// Same element IDs, kinds and payloads, in the same order.
    pub fn same_structure(&self, other: &Document) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(&other.roots)
                .all(|(a, b)| a.same_structure(b))
    }

    /// Render the tree as an indented table.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Offset   Size Element (ID): Value");
        let _ = writeln!(out, "====== ====== =================================");
        for (depth, element) in self.walk() {
            let value = match element.value() {
                Ok(value) => value.to_string(),
                Err(e) => format!("<{}>", e),
            };
            let _ = writeln!(
                out,
                "{:>6} {:>6} {:indent$}{} (ID 0x{:X}): {}",
                element.offset(),
                element.total_size(),
                "",
                self.name_of(element.id()),
                element.id(),
                value,
                indent = depth * 2,
            );
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

/// Iterator returned by [`Document::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<(usize, std::slice::Iter<'a, Element>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (depth, iter) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(element) => {
                    if !element.children().is_empty() {
                        self.stack.push((depth + 1, element.children().iter()));
                    }
                    return Some((depth, element));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
