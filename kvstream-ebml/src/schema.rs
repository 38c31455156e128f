//! Schema tables mapping element IDs to names, kinds and placement.
//!
//! The schema drives two decisions while reading: whether an element's
//! payload is parsed as children (master) or kept as a scalar, and where an
//! unknown-size master ends. An unknown-size master stays open while the next
//! ID is a valid child, a global element, or an ID the schema does not know.

use crate::elements;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Element value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Master element (contains other elements).
    Master,
    /// Unsigned integer.
    UnsignedInt,
    /// Signed integer.
    SignedInt,
    /// Floating point.
    Float,
    /// ASCII string.
    String,
    /// UTF-8 string.
    Utf8,
    /// Date (nanoseconds since 2001-01-01).
    Date,
    /// Binary data.
    Binary,
}

impl ElementKind {
    /// Check if this kind contains child elements.
    pub const fn is_master(self) -> bool {
        matches!(self, ElementKind::Master)
    }

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Master => "master",
            ElementKind::UnsignedInt => "unsigned integer",
            ElementKind::SignedInt => "signed integer",
            ElementKind::Float => "float",
            ElementKind::String => "string",
            ElementKind::Utf8 => "UTF-8 string",
            ElementKind::Date => "date",
            ElementKind::Binary => "binary",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an element may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Only at the top level of a stream.
    TopLevel,
    /// Anywhere, including inside any master (Void, CRC-32).
    Global,
    /// Only as a direct child of one of the listed masters.
    Within(&'static [u32]),
}

impl Placement {
    /// Parents listed for [`Placement::Within`], empty otherwise.
    pub fn parents(&self) -> &'static [u32] {
        match self {
            Placement::Within(parents) => parents,
            _ => &[],
        }
    }
}

/// Definition of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDef {
    /// The element ID, marker bits included.
    pub id: u32,
    /// Display name.
    pub name: &'static str,
    /// Value kind.
    pub kind: ElementKind,
    /// Allowed position in the tree.
    pub placement: Placement,
}

impl ElementDef {
    /// An element that only appears at the top level.
    pub const fn top_level(id: u32, name: &'static str, kind: ElementKind) -> Self {
        Self {
            id,
            name,
            kind,
            placement: Placement::TopLevel,
        }
    }

    /// An element valid inside any master.
    pub const fn global(id: u32, name: &'static str, kind: ElementKind) -> Self {
        Self {
            id,
            name,
            kind,
            placement: Placement::Global,
        }
    }

    /// An element valid inside the given masters.
    pub const fn within(
        id: u32,
        name: &'static str,
        kind: ElementKind,
        parents: &'static [u32],
    ) -> Self {
        Self {
            id,
            name,
            kind,
            placement: Placement::Within(parents),
        }
    }
}

/// A table of element definitions keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: String,
    elements: HashMap<u32, ElementDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: HashMap::new(),
        }
    }

    /// Create a schema from a table of definitions.
    pub fn from_defs(name: impl Into<String>, defs: &[ElementDef]) -> Self {
        let mut schema = Self::new(name);
        for def in defs {
            schema.insert(*def);
        }
        schema
    }

    /// The Matroska schema, including the EBML header.
    pub fn matroska() -> Self {
        Self::from_defs("matroska", elements::MATROSKA)
    }

    /// A process-wide shared copy of [`Schema::matroska`].
    pub fn matroska_shared() -> Arc<Schema> {
        static SHARED: OnceLock<Arc<Schema>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Schema::matroska())).clone()
    }

    /// Add a definition, replacing any previous one with the same ID.
    pub fn insert(&mut self, def: ElementDef) -> Option<ElementDef> {
        self.elements.insert(def.id, def)
    }

    /// Builder form of [`Schema::insert`].
    pub fn with(mut self, def: ElementDef) -> Self {
        self.insert(def);
        self
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of defined elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the schema defines no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up a definition.
    pub fn get(&self, id: u32) -> Option<&ElementDef> {
        self.elements.get(&id)
    }

    /// Check if the ID is defined.
    pub fn contains(&self, id: u32) -> bool {
        self.elements.contains_key(&id)
    }

    /// Element kind; undefined IDs are opaque binary.
    pub fn kind_of(&self, id: u32) -> ElementKind {
        self.get(id).map_or(ElementKind::Binary, |def| def.kind)
    }

    /// Element name, if defined.
    pub fn name_of(&self, id: u32) -> Option<&'static str> {
        self.get(id).map(|def| def.name)
    }

    /// Check if an element is a master element (container).
    pub fn is_master(&self, id: u32) -> bool {
        self.kind_of(id).is_master()
    }

    /// Whether `child` keeps an unknown-size `parent` open.
    ///
    /// Undefined IDs and global elements always do; top-level elements never
    /// do.
    pub fn accepts_child(&self, parent: u32, child: u32) -> bool {
        match self.get(child) {
            None => true,
            Some(def) => match def.placement {
                Placement::Global => true,
                Placement::TopLevel => false,
                Placement::Within(parents) => parents.contains(&parent),
            },
        }
    }
}
