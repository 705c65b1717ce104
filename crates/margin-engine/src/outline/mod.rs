//! Heading outline: a numbered, collapsible forest derived from the document.
//!
//! Records live in an arena indexed by [`HeadingId`]; parents and children
//! refer to each other by id. Ids are ordinals among the headings at build
//! time, which is also what collapse state is keyed on across rebuilds.

mod build;
mod filter;

use std::collections::HashMap;
use std::fmt;

pub use build::{FlatHeading, MAX_HEADING_LEVEL, build_outline, clamp_level};
pub use filter::{OutlineNode, VisibleRow, flatten_visible};

use crate::editing::DocumentAdapter;

/// Ordinal position of a heading among all headings at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingId(pub usize);

impl fmt::Display for HeadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heading-{}", self.0)
    }
}

/// Whether hierarchical numbers ("1.2.1") are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Numbering {
    #[default]
    Shown,
    Hidden,
}

impl From<bool> for Numbering {
    fn from(show: bool) -> Self {
        if show {
            Numbering::Shown
        } else {
            Numbering::Hidden
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    pub id: HeadingId,
    /// Always within `1..=MAX_HEADING_LEVEL`
    pub level: u8,
    pub text: String,
    /// Document offset of the heading block
    pub offset: usize,
    /// Hierarchical number, empty when numbering is hidden
    pub number: String,
    pub parent: Option<HeadingId>,
    pub children: Vec<HeadingId>,
    pub collapsed: bool,
}

/// Collapse flags carried from one build to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseState(HashMap<HeadingId, bool>);

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: HeadingId, collapsed: bool) {
        self.0.insert(id, collapsed);
    }

    /// Unknown ids are expanded
    pub fn is_collapsed(&self, id: HeadingId) -> bool {
        self.0.get(&id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(HeadingId, bool)> for CollapseState {
    fn from_iter<T: IntoIterator<Item = (HeadingId, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OutlineError {
    #[error("outline was built for document version {built_at} but the document is at {current}")]
    StaleIndex { built_at: u64, current: u64 },
    #[error("outline view is not open")]
    Closed,
    #[error("no heading with id {0}")]
    UnknownHeading(HeadingId),
}

/// Heading forest for one document version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    records: Vec<HeadingRecord>,
    roots: Vec<HeadingId>,
    numbering: Numbering,
    /// Document version the headings were read from
    version: u64,
}

impl Outline {
    /// Build from the adapter's current headings and stamp the outline with
    /// the document version it reflects
    pub fn from_document<D: DocumentAdapter + ?Sized>(
        doc: &D,
        previous: &CollapseState,
        numbering: Numbering,
    ) -> Self {
        let headings = doc
            .nodes_in_order()
            .into_iter()
            .filter_map(FlatHeading::from_node);
        let mut outline = build_outline(headings, previous, numbering);
        outline.version = doc.version();
        outline
    }

    /// Rebuild against the document's current state, carrying collapse flags.
    ///
    /// When the document is exactly one edit ahead, each heading's offset is
    /// pushed through that edit and its flag follows it to whichever new
    /// heading starts there, so inserting or removing headings above a
    /// collapsed one does not move the flag. Otherwise flags are matched by
    /// ordinal id.
    pub fn rebuild<D: DocumentAdapter + ?Sized>(&self, doc: &D, numbering: Numbering) -> Self {
        if doc.version() != self.version + 1 {
            return Self::from_document(doc, &self.collapse_state(), numbering);
        }

        let carried: HashMap<usize, bool> = self
            .records
            .iter()
            .filter_map(|record| {
                let offset = doc.map_offset_through_last_edit(record.offset).offset()?;
                Some((offset, record.collapsed))
            })
            .collect();

        let mut outline = Self::from_document(doc, &CollapseState::new(), numbering);
        for record in &mut outline.records {
            if let Some(&collapsed) = carried.get(&record.offset) {
                record.collapsed = collapsed;
            }
        }
        outline
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn numbering(&self) -> Numbering {
        self.numbering
    }

    /// All records in document order (id order)
    pub fn records(&self) -> &[HeadingRecord] {
        &self.records
    }

    pub fn roots(&self) -> &[HeadingId] {
        &self.roots
    }

    pub fn get(&self, id: HeadingId) -> Option<&HeadingRecord> {
        self.records.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flip one heading's collapsed flag, returning the new value
    pub fn toggle_collapse(&mut self, id: HeadingId) -> Result<bool, OutlineError> {
        let record = self
            .records
            .get_mut(id.0)
            .ok_or(OutlineError::UnknownHeading(id))?;
        record.collapsed = !record.collapsed;
        Ok(record.collapsed)
    }

    pub fn set_collapsed(&mut self, id: HeadingId, collapsed: bool) -> Result<(), OutlineError> {
        let record = self
            .records
            .get_mut(id.0)
            .ok_or(OutlineError::UnknownHeading(id))?;
        record.collapsed = collapsed;
        Ok(())
    }

    /// Collapse flags of every record, for merging into the next build
    pub fn collapse_state(&self) -> CollapseState {
        self.records.iter().map(|r| (r.id, r.collapsed)).collect()
    }

    /// Walk the forest depth-first following child links
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            outline: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

pub struct Preorder<'a> {
    outline: &'a Outline,
    stack: Vec<HeadingId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a HeadingRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let record = self.outline.get(id)?;
        self.stack.extend(record.children.iter().rev().copied());
        Some(record)
    }
}
