use crate::editing::Patch;

/// What kind of block a [`DocumentNode`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Heading with its level as reported by the document engine.
    ///
    /// Nothing guarantees the level is in `1..=6`; consumers clamp.
    Heading { level: u8 },
    /// Any other block (paragraph, list, code, quote, ...)
    Other,
}

/// A block of the document as seen by derived views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub kind: NodeKind,
    /// Display text without Markdown syntax
    pub text: String,
    /// Byte offset of the block start in the document
    pub offset: usize,
}

impl DocumentNode {
    pub fn heading(level: u8, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind: NodeKind::Heading { level },
            text: text.into(),
            offset,
        }
    }

    pub fn other(text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind: NodeKind::Other,
            text: text.into(),
            offset,
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading { level } => Some(level),
            NodeKind::Other => None,
        }
    }
}

/// Screen position of a document offset, in units chosen by the adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Same point moved down by `dy`
    pub fn below(self, dy: i32) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_add(dy),
        }
    }
}

/// Result of pushing a pre-edit offset through the most recent edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedOffset {
    Mapped(usize),
    /// The offset sat inside a span removed by the edit
    Deleted,
}

impl MappedOffset {
    pub fn offset(self) -> Option<usize> {
        match self {
            MappedOffset::Mapped(offset) => Some(offset),
            MappedOffset::Deleted => None,
        }
    }
}

/// Capabilities the derived views need from a document engine.
///
/// Any rich-text engine that can answer these questions can back a
/// [`Session`](crate::session::Session). Every committed mutation must bump
/// [`version`](DocumentAdapter::version) by exactly one, and
/// [`map_offset_through_last_edit`](DocumentAdapter::map_offset_through_last_edit)
/// must describe that mutation until the next one is committed.
///
/// None of these calls may call back into the session.
pub trait DocumentAdapter {
    /// Blocks in document order
    fn nodes_in_order(&self) -> Vec<DocumentNode>;

    /// Plain-text projection of the whole document
    fn plain_text(&self) -> String;

    fn cursor_offset(&self) -> usize;

    fn screen_coordinates_of(&self, offset: usize) -> ScreenPoint;

    /// Move the caret. Not a mutation: the version is unchanged.
    fn set_cursor(&mut self, offset: usize);

    fn scroll_into_view(&mut self, offset: usize);

    /// Insert `text` at the caret as one mutation (one undo unit)
    fn insert_at_cursor(&mut self, text: &str) -> Patch;

    fn map_offset_through_last_edit(&self, offset: usize) -> MappedOffset;

    /// Number of committed mutations so far
    fn version(&self) -> u64;
}
