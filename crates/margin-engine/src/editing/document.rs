use std::borrow::Cow;
use std::ops::Range;

use tree_sitter::{InputEdit, Parser, Point, Tree};
use tree_sitter_md::LANGUAGE;
use xi_rope::{Delta, Rope, RopeInfo, delta::DeltaElement};

use crate::editing::{
    Cmd, DocumentAdapter, DocumentNode, MappedOffset, Patch, ScreenPoint, commands, mapping,
    nodes,
};

/// Reference document engine backing a [`Session`](crate::session::Session)
///
/// ## Storage
/// - The whole Markdown source lives in one `xi_rope::Rope`; `to_bytes()`
///   returns it unchanged
/// - Every edit is a [`Cmd`] compiled to a single `Delta`, so one command is one
///   mutation and one version bump
///
/// ## Parsing
/// - `tree-sitter-md` parses the block structure; after each edit the old tree
///   is told about the changed span via `tree.edit()` and re-parsed
///   incrementally
/// - [`nodes_in_order`](DocumentAdapter::nodes_in_order) flattens the tree into
///   headings and other blocks
///
/// ## Offset mapping
/// - The delta of the last edit is kept so anchors from the previous version
///   can be pushed through it with
///   [`map_offset_through_last_edit`](DocumentAdapter::map_offset_through_last_edit)
///
/// ```rust
/// # use margin_engine::editing::{Cmd, Document, DocumentAdapter, MappedOffset};
/// let mut doc = Document::from_bytes(b"# Title\n\nbody").unwrap();
/// doc.apply(Cmd::InsertText { at: 0, text: "> ".to_string() });
///
/// assert_eq!(doc.version(), 1);
/// assert_eq!(doc.map_offset_through_last_edit(2), MappedOffset::Mapped(4));
/// ```
pub struct Document {
    pub(crate) buffer: Rope,
    /// Caret/selection as byte offsets into `buffer`
    pub(crate) selection: Range<usize>,
    /// Incremented once per applied command
    pub(crate) version: u64,
    pub(crate) parser: Parser,
    pub(crate) tree: Option<Tree>,
    /// Delta of the most recent command, `None` before the first edit
    pub(crate) last_delta: Option<Delta<RopeInfo>>,
    /// Offset the host was last asked to bring into view
    pub(crate) scroll_anchor: Option<usize>,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        let mut parser = Parser::new();
        parser.set_language(&LANGUAGE.into())?;
        let tree = parser.parse(text, None);

        Ok(Self {
            buffer,
            selection: len..len, // Start with cursor at end
            version: 0,
            parser,
            tree,
            last_delta: None,
            scroll_anchor: None,
        })
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Apply a command as one committed mutation.
    ///
    /// The old parse tree is edited with the changed span *before* re-parsing so
    /// tree-sitter can reuse unchanged subtrees.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let delta = commands::compile_command(self, &cmd);
        let new_selection = commands::transform_selection_for_command(self, &cmd);
        let changed = inserted_ranges(&delta);

        let new_buffer = delta.apply(&self.buffer);
        let new_text = new_buffer.to_string();

        match self.tree.take() {
            Some(mut old_tree) => {
                let old_text = self.buffer.to_string();
                if let Some(edit) = input_edit_for(&delta, &old_text, &new_text) {
                    old_tree.edit(&edit);
                }
                self.tree = self.parser.parse(&new_text, Some(&old_tree));
            }
            None => {
                self.tree = self.parser.parse(&new_text, None);
            }
        }

        self.buffer = new_buffer;
        self.selection = new_selection.clone();
        self.last_delta = Some(delta);
        self.version += 1;

        log::trace!("applied {cmd:?} -> version {}", self.version);

        Patch {
            changed,
            new_selection,
            version: self.version,
        }
    }

    /// Get the current selection range
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Set the selection range, clamped to the buffer and to char boundaries
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let start = self.floor_char_boundary(selection.start);
        let end = self.floor_char_boundary(selection.end).max(start);
        self.selection = start..end;
    }

    /// Get reference to tree for testing
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Offset most recently passed to `scroll_into_view`
    pub fn scroll_anchor(&self) -> Option<usize> {
        self.scroll_anchor
    }

    /// Zero-based (line, column) of a byte offset, column counted in chars
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = self.floor_char_boundary(offset);
        let before = self.buffer.slice_to_cow(0..offset);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line = before.matches('\n').count();
        (line, before[line_start..].chars().count())
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Slice the buffer, clamping the range to the document
    pub(crate) fn slice_to_cow(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = self.floor_char_boundary(range.start);
        let end = self.floor_char_boundary(range.end).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    /// Largest char boundary not after `offset`, clamped to the buffer
    pub(crate) fn floor_char_boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.buffer.len());
        while offset > 0 && !self.buffer.is_codepoint_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl DocumentAdapter for Document {
    fn nodes_in_order(&self) -> Vec<DocumentNode> {
        nodes::collect_nodes(self)
    }

    /// The Markdown source is the plain-text projection: typing happens in it
    fn plain_text(&self) -> String {
        self.text()
    }

    fn cursor_offset(&self) -> usize {
        self.selection.end
    }

    /// Terminal cells: `x` is the char column, `y` the line
    fn screen_coordinates_of(&self, offset: usize) -> ScreenPoint {
        let (line, col) = self.line_col(offset);
        ScreenPoint::new(
            i32::try_from(col).unwrap_or(i32::MAX),
            i32::try_from(line).unwrap_or(i32::MAX),
        )
    }

    fn set_cursor(&mut self, offset: usize) {
        self.set_selection(offset..offset);
    }

    fn scroll_into_view(&mut self, offset: usize) {
        self.scroll_anchor = Some(self.floor_char_boundary(offset));
    }

    fn insert_at_cursor(&mut self, text: &str) -> Patch {
        self.apply(Cmd::ReplaceRange {
            range: self.selection(),
            text: text.to_string(),
        })
    }

    fn map_offset_through_last_edit(&self, offset: usize) -> MappedOffset {
        match &self.last_delta {
            Some(delta) => mapping::map_offset(delta, offset),
            None => MappedOffset::Mapped(offset),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Ranges of the new document occupied by inserted text
fn inserted_ranges(delta: &Delta<RopeInfo>) -> Vec<Range<usize>> {
    let mut changed = Vec::new();
    let mut new_pos = 0;
    for el in &delta.els {
        match el {
            DeltaElement::Copy(from, to) => new_pos += to - from,
            DeltaElement::Insert(inserted) => {
                changed.push(new_pos..new_pos + inserted.len());
                new_pos += inserted.len();
            }
        }
    }
    changed
}

/// Describe a delta as one tree-sitter edit.
///
/// Commands compile to a single replaced span, so the delta is an unchanged
/// prefix, one changed region and an unchanged suffix. Returns `None` for a
/// no-op delta.
fn input_edit_for(delta: &Delta<RopeInfo>, old_text: &str, new_text: &str) -> Option<InputEdit> {
    let start_byte = match delta.els.first() {
        Some(DeltaElement::Copy(0, to)) => *to,
        _ => 0,
    };
    let suffix = match delta.els.last() {
        Some(DeltaElement::Copy(from, to)) if *to == delta.base_len && *from >= start_byte => {
            to - from
        }
        _ => 0,
    };
    let old_end_byte = delta.base_len - suffix;
    let new_end_byte = new_text.len() - suffix;

    if start_byte == old_end_byte && start_byte == new_end_byte {
        return None;
    }

    Some(InputEdit {
        start_byte,
        old_end_byte,
        new_end_byte,
        start_position: byte_to_point(old_text, start_byte),
        old_end_position: byte_to_point(old_text, old_end_byte),
        new_end_position: byte_to_point(new_text, new_end_byte),
    })
}

/// Convert byte offset to a tree-sitter (row, byte column) point
fn byte_to_point(text: &str, byte_offset: usize) -> Point {
    let offset = byte_offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    Point::new(row, offset - line_start)
}

impl Clone for Document {
    fn clone(&self) -> Self {
        // Parser doesn't implement Clone; build a fresh one and re-parse
        let mut parser = Parser::new();
        let _ = parser.set_language(&LANGUAGE.into());
        let tree = parser.parse(self.buffer.to_string(), None);

        Self {
            buffer: self.buffer.clone(),
            selection: self.selection.clone(),
            version: self.version,
            parser,
            tree,
            last_delta: self.last_delta.clone(),
            scroll_anchor: self.scroll_anchor,
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.buffer.len())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
