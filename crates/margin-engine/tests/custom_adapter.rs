//! A session driven by a host editor that commits its own edits

use margin_engine::editing::{DocumentAdapter, DocumentNode, MappedOffset, Patch, ScreenPoint};
use margin_engine::outline::{HeadingId, OutlineError};
use margin_engine::overlay::{OverlayAnnotation, OverlayStore};
use margin_engine::session::Session;
use margin_engine::suggest::{SuggestionEngine, SuggestionEntry, SuggestionState, TriggerTable};

/// Single-line editor that only ever inserts
#[derive(Debug, Default)]
struct LineEditor {
    nodes: Vec<DocumentNode>,
    text: String,
    cursor: usize,
    scrolled_to: Option<usize>,
    version: u64,
    last_insert: Option<(usize, usize)>,
}

impl LineEditor {
    fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
            ..Self::default()
        }
    }

    fn type_at(&mut self, at: usize, text: &str) {
        self.text.insert_str(at, text);
        self.cursor = at + text.len();
        self.last_insert = Some((at, text.len()));
        self.version += 1;
    }
}

impl DocumentAdapter for LineEditor {
    fn nodes_in_order(&self) -> Vec<DocumentNode> {
        self.nodes.clone()
    }

    fn plain_text(&self) -> String {
        self.text.clone()
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn screen_coordinates_of(&self, offset: usize) -> ScreenPoint {
        ScreenPoint::new(offset as i32 * 8, 100)
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset;
    }

    fn scroll_into_view(&mut self, offset: usize) {
        self.scrolled_to = Some(offset);
    }

    fn insert_at_cursor(&mut self, text: &str) -> Patch {
        let at = self.cursor;
        self.type_at(at, text);
        Patch {
            changed: vec![at..at + text.len()],
            new_selection: self.cursor..self.cursor,
            version: self.version,
        }
    }

    fn map_offset_through_last_edit(&self, offset: usize) -> MappedOffset {
        match self.last_insert {
            Some((at, len)) if offset >= at => MappedOffset::Mapped(offset + len),
            _ => MappedOffset::Mapped(offset),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[test]
fn out_of_range_levels_are_clamped() {
    let mut editor = LineEditor::with_text("");
    editor.nodes = vec![
        DocumentNode::heading(1, "Top", 0),
        DocumentNode::other("body", 4),
        DocumentNode::heading(9, "Too deep", 9),
        DocumentNode::heading(2, "Second", 18),
    ];
    let mut session = Session::new(editor);
    session.open_outline();

    let outline = session.outline().unwrap();
    let deep = outline.get(HeadingId(1)).unwrap();
    assert_eq!(deep.level, 6);
    assert_eq!(deep.number, "1.0.0.0.0.1");
    assert_eq!(deep.parent, Some(HeadingId(0)));

    let second = outline.get(HeadingId(2)).unwrap();
    assert_eq!(second.number, "1.1");
    assert_eq!(second.parent, Some(HeadingId(0)));
}

#[test]
fn navigate_goes_through_adapter() {
    let mut editor = LineEditor::with_text("Top body");
    editor.nodes = vec![DocumentNode::heading(1, "Top", 0)];
    let mut session = Session::new(editor);
    session.open_outline();

    assert_eq!(session.navigate(HeadingId(0)), Ok(0));
    assert_eq!(session.document().cursor, 0);
    assert_eq!(session.document().scrolled_to, Some(0));
    assert_eq!(
        session.navigate(HeadingId(3)),
        Err(OutlineError::UnknownHeading(HeadingId(3)))
    );
}

#[test]
fn overlay_shifts_by_inserted_length() {
    let mut editor = LineEditor::with_text("abcdef");
    let mut store = OverlayStore::new();
    store.replace_all(editor.version(), vec![OverlayAnnotation::new(4, 'x')]);

    editor.type_at(1, "12345");
    store.remap(&editor);

    assert_eq!(store.annotations(), &[OverlayAnnotation::new(9, 'x')]);
}

#[test]
fn popup_sits_below_cursor_in_host_units() {
    let table = TriggerTable::from_entries([SuggestionEntry::new(
        "rust",
        "is a systems programming language",
        "Describe Rust",
    )]);
    let engine = SuggestionEngine::new(table).with_popup_offset(24);
    let mut session = Session::with_engine(LineEditor::with_text("I like"), engine);

    session.document_mut().type_at(6, " Rust ");
    session.on_change();

    let SuggestionState::Suggesting(active) = session.suggestion_state() else {
        panic!("expected a suggestion");
    };
    assert_eq!(active.popup, ScreenPoint::new(12 * 8, 124));

    session.accept_suggestion().unwrap();
    assert_eq!(
        session.document().plain_text(),
        "I like Rust is a systems programming language"
    );
    assert_eq!(session.overlays().version(), session.document().version());
}
