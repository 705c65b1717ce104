use margin_engine::editing::{Cmd, Document, DocumentAdapter};
use margin_engine::outline::{HeadingId, OutlineError};
use margin_engine::session::Session;
use margin_engine::suggest::SuggestionState;

const NOTES: &str = "\
# Introduction

Some context.

## Background

### Prior Work

## Motivation

# Methods

## Neural Networks

# Results
";

fn notes_session() -> Session<Document> {
    Session::new(Document::from_bytes(NOTES.as_bytes()).unwrap())
}

fn rows(session: &Session<Document>) -> String {
    session
        .visible_rows()
        .unwrap()
        .iter()
        .map(|row| format!("{}{}", "  ".repeat(row.depth), row.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn collapse_survives_edit_that_keeps_heading_order() {
    let mut session = notes_session();
    session.open_outline();
    session.toggle_collapse(HeadingId(1)).unwrap();

    let at = NOTES.find("Some context.").unwrap();
    session.apply(Cmd::InsertText {
        at,
        text: "More words here. ".to_string(),
    });

    let outline = session.outline().unwrap();
    assert!(outline.get(HeadingId(1)).unwrap().collapsed);
    assert_eq!(outline.get(HeadingId(1)).unwrap().text, "Background");
    insta::assert_snapshot!(rows(&session), @r"
    1 Introduction
      1.1 Background
      1.2 Motivation
    2 Methods
      2.1 Neural Networks
    3 Results
    ");
}

#[test]
fn collapse_follows_heading_when_one_is_inserted_above() {
    let mut session = Session::new(Document::from_bytes(b"# A\n\n# B\n").unwrap());
    session.open_outline();
    session.toggle_collapse(HeadingId(1)).unwrap();

    session.apply(Cmd::InsertText {
        at: 0,
        text: "# New\n\n".to_string(),
    });

    let flags: Vec<(&str, bool)> = session
        .outline()
        .unwrap()
        .preorder()
        .map(|record| (record.text.as_str(), record.collapsed))
        .collect();
    assert_eq!(flags, vec![("New", false), ("A", false), ("B", true)]);

    session.close_outline();
    session.open_outline();
    assert!(session.outline().unwrap().get(HeadingId(2)).unwrap().collapsed);
}

#[test]
fn navigate_moves_cursor_and_scrolls() {
    let mut session = notes_session();
    session.open_outline();

    let offset = session.navigate(HeadingId(4)).unwrap();

    assert_eq!(offset, NOTES.find("# Methods").unwrap());
    assert_eq!(session.document().cursor_offset(), offset);
    assert_eq!(session.document().scroll_anchor(), Some(offset));
}

#[test]
fn stale_outline_refuses_to_navigate() {
    let mut session = notes_session();
    session.open_outline();
    session.document_mut().set_cursor(0);

    // Host commits an edit without notifying the session
    session.document_mut().apply(Cmd::InsertText {
        at: 0,
        text: "preface\n\n".to_string(),
    });
    let cursor = session.document().cursor_offset();

    assert!(session.is_outline_stale());
    assert_eq!(
        session.navigate(HeadingId(0)),
        Err(OutlineError::StaleIndex {
            built_at: 0,
            current: 1
        })
    );
    assert_eq!(session.document().cursor_offset(), cursor);

    session.on_change();
    assert_eq!(session.navigate(HeadingId(0)), Ok("preface\n\n".len()));
}

#[test]
fn closed_outline_is_not_rebuilt() {
    let mut session = notes_session();
    session.open_outline();
    session.close_outline();

    session.apply(Cmd::InsertText {
        at: NOTES.len(),
        text: "\n# Appendix\n".to_string(),
    });

    assert!(session.outline().is_none());
    assert_eq!(session.navigate(HeadingId(0)), Err(OutlineError::Closed));

    session.open_outline();
    let outline = session.outline().unwrap();
    assert_eq!(outline.version(), session.document().version());
    assert_eq!(outline.len(), 8);
}

#[test]
fn search_expands_matching_branches() {
    let mut session = notes_session();
    session.open_outline();
    session.toggle_collapse(HeadingId(0)).unwrap();
    session.set_search("prior").unwrap();

    insta::assert_snapshot!(rows(&session), @r"
    1 Introduction
      1.1 Background
        1.1.1 Prior Work
    ");

    session.set_search("").unwrap();
    insta::assert_snapshot!(rows(&session), @r"
    1 Introduction
    2 Methods
      2.1 Neural Networks
    3 Results
    ");
}

#[test]
fn hidden_numbers_render_bare_titles() {
    let mut session = notes_session();
    session.set_show_numbers(false);
    session.open_outline();
    session.set_search("net").unwrap();

    insta::assert_snapshot!(rows(&session), @r"
    Methods
      Neural Networks
    ");
}

#[test]
fn typing_trigger_then_accept_inserts_completion_once() {
    let mut session = Session::new(Document::from_bytes(b"I love").unwrap());

    session.apply(Cmd::InsertText {
        at: 6,
        text: " machine".to_string(),
    });
    assert!(session.suggestion_state().is_idle());
    assert!(session.accept_suggestion().is_none());

    session.apply(Cmd::InsertText {
        at: 14,
        text: " ".to_string(),
    });
    let SuggestionState::Suggesting(active) = session.suggestion_state() else {
        panic!("expected a suggestion, got {:?}", session.suggestion_state());
    };
    assert_eq!(active.anchor, 15);
    assert_eq!(session.overlays().annotations()[0].anchor, 15);

    let patch = session.accept_suggestion().unwrap();
    assert_eq!(patch.version, session.document().version());
    assert_eq!(
        session.document().text(),
        "I love machine learning algorithms have revolutionized"
    );
    assert!(session.overlays().is_empty());
    assert!(session.suggestion_state().is_idle());

    assert!(session.accept_suggestion().is_none());
    assert_eq!(
        session.document().text(),
        "I love machine learning algorithms have revolutionized"
    );
}

#[test]
fn accept_lands_at_ghost_text_after_caret_moves() {
    let mut session = Session::new(Document::from_bytes(b"I love machine").unwrap());
    session.apply(Cmd::InsertText {
        at: 14,
        text: " ".to_string(),
    });
    assert_eq!(session.overlays().annotations()[0].anchor, 15);

    session.document_mut().set_cursor(3);
    session.accept_suggestion().unwrap();

    assert_eq!(
        session.document().text(),
        "I love machine learning algorithms have revolutionized"
    );
    assert!(session.overlays().is_empty());
}

#[test]
fn accepted_heading_text_reaches_outline() {
    let mut session = Session::new(Document::from_bytes(b"# Deep ").unwrap());
    session.open_outline();
    session.on_change();

    assert!(session.accept_suggestion().is_some());
    assert_eq!(
        session.outline().unwrap().get(HeadingId(0)).unwrap().text,
        "Deep learning models have achieved remarkable results"
    );
}
