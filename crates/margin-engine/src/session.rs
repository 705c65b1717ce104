//! Per-document coordinator.
//!
//! A [`Session`] is the one place change notifications land. Each committed
//! mutation triggers exactly one recomputation, always in the same order:
//! overlays are remapped, the outline is rebuilt if its view is open, then
//! the suggestion engine re-evaluates. Everything runs on the caller's
//! thread; there is no shared state to lock.

use crate::editing::{Cmd, Document, DocumentAdapter, Patch};
use crate::outline::{
    CollapseState, HeadingId, Numbering, Outline, OutlineError, OutlineNode, VisibleRow,
    flatten_visible,
};
use crate::overlay::OverlayStore;
use crate::suggest::{GhostText, SuggestionEngine, SuggestionSource, SuggestionState, TriggerTable};

/// The open outline panel: the built index plus its search box
#[derive(Debug, Clone)]
struct OutlineView {
    outline: Outline,
    query: String,
}

#[derive(Debug)]
pub struct Session<D, S = TriggerTable> {
    doc: D,
    outline: Option<OutlineView>,
    /// Survives closing the outline view
    collapse: CollapseState,
    numbering: Numbering,
    suggestions: SuggestionEngine<S>,
    overlays: OverlayStore<GhostText>,
}

impl<D: DocumentAdapter> Session<D, TriggerTable> {
    pub fn new(doc: D) -> Self {
        Self::with_engine(doc, SuggestionEngine::default())
    }
}

impl<D: DocumentAdapter, S: SuggestionSource> Session<D, S> {
    pub fn with_engine(doc: D, suggestions: SuggestionEngine<S>) -> Self {
        let mut overlays = OverlayStore::new();
        overlays.replace_all(doc.version(), Vec::new());
        Self {
            doc,
            outline: None,
            collapse: CollapseState::new(),
            numbering: Numbering::default(),
            suggestions,
            overlays,
        }
    }

    pub fn with_numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Direct access for hosts that commit edits themselves.
    ///
    /// Call [`on_change`](Session::on_change) after every committed edit;
    /// until then the outline is stale and navigation refuses to move.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn into_document(self) -> D {
        self.doc
    }

    /// Recompute everything derived from the document
    pub fn on_change(&mut self) {
        let dropped = self.overlays.remap(&self.doc);
        if dropped > 0 {
            log::trace!("{dropped} overlays dropped by remap");
        }

        if let Some(view) = &mut self.outline {
            view.outline = view.outline.rebuild(&self.doc, self.numbering);
            self.collapse = view.outline.collapse_state();
            log::trace!(
                "outline rebuilt at version {}: {} headings",
                view.outline.version(),
                view.outline.len()
            );
        }

        self.suggestions.on_change(&self.doc, &mut self.overlays);
    }

    pub fn open_outline(&mut self) {
        if self.outline.is_some() {
            return;
        }
        let outline = Outline::from_document(&self.doc, &self.collapse, self.numbering);
        log::debug!("outline opened with {} headings", outline.len());
        self.outline = Some(OutlineView {
            outline,
            query: String::new(),
        });
    }

    /// Drop the view and its search query; collapse flags are kept for the next open
    pub fn close_outline(&mut self) {
        if let Some(view) = self.outline.take() {
            self.collapse = view.outline.collapse_state();
            log::debug!("outline closed");
        }
    }

    pub fn is_outline_open(&self) -> bool {
        self.outline.is_some()
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref().map(|view| &view.outline)
    }

    /// True when the open outline was built for an older document version
    pub fn is_outline_stale(&self) -> bool {
        self.outline
            .as_ref()
            .is_some_and(|view| view.outline.version() != self.doc.version())
    }

    pub fn show_numbers(&self) -> bool {
        self.numbering == Numbering::Shown
    }

    pub fn set_show_numbers(&mut self, show: bool) {
        let numbering = Numbering::from(show);
        if numbering == self.numbering {
            return;
        }
        self.numbering = numbering;
        if let Some(view) = &mut self.outline {
            view.outline = view.outline.rebuild(&self.doc, numbering);
            self.collapse = view.outline.collapse_state();
        }
    }

    pub fn search_query(&self) -> Option<&str> {
        self.outline.as_ref().map(|view| view.query.as_str())
    }

    pub fn set_search(&mut self, query: impl Into<String>) -> Result<(), OutlineError> {
        let view = self.outline.as_mut().ok_or(OutlineError::Closed)?;
        view.query = query.into();
        Ok(())
    }

    /// The outline forest with the current search query applied
    pub fn filtered_outline(&self) -> Result<Vec<OutlineNode<'_>>, OutlineError> {
        let view = self.outline.as_ref().ok_or(OutlineError::Closed)?;
        Ok(view.outline.filter(&view.query))
    }

    /// Rows to render: the filtered forest minus children of collapsed headings
    pub fn visible_rows(&self) -> Result<Vec<VisibleRow<'_>>, OutlineError> {
        Ok(flatten_visible(&self.filtered_outline()?))
    }

    /// Flip a heading's collapse flag, returning the new value
    pub fn toggle_collapse(&mut self, id: HeadingId) -> Result<bool, OutlineError> {
        let view = self.fresh_view()?;
        let collapsed = view.outline.toggle_collapse(id)?;
        self.collapse.set(id, collapsed);
        Ok(collapsed)
    }

    /// Move the cursor to a heading and scroll it into view.
    ///
    /// The cursor is left untouched on any error.
    pub fn navigate(&mut self, id: HeadingId) -> Result<usize, OutlineError> {
        let offset = self
            .fresh_view()?
            .outline
            .get(id)
            .map(|record| record.offset)
            .ok_or(OutlineError::UnknownHeading(id))?;

        self.doc.set_cursor(offset);
        self.doc.scroll_into_view(offset);
        log::debug!("navigated to {id} at {offset}");
        Ok(offset)
    }

    pub fn suggestion_state(&self) -> &SuggestionState {
        self.suggestions.state()
    }

    pub fn suggestions(&self) -> &SuggestionEngine<S> {
        &self.suggestions
    }

    pub fn overlays(&self) -> &OverlayStore<GhostText> {
        &self.overlays
    }

    /// Insert the pending completion, if any
    pub fn accept_suggestion(&mut self) -> Option<Patch> {
        let patch = self.suggestions.accept(&mut self.doc, &mut self.overlays)?;
        self.on_change();
        Some(patch)
    }

    fn fresh_view(&mut self) -> Result<&mut OutlineView, OutlineError> {
        let current = self.doc.version();
        let view = self.outline.as_mut().ok_or(OutlineError::Closed)?;
        let built_at = view.outline.version();
        if built_at != current {
            log::warn!("outline is stale: built at {built_at}, document at {current}");
            return Err(OutlineError::StaleIndex { built_at, current });
        }
        Ok(view)
    }
}

impl<S: SuggestionSource> Session<Document, S> {
    /// Commit an edit to the reference document and recompute
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let patch = self.doc.apply(cmd);
        self.on_change();
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(markdown: &str) -> Session<Document> {
        Session::new(Document::from_bytes(markdown.as_bytes()).unwrap())
    }

    #[test]
    fn test_outline_closed_by_default() {
        let mut s = session("# One\n");
        assert!(!s.is_outline_open());
        assert_eq!(s.navigate(HeadingId(0)), Err(OutlineError::Closed));
        assert_eq!(s.set_search("x"), Err(OutlineError::Closed));
        assert!(s.filtered_outline().is_err());
    }

    #[test]
    fn test_apply_rebuilds_open_outline() {
        let mut s = session("# One\n");
        s.open_outline();

        s.apply(Cmd::InsertText {
            at: 6,
            text: "# Two\n".to_string(),
        });

        let outline = s.outline().unwrap();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.version(), s.document().version());
        assert!(!s.is_outline_stale());
    }

    #[test]
    fn test_close_keeps_collapse_but_drops_query() {
        let mut s = session("# One\n## Child\n# Two\n");
        s.open_outline();
        s.set_search("two").unwrap();
        assert!(s.toggle_collapse(HeadingId(0)).unwrap());

        s.close_outline();
        s.open_outline();

        assert_eq!(s.search_query(), Some(""));
        assert!(s.outline().unwrap().get(HeadingId(0)).unwrap().collapsed);
    }

    #[test]
    fn test_toggle_unknown_heading() {
        let mut s = session("# One\n");
        s.open_outline();
        assert_eq!(
            s.toggle_collapse(HeadingId(7)),
            Err(OutlineError::UnknownHeading(HeadingId(7)))
        );
    }

    #[test]
    fn test_set_show_numbers_rebuilds() {
        let mut s = session("# One\n## Child\n");
        s.open_outline();
        assert_eq!(s.outline().unwrap().get(HeadingId(1)).unwrap().number, "1.1");

        s.set_show_numbers(false);
        assert!(!s.show_numbers());
        assert_eq!(s.outline().unwrap().get(HeadingId(1)).unwrap().number, "");
    }

    #[test]
    fn test_visible_rows_respect_collapse() {
        let mut s = session("# One\n## Child\n# Two\n");
        s.open_outline();
        assert_eq!(s.visible_rows().unwrap().len(), 3);

        s.toggle_collapse(HeadingId(0)).unwrap();
        let labels: Vec<String> = s.visible_rows().unwrap().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["1 One", "2 Two"]);
    }

    #[test]
    fn test_typing_trigger_raises_suggestion() {
        let mut s = session("I love ");
        s.apply(Cmd::InsertText {
            at: 7,
            text: "deep ".to_string(),
        });

        assert!(matches!(s.suggestion_state(), SuggestionState::Suggesting(_)));
        assert_eq!(s.overlays().len(), 1);
        assert_eq!(s.overlays().version(), s.document().version());
    }
}
