//! Trigger-word suggestions shown as ghost text at the cursor.
//!
//! The engine is a small state machine driven by change notifications. When
//! the text ends in whitespace and the last word is a known trigger, it
//! installs one ghost-text overlay at the cursor and remembers where to put
//! the description popup. Accepting inserts the completion as a single edit.

mod triggers;

pub use triggers::{SuggestionEntry, SuggestionSource, TriggerTable, default_entries};

use crate::editing::{DocumentAdapter, Patch, ScreenPoint};
use crate::overlay::{OverlayAnnotation, OverlayStore};

/// Rows between the cursor and the description popup
pub const DEFAULT_POPUP_OFFSET_Y: i32 = 1;

/// Overlay payload rendered after the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostText {
    /// Exactly what accepting would insert
    pub text: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSuggestion {
    pub entry: SuggestionEntry,
    /// Cursor offset when the suggestion was raised
    pub anchor: usize,
    /// Top-left of the description popup
    pub popup: ScreenPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SuggestionState {
    #[default]
    Idle,
    Suggesting(ActiveSuggestion),
    /// Held only while an accepted completion is being inserted
    Accepting,
}

impl SuggestionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SuggestionState::Idle)
    }

    pub fn active(&self) -> Option<&ActiveSuggestion> {
        match self {
            SuggestionState::Suggesting(active) => Some(active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionEngine<S = TriggerTable> {
    source: S,
    state: SuggestionState,
    popup_offset_y: i32,
}

impl Default for SuggestionEngine<TriggerTable> {
    fn default() -> Self {
        Self::new(TriggerTable::default())
    }
}

impl<S: SuggestionSource> SuggestionEngine<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: SuggestionState::Idle,
            popup_offset_y: DEFAULT_POPUP_OFFSET_Y,
        }
    }

    pub fn with_popup_offset(mut self, popup_offset_y: i32) -> Self {
        self.popup_offset_y = popup_offset_y;
        self
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn popup_offset_y(&self) -> i32 {
        self.popup_offset_y
    }

    /// Re-evaluate after a document change, replacing the overlay set
    pub fn on_change<D: DocumentAdapter + ?Sized>(
        &mut self,
        doc: &D,
        overlays: &mut OverlayStore<GhostText>,
    ) {
        if matches!(self.state, SuggestionState::Accepting) {
            return;
        }

        let text = doc.plain_text();
        let entry = trigger_token(&text).and_then(|token| self.source.lookup(&token));

        let Some(entry) = entry else {
            if !self.state.is_idle() {
                log::debug!("suggestion dismissed");
            }
            overlays.replace_all(doc.version(), Vec::new());
            self.state = SuggestionState::Idle;
            return;
        };

        let anchor = doc.cursor_offset();
        let popup = doc.screen_coordinates_of(anchor).below(self.popup_offset_y);
        let ghost = GhostText {
            text: insertion_text(&entry.completion, text_before(&text, anchor)),
            description: entry.description.clone(),
        };
        log::debug!("suggesting {:?} at {anchor}", entry.trigger);

        overlays.replace_all(doc.version(), vec![OverlayAnnotation::new(anchor, ghost)]);
        self.state = SuggestionState::Suggesting(ActiveSuggestion {
            entry: entry.clone(),
            anchor,
            popup,
        });
    }

    /// Insert the active completion where its ghost text is drawn.
    ///
    /// The caret is moved back to the anchor first if it has wandered. A
    /// suggestion raised for an older document version is dismissed instead.
    /// Returns the resulting patch, or `None` when nothing was inserted.
    pub fn accept<D: DocumentAdapter + ?Sized>(
        &mut self,
        doc: &mut D,
        overlays: &mut OverlayStore<GhostText>,
    ) -> Option<Patch> {
        let active = match std::mem::replace(&mut self.state, SuggestionState::Accepting) {
            SuggestionState::Suggesting(active) => active,
            other => {
                self.state = other;
                return None;
            }
        };

        if overlays.version() != doc.version() {
            log::debug!(
                "dropping suggestion {:?}: raised at version {}, document at {}",
                active.entry.trigger,
                overlays.version(),
                doc.version()
            );
            overlays.replace_all(doc.version(), Vec::new());
            self.state = SuggestionState::Idle;
            return None;
        }

        if doc.cursor_offset() != active.anchor {
            doc.set_cursor(active.anchor);
        }

        let text = doc.plain_text();
        let insertion = insertion_text(&active.entry.completion, text_before(&text, active.anchor));
        let patch = doc.insert_at_cursor(&insertion);
        log::debug!("accepted {:?}: inserted {} bytes", active.entry.trigger, insertion.len());

        overlays.replace_all(doc.version(), Vec::new());
        self.state = SuggestionState::Idle;
        Some(patch)
    }
}

/// Lower-cased last word, only when the text ends in whitespace
fn trigger_token(text: &str) -> Option<String> {
    if !text.ends_with(char::is_whitespace) {
        return None;
    }
    text.split_whitespace().last().map(str::to_lowercase)
}

fn text_before(text: &str, anchor: usize) -> &str {
    text.get(..anchor).unwrap_or(text)
}

/// `text` is everything before the insertion point
fn insertion_text(completion: &str, text: &str) -> String {
    if text.ends_with(char::is_whitespace) {
        completion.to_string()
    } else {
        format!(" {completion}")
    }
}
