use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use margin_config::{AcceptKey, Config};
use margin_engine::editing::{Cmd, Document, DocumentAdapter};
use margin_engine::outline::HeadingId;
use margin_engine::session::Session;
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Outline,
    Search,
}

pub struct App {
    pub session: Session<Document>,
    pub focus: Focus,
    pub outline_state: ListState,
    pub accept_key: AcceptKey,
    /// First document line shown in the editor pane
    pub scroll: usize,
    pub status: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(document: Document, config: &Config) -> Self {
        let session = Session::with_engine(document, config.suggestions.engine())
            .with_numbering(config.outline.numbering());

        Self {
            session,
            focus: Focus::Editor,
            outline_state: ListState::default(),
            accept_key: config.suggestions.accept_key,
            scroll: 0,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('o') => self.toggle_outline(),
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Editor => self.handle_editor_key(key.code),
            Focus::Outline => self.handle_outline_key(key.code),
            Focus::Search => self.handle_search_key(key.code),
        }
    }

    fn toggle_outline(&mut self) {
        if self.session.is_outline_open() {
            self.session.close_outline();
            self.focus = Focus::Editor;
        } else {
            self.session.open_outline();
            self.focus = Focus::Outline;
            self.outline_state.select(Some(0));
        }
    }

    fn handle_editor_key(&mut self, code: KeyCode) {
        if self.is_accept_key(code) && self.session.accept_suggestion().is_some() {
            self.status = "Suggestion accepted".to_string();
            return;
        }

        let text = self.session.document().text();
        let cursor = self.session.document().cursor_offset();
        match code {
            KeyCode::Char(c) => self.insert(&c.to_string()),
            KeyCode::Enter => self.insert("\n"),
            KeyCode::Tab => self.insert("    "),
            KeyCode::Backspace => {
                let start = prev_boundary(&text, cursor);
                if start < cursor {
                    self.session.apply(Cmd::DeleteRange {
                        range: start..cursor,
                    });
                }
            }
            KeyCode::Delete => {
                let end = next_boundary(&text, cursor);
                if end > cursor {
                    self.session.apply(Cmd::DeleteRange { range: cursor..end });
                }
            }
            KeyCode::Left => self.move_cursor(prev_boundary(&text, cursor)),
            KeyCode::Right => self.move_cursor(next_boundary(&text, cursor)),
            KeyCode::Up => self.move_cursor(vertical_move(&text, cursor, false)),
            KeyCode::Down => self.move_cursor(vertical_move(&text, cursor, true)),
            KeyCode::Home => self.move_cursor(line_start(&text, cursor)),
            KeyCode::End => self.move_cursor(line_end(&text, cursor)),
            KeyCode::Esc if self.session.is_outline_open() => self.focus = Focus::Outline,
            _ => {}
        }
    }

    fn handle_outline_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.select_row(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_row(-1),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_heading()
                    && let Err(e) = self.session.toggle_collapse(id)
                {
                    self.status = e.to_string();
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_heading() {
                    match self.session.navigate(id) {
                        Ok(offset) => {
                            self.scroll = self.session.document().line_col(offset).0;
                            self.focus = Focus::Editor;
                        }
                        Err(e) => self.status = e.to_string(),
                    }
                }
            }
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('n') => {
                let show = !self.session.show_numbers();
                self.session.set_show_numbers(show);
            }
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Editor,
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        let mut query = self.session.search_query().unwrap_or_default().to_string();
        match code {
            KeyCode::Char(c) => query.push(c),
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.focus = Focus::Outline;
                return;
            }
            _ => return,
        }
        if let Err(e) = self.session.set_search(query) {
            self.status = e.to_string();
        }
        self.outline_state.select(Some(0));
    }

    fn is_accept_key(&self, code: KeyCode) -> bool {
        matches!(
            (self.accept_key, code),
            (AcceptKey::Tab, KeyCode::Tab)
                | (AcceptKey::Enter, KeyCode::Enter)
                | (AcceptKey::Right, KeyCode::Right)
        )
    }

    fn insert(&mut self, text: &str) {
        let range = self.session.document().selection();
        self.session.apply(Cmd::ReplaceRange {
            range,
            text: text.to_string(),
        });
        self.status.clear();
    }

    fn move_cursor(&mut self, offset: usize) {
        self.session.document_mut().set_cursor(offset);
    }

    fn visible_ids(&self) -> Vec<HeadingId> {
        self.session
            .visible_rows()
            .map(|rows| rows.iter().map(|row| row.record.id).collect())
            .unwrap_or_default()
    }

    fn selected_heading(&self) -> Option<HeadingId> {
        let index = self.outline_state.selected()?;
        self.visible_ids().get(index).copied()
    }

    fn select_row(&mut self, delta: isize) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.outline_state.select(None);
            return;
        }
        let current = self.outline_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.outline_state.select(Some(next));
    }
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .chars()
        .next_back()
        .map_or(offset, |c| offset - c.len_utf8())
}

fn next_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map_or(offset, |c| offset + c.len_utf8())
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

/// Same char column on the neighbouring line, clamped to that line's length
fn vertical_move(text: &str, offset: usize, down: bool) -> usize {
    let start = line_start(text, offset);
    let column = text[start..offset].chars().count();

    let target_start = if down {
        let end = line_end(text, offset);
        if end == text.len() {
            return offset;
        }
        end + 1
    } else {
        if start == 0 {
            return offset;
        }
        line_start(text, start - 1)
    };

    let target_end = line_end(text, target_start);
    text[target_start..target_end]
        .char_indices()
        .nth(column)
        .map_or(target_end, |(i, _)| target_start + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_engine::suggest::SuggestionState;
    use pretty_assertions::assert_eq;

    fn app(text: &str) -> App {
        App::new(Document::from_bytes(text.as_bytes()).unwrap(), &Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_tab_accepts_pending_suggestion() {
        let mut app = app("");
        type_str(&mut app, "I love machine ");
        assert!(matches!(
            app.session.suggestion_state(),
            SuggestionState::Suggesting(_)
        ));

        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.session.document().text(),
            "I love machine learning algorithms have revolutionized"
        );

        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.session.document().text(),
            "I love machine learning algorithms have revolutionized    "
        );
    }

    #[test]
    fn test_accept_after_moving_left_completes_at_trigger() {
        let mut app = app("");
        type_str(&mut app, "I love machine ");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);

        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.session.document().text(),
            "I love machine learning algorithms have revolutionized"
        );
    }

    #[test]
    fn test_outline_navigation_moves_cursor() {
        let mut app = app("# One\n\ntext\n\n# Two\n");
        app.handle_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL));
        assert_eq!(app.focus, Focus::Outline);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Editor);
        assert_eq!(app.session.document().cursor_offset(), 13);
        assert_eq!(app.scroll, 4);
    }

    #[test]
    fn test_search_filters_rows() {
        let mut app = app("# Alpha\n# Beta\n");
        app.handle_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL));
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "bet");

        assert_eq!(app.session.search_query(), Some("bet"));
        assert_eq!(app.visible_ids(), vec![HeadingId(1)]);
    }

    #[test]
    fn test_vertical_move_keeps_column() {
        let text = "abcdef\nxy\nlonger line";
        assert_eq!(vertical_move(text, 4, true), 9);
        assert_eq!(vertical_move(text, 9, true), 12);
        assert_eq!(vertical_move(text, 12, false), 9);
        assert_eq!(vertical_move(text, 2, false), 2);
    }

    #[test]
    fn test_backspace_removes_whole_char() {
        let mut app = app("héllo");
        app.session.document_mut().set_cursor(3);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.document().text(), "hllo");
    }
}
