mod app;

use anyhow::{Context, Result};
use app::{App, Focus};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use margin_config::Config;
use margin_engine::editing::{Document, DocumentAdapter};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", config_path.display());
            process::exit(1);
        }
    };

    let document = match args.len() {
        1 => Document::from_bytes(b"")?,
        2 => {
            let path = PathBuf::from(&args[1]);
            let path = Config::expand_path(&path).unwrap_or(path);
            let content = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Document::from_bytes(&content)?
        }
        _ => {
            eprintln!("Usage: {} [markdown-file]", args[0]);
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(document, &config);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let editor_area = if app.session.is_outline_open() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
            .split(rows[0]);
        render_outline(f, app, columns[0]);
        columns[1]
    } else {
        rows[0]
    };

    render_editor(f, app, editor_area);

    let help = match app.focus {
        Focus::Editor => "Ctrl-Q: Quit | Ctrl-O: Outline | accept key: take suggestion",
        Focus::Outline => "↑/↓: Move | Enter: Go to | Space: Collapse | /: Search | n: Numbers | Esc: Editor",
        Focus::Search => "Type to filter | Enter/Esc: Done",
    };
    let status = if app.status.is_empty() {
        Line::from(Span::raw(help))
    } else {
        Line::from(vec![
            Span::styled(app.status.clone(), Style::default().fg(Color::Red)),
            Span::raw(" | "),
            Span::raw(help),
        ])
    };
    f.render_widget(Paragraph::new(status), rows[1]);
}

fn render_outline(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let query = app.session.search_query().unwrap_or_default().to_string();
    let search_style = if app.focus == Focus::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(query)
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = app
        .session
        .visible_rows()
        .unwrap_or_default()
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let marker = match (row.has_children, row.collapsed) {
                (false, _) => "  ",
                (true, false) => "▾ ",
                (true, true) => "▸ ",
            };
            ListItem::new(Line::from(Span::raw(format!(
                "{indent}{marker}{}",
                row.label()
            ))))
        })
        .collect();

    let border_style = if app.focus == Focus::Outline {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Outline"),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, chunks[1], &mut app.outline_state);
}

fn render_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let doc = app.session.document();
    let text = doc.text();
    let (cursor_line, cursor_col) = doc.line_col(doc.cursor_offset());

    let height = usize::from(area.height.saturating_sub(2)).max(1);
    if cursor_line < app.scroll {
        app.scroll = cursor_line;
    } else if cursor_line >= app.scroll + height {
        app.scroll = cursor_line + 1 - height;
    }

    let ghost = app.session.overlays().annotations().first().map(|annotation| {
        let (line, col) = doc.line_col(annotation.anchor);
        (line, col, annotation.payload.text.as_str())
    });

    let lines: Vec<Line> = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| match ghost {
            Some((ghost_line, col, ghost_text)) if ghost_line == i => {
                let split = line.char_indices().nth(col).map_or(line.len(), |(b, _)| b);
                Line::from(vec![
                    Span::raw(line[..split].to_string()),
                    Span::styled(
                        ghost_text.to_string(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    ),
                    Span::raw(line[split..].to_string()),
                ])
            }
            _ => Line::from(Span::raw(line.to_string())),
        })
        .collect();

    let border_style = if app.focus == Focus::Editor {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let editor = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Document"),
        )
        .scroll((u16::try_from(app.scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(editor, area);

    let scroll = app.scroll;
    let to_screen = |line: usize, col: usize| cell_in_pane(area, scroll, line, col);

    if app.focus == Focus::Editor
        && let Some(position) = to_screen(cursor_line, cursor_col)
    {
        f.set_cursor_position(position);
    }

    if let Some(active) = app.session.suggestion_state().active() {
        let line = usize::try_from(active.popup.y).unwrap_or(0);
        let col = usize::try_from(active.popup.x).unwrap_or(0);
        if let Some((x, y)) = to_screen(line, col) {
            let description = active.entry.description.as_str();
            let width = u16::try_from(description.chars().count() + 2)
                .unwrap_or(u16::MAX)
                .min(area.right().saturating_sub(x));
            let popup = Rect::new(x, y, width, 3).intersection(area);
            f.render_widget(Clear, popup);
            f.render_widget(
                Paragraph::new(description)
                    .block(Block::default().borders(Borders::ALL))
                    .style(Style::default().fg(Color::Cyan)),
                popup,
            );
        }
    }
}

/// Terminal cell of a document (line, column) inside a bordered pane, if visible
fn cell_in_pane(area: Rect, scroll: usize, line: usize, col: usize) -> Option<(u16, u16)> {
    let row = u16::try_from(line.checked_sub(scroll)?).ok()?;
    let col = u16::try_from(col).ok()?;
    let x = area.x.checked_add(1)?.checked_add(col)?;
    let y = area.y.checked_add(1)?.checked_add(row)?;
    (x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1)).then_some((x, y))
}
