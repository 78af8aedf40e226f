use anyhow::Result;
use blockdown_config::Config;
use blockdown_engine::{
    Block, BlockKind, CaretTracker, CmarkRenderer, Document, RenderOptions, RenderedBlock,
    Selection, io,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Pane, Borders, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process};
use tracing_subscriber::EnvFilter;

/// Places the caret at the end of a block's content when a block is opened
/// for editing; the terminal view has no richer selection to read.
struct TailCaret;

impl CaretTracker for TailCaret {
    fn read(&self, block: &RenderedBlock) -> Option<Selection> {
        Some(Selection::caret(block.text.chars().count()))
    }
}

struct App {
    path: PathBuf,
    doc: Document,
    /// Selected block while no block is being edited.
    cursor: usize,
    saved_text: String,
    status: String,
}

impl App {
    fn new(path: PathBuf, config: Option<&Config>) -> Result<Self> {
        let options = RenderOptions {
            breaks: config.is_none_or(|c| c.breaks),
            sanitize: config.is_none_or(|c| c.sanitize),
        };
        let mut doc = Document::new(Box::new(CmarkRenderer::new(options)));

        let saved_text = match io::load_document(&path) {
            Ok(text) => {
                doc.open(&text);
                text
            }
            Err(io::IoError::NotFound(_)) => doc.text(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            doc,
            cursor: 0,
            saved_text,
            status: String::new(),
        })
    }

    fn is_dirty(&self) -> bool {
        self.doc.text() != self.saved_text
    }

    fn save(&mut self) -> Result<()> {
        // render any in-progress edit so the blob is the committed document
        if let Some(index) = self.doc.editable_index() {
            self.cursor = self.doc.render(index).unwrap_or(self.cursor);
        }
        let text = self.doc.text();
        io::save_document(&self.path, &text)?;
        self.saved_text = text;
        self.status = format!("saved {}", self.path.display());
        Ok(())
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.doc.blocks().len().saturating_sub(1));
    }

    /// Insert a character at the caret of the editable block.
    fn insert_char(&mut self, c: char) {
        let Some(index) = self.doc.editable_index() else {
            return;
        };
        let Some(block) = self.doc.blocks()[index].as_editable() else {
            return;
        };
        let mut chars: Vec<char> = block.buffer.chars().collect();
        let at = block.selection.start.min(chars.len());
        chars.insert(at, c);
        let buffer: String = chars.into_iter().collect();
        self.doc.update_editable(buffer, Selection::caret(at + 1));
    }

    /// Delete the character before the caret, or fold the block into its
    /// neighbor when the caret sits at the boundary.
    fn backspace(&mut self) {
        let Some(index) = self.doc.editable_index() else {
            return;
        };
        let (buffer, selection) = match self.doc.blocks()[index].as_editable() {
            Some(block) => (block.buffer.clone(), block.selection),
            None => return,
        };
        if selection == Selection::caret(0) {
            if let Some(target) = self.doc.delete_at_boundary() {
                self.cursor = target;
            }
            return;
        }

        // one history entry per deletion run
        self.doc.checkpoint();
        let mut chars: Vec<char> = buffer.chars().collect();
        let at = selection.start.min(chars.len());
        if at > 0 {
            chars.remove(at - 1);
            let buffer: String = chars.into_iter().collect();
            self.doc.update_editable(buffer, Selection::caret(at - 1));
        }
    }

    /// Move the caret, crossing into the neighbor block past either end.
    fn move_caret(&mut self, delta: isize) {
        let Some(index) = self.doc.editable_index() else {
            return;
        };
        let Some(block) = self.doc.blocks()[index].as_editable() else {
            return;
        };
        let len = block.buffer.chars().count();
        let at = block.selection.start;
        let buffer = block.buffer.clone();

        if delta < 0 {
            if at == 0 {
                if let Some(target) = self.doc.focus_previous() {
                    self.cursor = target;
                }
            } else {
                self.doc.update_editable(buffer, Selection::caret(at - 1));
            }
        } else if at >= len {
            if let Some(target) = self.doc.focus_next() {
                self.cursor = target;
            }
        } else {
            self.doc.update_editable(buffer, Selection::caret(at + 1));
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Determine the document path from CLI args or the config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let path = if args.len() == 2 {
        PathBuf::from(&args[1])
    } else if args.len() == 1 {
        match &config {
            Some(config) => config.document_path.clone(),
            None => {
                eprintln!("Error: No document path provided and no config file found");
                eprintln!("Usage: {} <document-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [document-path]", args[0]);
        process::exit(1);
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(path, config.as_ref())?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        app.clamp_cursor();
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };

        // chords work in both modes and are consumed here
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    if let Err(e) = app.save() {
                        app.status = format!("save failed: {e}");
                    }
                }
                KeyCode::Char('z') => {
                    app.doc.undo();
                    app.clamp_cursor();
                }
                KeyCode::Char('y') => {
                    app.doc.redo();
                    app.clamp_cursor();
                }
                KeyCode::Char('q') => return Ok(()),
                _ => {}
            }
            continue;
        }

        if let Some(index) = app.doc.editable_index() {
            // edit mode: keys drive the state machine transitions
            match key.code {
                KeyCode::Esc => {
                    app.cursor = app.doc.render(index).unwrap_or(app.cursor);
                }
                KeyCode::Enter => {
                    if let Some(target) = app.doc.split_line() {
                        app.cursor = target;
                    }
                }
                KeyCode::Backspace => app.backspace(),
                KeyCode::Left => app.move_caret(-1),
                KeyCode::Right => app.move_caret(1),
                KeyCode::Up => {
                    if app.doc.focus_previous().is_none() {
                        // no predecessor: just move the caret home
                        if let Some(block) = app.doc.blocks()[index].as_editable() {
                            let buffer = block.buffer.clone();
                            app.doc.update_editable(buffer, Selection::caret(0));
                        }
                    }
                }
                KeyCode::Down => {
                    if app.doc.focus_next().is_none() {
                        if let Some(block) = app.doc.blocks()[index].as_editable() {
                            let buffer = block.buffer.clone();
                            let end = buffer.chars().count();
                            app.doc.update_editable(buffer, Selection::caret(end));
                        }
                    }
                }
                KeyCode::Char(c) => app.insert_char(c),
                _ => {}
            }
        } else {
            // browse mode: select a block, open it for editing
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => {
                    app.cursor = (app.cursor + 1).min(app.doc.blocks().len().saturating_sub(1));
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.cursor = app.cursor.saturating_sub(1);
                }
                KeyCode::Enter | KeyCode::Char('e') => {
                    if let Some(index) = app.doc.unrender_via(app.cursor, &TailCaret) {
                        app.cursor = index;
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let editing = app.doc.editable_index().is_some();
    let mut lines: Vec<Line> = Vec::new();

    for (index, block) in app.doc.blocks().iter().enumerate() {
        let selected = !editing && index == app.cursor;
        match block {
            Block::Editable(editable) => {
                lines.push(editable_line(&editable.buffer, editable.selection.start));
            }
            Block::Rendered(block) => {
                for line in rendered_lines(block) {
                    lines.push(if selected {
                        line.style(Style::default().bg(Color::DarkGray))
                    } else {
                        line
                    });
                }
            }
        }
        lines.push(Line::from(""));
    }

    let title = format!(
        "{}{}",
        app.path.display(),
        if app.is_dirty() { " [+]" } else { "" }
    );
    let content =
        Paragraph::new(lines).block(Pane::default().borders(Borders::ALL).title(title));
    f.render_widget(content, chunks[0]);

    let help = if editing {
        "Esc: render | Enter: split | ←→↑↓: caret/blocks | ^S: save | ^Z/^Y: undo/redo"
    } else {
        "q: quit | ↑↓/jk: select | Enter/e: edit | ^S: save | ^Z/^Y: undo/redo"
    };
    let footer = Paragraph::new(vec![
        Line::from(Span::styled(
            app.status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(help),
    ]);
    f.render_widget(footer, chunks[1]);
}

/// The editable buffer with a visible caret marker.
fn editable_line(buffer: &str, caret: usize) -> Line<'static> {
    let chars: Vec<char> = buffer.chars().collect();
    let at = caret.min(chars.len());
    let head: String = chars[..at].iter().collect();
    let tail: String = chars[at..].iter().collect();
    Line::from(vec![
        Span::styled(head, Style::default().fg(Color::White).bg(Color::Blue)),
        Span::styled(
            "▏",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(tail, Style::default().fg(Color::White).bg(Color::Blue)),
    ])
}

/// Display lines for a rendered block, styled per kind.
fn rendered_lines(block: &RenderedBlock) -> Vec<Line<'static>> {
    match block.kind {
        BlockKind::List => block
            .child_texts()
            .into_iter()
            .map(|item| Line::from(format!("• {item}")))
            .collect(),
        BlockKind::OrderedList => block
            .child_texts()
            .into_iter()
            .enumerate()
            .map(|(n, item)| Line::from(format!("{}. {item}", n + 1)))
            .collect(),
        BlockKind::BlockQuote => block
            .child_texts()
            .into_iter()
            .map(|quoted| {
                Line::from(Span::styled(
                    format!("▌ {quoted}"),
                    Style::default().fg(Color::Green),
                ))
            })
            .collect(),
        BlockKind::Code => block
            .raw
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Cyan),
                ))
            })
            .collect(),
        BlockKind::Paragraph | BlockKind::Other => {
            vec![Line::from(block.text.clone())]
        }
    }
}
