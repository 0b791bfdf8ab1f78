//! Main TUI application state and logic

use crate::parser::print::{TokenStyle, TreeStyle};
use crate::parser::{Lexer, Token};
use crate::session::Session;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Input,
    Tokens,
    Tree,
}

impl FocusedPane {
    /// Move focus to the next pane (input -> tokens -> tree)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Input => FocusedPane::Tokens,
            FocusedPane::Tokens => FocusedPane::Tree,
            FocusedPane::Tree => FocusedPane::Input,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Input => FocusedPane::Tree,
            FocusedPane::Tokens => FocusedPane::Input,
            FocusedPane::Tree => FocusedPane::Tokens,
        }
    }
}

/// The main application state
pub struct App {
    /// Analyzed programs so far
    pub session: Session,

    /// Program being edited and the cursor, as a byte offset into it
    pub input: String,
    pub cursor: usize,

    /// Classification of a failed submission, shown in place of its tokens
    pub scanned: Vec<Token>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub tokens_scroll: usize,
    pub tree_scroll: usize,

    pub token_style: TokenStyle,
    pub tree_style: TreeStyle,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app over `session` with `input` preloaded
    pub fn new(session: Session, input: String) -> Self {
        let cursor = input.len();
        App {
            session,
            input,
            cursor,
            scanned: Vec::new(),
            focused_pane: FocusedPane::Input,
            tokens_scroll: 0,
            tree_scroll: 0,
            token_style: TokenStyle::default(),
            tree_style: TreeStyle::default(),
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    pub fn with_styles(mut self, token_style: TokenStyle, tree_style: TreeStyle) -> Self {
        self.token_style = token_style;
        self.tree_style = tree_style;
        self
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(size);

        // Bottom half: Tokens | Tree
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[1]);

        let current = self.session.current();

        // Only mark the error while the buffer still holds the failed program
        let error_at = current
            .filter(|s| s.source == self.input)
            .and_then(|s| s.error())
            .map(|e| e.location().offset);

        super::panes::render_input_pane(
            frame,
            main_chunks[0],
            &self.input,
            self.cursor,
            self.session.classifier(),
            error_at,
            self.focused_pane == FocusedPane::Input,
        );

        let tokens = current.map(|s| match s.analysis() {
            Some(analysis) => super::panes::TokensRenderData {
                tokens: &analysis.tokens,
                unvalidated: false,
                style: self.token_style,
            },
            None => super::panes::TokensRenderData {
                tokens: &self.scanned,
                unvalidated: true,
                style: self.token_style,
            },
        });
        super::panes::render_tokens_pane(
            frame,
            columns[0],
            tokens,
            self.focused_pane == FocusedPane::Tokens,
            &mut self.tokens_scroll,
        );

        super::panes::render_tree_pane(
            frame,
            columns[1],
            current.map(|s| s.outcome.as_ref().map(|a| &a.ast)),
            self.tree_style,
            self.focused_pane == FocusedPane::Tree,
            &mut self.tree_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[2],
            super::panes::StatusRenderData {
                message: &self.status_message,
                position: current.map(|_| (self.session.history_position(), self.session.len())),
                error_category: current.and_then(|s| s.error()).map(|e| e.category()),
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') | KeyCode::Char('d') = key.code {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char(c) => {
                self.focused_pane = FocusedPane::Input;
                self.input.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.input.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.input.replace_range(self.cursor..next, "");
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Input => self.recall(Recall::Older),
                FocusedPane::Tokens => {
                    self.tokens_scroll = self.tokens_scroll.saturating_sub(1);
                }
                FocusedPane::Tree => {
                    self.tree_scroll = self.tree_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Input => self.recall(Recall::Newer),
                FocusedPane::Tokens => {
                    self.tokens_scroll = self.tokens_scroll.saturating_add(1);
                }
                FocusedPane::Tree => {
                    self.tree_scroll = self.tree_scroll.saturating_add(1);
                }
            },
            KeyCode::PageUp => match self.focused_pane {
                FocusedPane::Tokens => self.tokens_scroll = self.tokens_scroll.saturating_sub(PAGE),
                FocusedPane::Tree => self.tree_scroll = self.tree_scroll.saturating_sub(PAGE),
                FocusedPane::Input => {}
            },
            KeyCode::PageDown => match self.focused_pane {
                FocusedPane::Tokens => self.tokens_scroll = self.tokens_scroll.saturating_add(PAGE),
                FocusedPane::Tree => self.tree_scroll = self.tree_scroll.saturating_add(PAGE),
                FocusedPane::Input => {}
            },
            _ => {}
        }
    }

    /// Analyze the input buffer and make it the current submission
    fn submit(&mut self) {
        if self.input.trim().is_empty() {
            self.status_message = "Nothing to analyze".to_string();
            return;
        }

        let submission = self.session.submit(&self.input);
        self.status_message = match &submission.outcome {
            Ok(analysis) => format!(
                "Accepted: {} tokens, {} nodes",
                analysis.tokens.len(),
                analysis.ast.node_count()
            ),
            Err(err) => err.to_string(),
        };
        self.refresh_scan();
        self.tokens_scroll = 0;
        self.tree_scroll = 0;
    }

    /// Load an older or newer submission into the input buffer
    fn recall(&mut self, direction: Recall) {
        let step = match direction {
            Recall::Older => self.session.step_backward(),
            Recall::Newer => self.session.step_forward(),
        };
        let Some(submission) = step else {
            self.status_message = match direction {
                Recall::Older => "Already at the oldest program".to_string(),
                Recall::Newer => "Already at the newest program".to_string(),
            };
            return;
        };

        self.input = submission.source.clone();
        self.cursor = self.input.len();
        self.status_message = format!("Recalled program {}", self.session.history_position() + 1);
        self.refresh_scan();
        self.tokens_scroll = 0;
        self.tree_scroll = 0;
    }

    fn refresh_scan(&mut self) {
        self.scanned = match self.session.current() {
            Some(submission) if !submission.is_ok() => {
                // Tokens before a lexical error still show
                Lexer::new(&submission.source, self.session.classifier())
                    .scan_prefix()
                    .0
            }
            _ => Vec::new(),
        };
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.input[..self.cursor]
            .chars()
            .next_back()
            .map(|c| self.cursor - c.len_utf8())
    }

    fn next_boundary(&self) -> Option<usize> {
        self.input[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

#[derive(Debug, Clone, Copy)]
enum Recall {
    Older,
    Newer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Dialect;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        App::new(Session::new(Dialect::Scheme), String::new())
    }

    #[test]
    fn test_typing_and_submitting() {
        let mut app = app();
        type_str(&mut app, "{ x = 1 ; }");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.len(), 1);
        assert!(app.session.current().unwrap().is_ok());
        assert_eq!(app.status_message, "Accepted: 6 tokens, 3 nodes");
    }

    #[test]
    fn test_failed_submission_keeps_classification() {
        let mut app = app();
        type_str(&mut app, "{ 5 5 ; }");
        press(&mut app, KeyCode::Enter);

        assert!(!app.session.current().unwrap().is_ok());
        assert_eq!(app.scanned.len(), 5);
    }

    #[test]
    fn test_lexical_error_keeps_tokens_before_it() {
        let mut app = app();
        type_str(&mut app, "{ x = 1 ? ; }");
        press(&mut app, KeyCode::Enter);

        let texts: Vec<&str> = app.scanned.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["{", "x", "=", "1"]);
    }

    #[test]
    fn test_empty_input_is_not_submitted() {
        let mut app = app();
        type_str(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(app.session.is_empty());
        assert_eq!(app.status_message, "Nothing to analyze");
    }

    #[test]
    fn test_cursor_editing() {
        let mut app = app();
        type_str(&mut app, "{ x ; }");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        type_str(&mut app, " = 1");
        assert_eq!(app.input, "{ x = 1 ; }");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, " x = 1 ; }");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, " x = 1 ; ");
    }

    #[test]
    fn test_history_recall() {
        let mut app = app();
        type_str(&mut app, "{ a = 1 ; }");
        press(&mut app, KeyCode::Enter);
        app.input.clear();
        app.cursor = 0;
        type_str(&mut app, "{ b = 2 ; }");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.input, "{ a = 1 ; }");
        assert_eq!(app.cursor, app.input.len());

        press(&mut app, KeyCode::Up);
        assert_eq!(app.status_message, "Already at the oldest program");

        press(&mut app, KeyCode::Down);
        assert_eq!(app.input, "{ b = 2 ; }");
    }

    #[test]
    fn test_focus_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Tokens);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_pane, FocusedPane::Input);

        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
