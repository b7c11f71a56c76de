//! Main TUI application state and logic

use crate::analyzer::CParse;
use crate::grammar::Grammar;
use crate::parser::diagnostics::Diagnostic;
use crate::parser::engine::ParseStatus;
use crate::parser::token::Token;
use crate::trace::{TraceAction, TraceRecorder, TraceStep};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::{Duration, Instant};

use super::panes::{SourceRenderData, SourceScrollState, StatusRenderData};

/// Delay between steps in auto-play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(250);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Input,
    Stack,
    Diagnostics,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> input -> stack -> diagnostics)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Input,
            FocusedPane::Input => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Input => FocusedPane::Source,
            FocusedPane::Stack => FocusedPane::Input,
            FocusedPane::Diagnostics => FocusedPane::Stack,
        }
    }
}

/// The main application state
pub struct App {
    /// The source code that was parsed
    pub source_code: String,
    pub tokens: Vec<Token>,
    pub trace: TraceRecorder,
    pub diagnostics: Vec<Diagnostic>,
    pub status: ParseStatus,

    /// Nonterminal names, for coloring the stack
    pub nonterminals: FxHashSet<String>,

    /// Index of the selected trace step
    pub current_step: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub input_scroll: usize,
    pub stack_scroll: usize,
    pub diagnostics_scroll: usize,

    /// Keep the lookahead centered in the input pane; cleared by manual scrolling
    pub input_follow: bool,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app over a finished parse of `source_code`
    pub fn new(source_code: String, parse: CParse, grammar: &Grammar) -> Self {
        let nonterminals = grammar
            .nonterminal_ids()
            .map(|nt| grammar.nonterminal_name(nt).to_string())
            .collect();
        let status_message = if parse.outcome.trace.is_empty() {
            String::from("No trace recorded")
        } else {
            String::from("Ready!")
        };

        App {
            source_code,
            tokens: parse.tokens,
            trace: parse.outcome.trace,
            diagnostics: parse.outcome.diagnostics,
            status: parse.outcome.status,
            nonterminals,
            current_step: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState {
                offset: 0,
                target_line_row: None, // Will be set to center on first render
            },
            input_scroll: 0,
            stack_scroll: 0,
            diagnostics_scroll: 0,
            input_follow: true,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// The selected trace step
    pub fn current(&self) -> Option<&TraceStep> {
        self.trace.get(self.current_step)
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
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
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(pane_area);

        // Left column: Source (top) | Input (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Stack (top) | Diagnostics (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[1]);

        let step = self.trace.get(self.current_step);
        let lookahead = step.and_then(|s| self.tokens.get(s.cursor));

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source_code: &self.source_code,
                current_line: step.map_or(0, |s| s.location.line),
                current_column: step.map_or(0, |s| s.location.column),
                token_len: lookahead.map_or(0, |t| t.text.chars().count()),
                is_error: step.is_some_and(|s| matches!(s.action, TraceAction::Error { .. })),
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_input_pane(
            frame,
            left_rows[1],
            &self.tokens,
            step,
            self.focused_pane == FocusedPane::Input,
            &mut self.input_scroll,
            self.input_follow,
        );

        super::panes::render_stack_pane(
            frame,
            right_rows[0],
            step,
            &self.nonterminals,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        super::panes::render_diagnostics_pane(
            frame,
            right_rows[1],
            &self.diagnostics,
            step.map(|s| s.location),
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            StatusRenderData {
                message: &self.status_message,
                current_step: self.current_step,
                total_steps: self.trace.len(),
                truncated: self.trace.is_truncated(),
                status: self.status,
                is_playing: self.is_playing,
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if !self.step_forward() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Char('e') => {
                self.is_playing = false;
                self.next_error();
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last step".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Input => {
                    self.input_follow = false;
                    self.input_scroll = self.input_scroll.saturating_sub(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_sub(1);
                }
                FocusedPane::Diagnostics => {
                    self.diagnostics_scroll = self.diagnostics_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling down makes the current line move up visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Input => {
                    self.input_follow = false;
                    self.input_scroll = self.input_scroll.saturating_add(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_add(1);
                }
                FocusedPane::Diagnostics => {
                    self.diagnostics_scroll = self.diagnostics_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to_start();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Select the next step; `false` at the last one
    pub fn step_forward(&mut self) -> bool {
        if self.current_step + 1 < self.trace.len() {
            self.current_step += 1;
            self.input_follow = true;
            true
        } else {
            false
        }
    }

    /// Select the previous step; `false` at the first one
    pub fn step_backward(&mut self) -> bool {
        if self.current_step > 0 {
            self.current_step -= 1;
            self.input_follow = true;
            true
        } else {
            false
        }
    }

    pub fn jump_to_start(&mut self) {
        self.current_step = 0;
        self.input_follow = true;
    }

    pub fn jump_to_end(&mut self) {
        self.current_step = self.trace.len().saturating_sub(1);
        self.input_follow = true;
    }

    /// Select the next step that reports a syntax error
    pub fn next_error(&mut self) {
        let found = self
            .trace
            .steps()
            .iter()
            .skip(self.current_step + 1)
            .find(|s| matches!(s.action, TraceAction::Error { .. }))
            .map(|s| s.index);

        match found {
            Some(index) => {
                self.current_step = index;
                self.input_follow = true;
                self.status_message = format!("Error at step {}", index + 1);
            }
            None => {
                self.status_message = "No further errors".to_string();
            }
        }
    }
}
