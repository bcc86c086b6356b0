//! Main TUI application
//!
//! Event-driven application that coordinates:
//! - Terminal rendering with ratatui
//! - User input handling
//! - Session updates from the controller
//!
//! The app decides which gesture counts as a drill-down (Enter on a
//! selected node) and forwards it to the session controller; everything
//! stateful about the map lives on the controller side.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tracing::{debug, info};

use super::event::{AppEvent, EventLoop, InputEvent, UserCommand};
use super::theme::Theme;
use super::widgets::{flatten_tree, DetailState, DetailView, MapRow, MapTree, MapTreeState};
use crate::config::Config;
use crate::error::{Result, TuiError};
use crate::generation::HttpGenerationClient;
use crate::session::{NodeActivation, SessionController, SessionEvent, SessionView};

/// Which pane receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Typing into the prompt bar
    Prompt,
    /// Navigating the map
    #[default]
    Map,
}

/// Application UI state
pub struct AppUiState {
    /// Current focus
    pub focus: Focus,
    /// Prompt bar text buffer
    pub input: String,
    /// Map selection state
    pub map_state: MapTreeState,
    /// Detail pane scroll state
    pub detail_state: DetailState,
    /// Flattened rows of the current tree
    pub rows: Vec<MapRow>,
    /// Latest session view
    pub view: Option<SessionView>,
    /// Status line message (errors and hints)
    pub status_message: Option<String>,
    /// Whether the status message is an error
    pub status_is_error: bool,
    /// Pending-indicator state
    pub throbber: ThrobberState,
    /// Help overlay visible
    pub show_help: bool,
    /// Should quit
    pub should_quit: bool,
}

impl Default for AppUiState {
    fn default() -> Self {
        Self {
            focus: Focus::Prompt,
            input: String::new(),
            map_state: MapTreeState::new(),
            detail_state: DetailState::new(),
            rows: Vec::new(),
            view: None,
            status_message: None,
            status_is_error: false,
            throbber: ThrobberState::default(),
            show_help: false,
            should_quit: false,
        }
    }
}

/// Main TUI application
pub struct App {
    /// Configuration
    config: Config,
    /// Theme
    theme: Theme,
    /// Session controller (shared with spawned generation tasks)
    controller: Arc<SessionController<HttpGenerationClient>>,
    /// UI state
    ui: AppUiState,
    /// Event loop
    event_loop: EventLoop,
}

impl App {
    /// Create a new application
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpGenerationClient::new(&config)?;
        let (controller, session_rx) = SessionController::new(client);

        let event_loop = EventLoop::new();
        event_loop.forward_session_events(session_rx);

        Ok(Self {
            config,
            theme: Theme::default(),
            controller: Arc::new(controller),
            ui: AppUiState::default(),
            event_loop,
        })
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        let tick_rate = Duration::from_millis(1000 / u64::from(self.config.ui_refresh_fps));
        self.event_loop.start(tick_rate);

        let mut terminal = self.setup_terminal()?;

        info!("Entering main loop");
        let result = self.main_loop(&mut terminal).await;

        self.restore_terminal(&mut terminal)?;
        result
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| TuiError::InitFailed(e.to_string()))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| TuiError::InitFailed(e.to_string()))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| TuiError::InitFailed(e.to_string()))?;

        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        terminal
            .show_cursor()
            .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        Ok(())
    }

    /// Main event loop
    async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            // Refresh the session view and flattened rows
            let view = self.controller.view().await;
            self.ui.rows = view
                .tree
                .as_ref()
                .map(|tree| flatten_tree(tree))
                .unwrap_or_default();
            self.ui.map_state.set_row_count(self.ui.rows.len());
            if self.ui.map_state.selected().is_none() && !self.ui.rows.is_empty() {
                self.ui.map_state.select(Some(0));
            }
            self.ui.view = Some(view);

            terminal
                .draw(|f| self.render(f))
                .map_err(|e| TuiError::RenderError(e.to_string()))?;

            if let Some(event) = self.event_loop.next().await {
                match event {
                    AppEvent::Input(input) => self.handle_input(input).await,
                    AppEvent::Session(update) => self.handle_session_event(update).await,
                    AppEvent::Tick => {
                        if self.controller.is_pending() {
                            self.ui.throbber.calc_next();
                        }
                    }
                }
            }

            if self.ui.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        self.render_prompt_bar(frame, chunks[0]);
        self.render_map(frame, main_chunks[0]);
        self.render_detail(frame, main_chunks[1]);
        self.render_status_bar(frame, chunks[2]);

        if self.ui.show_help {
            self.render_help(frame, size);
        }
    }

    /// Render the prompt input bar
    fn render_prompt_bar(&self, frame: &mut Frame, area: Rect) {
        let is_focused = self.ui.focus == Focus::Prompt;

        let block = Block::default()
            .title(" Prompt ")
            .borders(Borders::ALL)
            .border_style(if is_focused {
                self.theme.border_focused()
            } else {
                self.theme.border_unfocused()
            });

        let text = if is_focused {
            format!("{}_", self.ui.input)
        } else {
            self.ui.input.clone()
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(self.theme.text_primary))
            .block(block);
        frame.render_widget(paragraph, area);
    }

    /// Render the map pane
    fn render_map(&mut self, frame: &mut Frame, area: Rect) {
        let is_focused = self.ui.focus == Focus::Map;

        let title = match self.ui.view.as_ref().and_then(|v| v.history_position) {
            Some(position) => {
                let len = self.ui.view.as_ref().map_or(0, |v| v.history_len);
                format!(" Mind Map ({}/{}) ", position + 1, len)
            }
            None => " Mind Map ".to_string(),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if is_focused {
                self.theme.border_focused()
            } else {
                self.theme.border_unfocused()
            });

        if self.ui.rows.is_empty() {
            let hint = Paragraph::new("\n Enter a prompt and press Enter to generate a mind map.")
                .style(Style::default().fg(self.theme.text_secondary))
                .block(block);
            frame.render_widget(hint, area);
            return;
        }

        let map = MapTree::new(&self.ui.rows, &self.theme).block(block);
        frame.render_stateful_widget(map, area, &mut self.ui.map_state.list_state);
    }

    /// Render the node detail pane
    fn render_detail(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Node ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_unfocused());

        let content = match self.selected_row() {
            Some(row) => match &row.description {
                Some(description) => format!("{}\n\n{}", row.label, description),
                None => format!("{}\n\n(no description)", row.label),
            },
            None => String::new(),
        };

        let inner_height = area.height.saturating_sub(2);
        self.ui.detail_state.set_content(&content, inner_height);

        let detail = DetailView::new(&content)
            .block(block)
            .scroll(self.ui.detail_state.scroll_offset);
        frame.render_widget(detail, area);
    }

    /// Render the status bar
    fn render_status_bar(&mut self, frame: &mut Frame, area: Rect) {
        let pending = self.ui.view.as_ref().is_some_and(|v| v.pending);

        if pending {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(16), Constraint::Min(0)])
                .split(area);

            let throbber = Throbber::default()
                .label("generating…")
                .style(Style::default().fg(self.theme.pending));
            frame.render_stateful_widget(throbber, chunks[0], &mut self.ui.throbber);

            let rest = Paragraph::new(self.status_text()).style(self.theme.status_bar());
            frame.render_widget(rest, chunks[1]);
        } else if let Some(ref message) = self.ui.status_message {
            let style = if self.ui.status_is_error {
                Style::default()
                    .fg(self.theme.error)
                    .add_modifier(Modifier::BOLD)
            } else {
                self.theme.status_bar()
            };
            let paragraph = Paragraph::new(message.clone()).style(style);
            frame.render_widget(paragraph, area);
        } else {
            let paragraph = Paragraph::new(self.status_text()).style(self.theme.status_bar());
            frame.render_widget(paragraph, area);
        }
    }

    fn status_text(&self) -> String {
        let (nodes, back, forward) = match self.ui.view.as_ref() {
            Some(view) => (
                view.tree.as_ref().map_or(0, |t| t.node_count()),
                view.can_go_back,
                view.can_go_forward,
            ),
            None => (0, false, false),
        };

        let back_marker = if back { "◀" } else { " " };
        let forward_marker = if forward { "▶" } else { " " };

        format!(
            " {}{} | {} nodes | Enter: drill down | i: prompt | ?: help | q: quit",
            back_marker, forward_marker, nodes
        )
    }

    /// Render help overlay
    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let modal_area = centered_rect(70, 80, area);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.modal_info));

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let help_text = r#"
Prompt:
  i, /            Focus the prompt bar
  n               Clear the prompt and start typing
  Enter           Submit the prompt (generates a new map)
  Esc             Back to the map

Map:
  j/k, Up/Down    Move selection
  Enter           Drill into the selected node
  Left/Right, [ ] Back / forward through map versions

Detail pane:
  Ctrl+u/d        Page up/down
  PgUp/PgDn       Page up/down

Other:
  ?               Show this help
  q               Quit

Press any key to close this help.
"#;

        let paragraph = Paragraph::new(help_text);
        frame.render_widget(paragraph, inner);
    }

    fn selected_row(&self) -> Option<&MapRow> {
        self.ui
            .map_state
            .selected()
            .and_then(|i| self.ui.rows.get(i))
    }

    /// Handle input events
    async fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Key(key) => {
                if self.ui.show_help {
                    self.ui.show_help = false;
                    return;
                }

                match self.ui.focus {
                    Focus::Prompt => self.handle_prompt_key(key),
                    Focus::Map => {
                        if let Some(cmd) = UserCommand::from_key(key) {
                            self.handle_command(cmd).await;
                        }
                    }
                }
            }
            InputEvent::Resize(_, _) => {
                // Terminal will re-render automatically
            }
            InputEvent::Mouse(_) => {}
        }
    }

    /// Handle key input while the prompt bar is focused
    fn handle_prompt_key(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => {
                self.submit_prompt();
            }
            (KeyCode::Esc, _) | (KeyCode::Tab, _) => {
                self.ui.focus = Focus::Map;
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.ui.should_quit = true;
            }
            (KeyCode::Backspace, _) => {
                self.ui.input.pop();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.ui.input.push(c);
            }
            _ => {}
        }
    }

    /// Handle a map-pane command
    async fn handle_command(&mut self, cmd: UserCommand) {
        match cmd {
            UserCommand::NavigateUp => {
                self.ui.map_state.previous();
                self.ui.detail_state.scroll_to_top();
            }
            UserCommand::NavigateDown => {
                self.ui.map_state.next();
                self.ui.detail_state.scroll_to_top();
            }
            UserCommand::DrillDown => {
                if let Some(row) = self.selected_row() {
                    let activation =
                        NodeActivation::drill_down(row.label.clone(), row.description.clone());
                    debug!(label = %activation.label, "drill-down requested");
                    let controller = Arc::clone(&self.controller);
                    tokio::spawn(async move {
                        // Failures surface through the session event channel
                        let _ = controller.activate(activation).await;
                    });
                }
            }
            UserCommand::HistoryBack => {
                if self.controller.back().await {
                    self.sync_input_from_session().await;
                }
            }
            UserCommand::HistoryForward => {
                if self.controller.forward().await {
                    self.sync_input_from_session().await;
                }
            }
            UserCommand::FocusPrompt => {
                self.ui.focus = Focus::Prompt;
            }
            UserCommand::NewPrompt => {
                self.ui.input.clear();
                self.ui.focus = Focus::Prompt;
            }
            UserCommand::ScrollUp => self.ui.detail_state.scroll_up(1),
            UserCommand::ScrollDown => self.ui.detail_state.scroll_down(1),
            UserCommand::PageUp => self.ui.detail_state.page_up(),
            UserCommand::PageDown => self.ui.detail_state.page_down(),
            UserCommand::ShowHelp => {
                self.ui.show_help = true;
            }
            UserCommand::Quit => {
                self.ui.should_quit = true;
            }
        }
    }

    /// Submit the prompt bar contents
    fn submit_prompt(&mut self) {
        let prompt = self.ui.input.trim().to_string();
        if prompt.is_empty() {
            self.set_status("Prompt is empty", true);
            return;
        }

        self.ui.focus = Focus::Map;
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            // Failures surface through the session event channel
            let _ = controller.submit(&prompt).await;
        });
    }

    /// Handle session updates from the controller
    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::GenerationStarted { prompt } => {
                debug!(%prompt, "generation started");
                self.ui.status_message = None;
            }
            SessionEvent::TreeUpdated { source_input, .. } => {
                self.ui.input = source_input;
                self.ui.map_state.select(Some(0));
                self.ui.detail_state.scroll_to_top();
                self.ui.status_message = None;
            }
            SessionEvent::GenerationFailed { message } => {
                self.set_status(&format!("Generation failed: {message}"), true);
            }
            SessionEvent::SubmissionRejected => {
                self.set_status("A generation is already running", false);
            }
            SessionEvent::HistoryMoved { .. } => {
                self.sync_input_from_session().await;
            }
        }
    }

    async fn sync_input_from_session(&mut self) {
        let view = self.controller.view().await;
        self.ui.input = view.current_input.clone();
        self.ui.map_state.select(Some(0));
        self.ui.detail_state.scroll_to_top();
        self.ui.view = Some(view);
    }

    fn set_status(&mut self, message: &str, is_error: bool) {
        self.ui.status_message = Some(message.to_string());
        self.ui.status_is_error = is_error;
    }
}

/// Compute a centered rect using percentages of the available area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_centered() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert_eq!(centered.width, 50);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.height < area.height);
    }
}
