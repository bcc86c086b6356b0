//! Event handling for the TUI
//!
//! Provides an async event stream that combines:
//! - Terminal input events (keyboard, mouse)
//! - Session updates from the controller
//! - Render ticks

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::SessionEvent;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Terminal input event
    Input(InputEvent),
    /// Session update from the controller
    Session(SessionEvent),
    /// Render tick
    Tick,
}

/// Input events from the terminal
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key press
    Key(KeyEvent),
    /// Mouse event (if enabled)
    Mouse(crossterm::event::MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// User commands triggered by input while the map pane has focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Move selection up in the map
    NavigateUp,
    /// Move selection down in the map
    NavigateDown,
    /// Drill into the selected node
    DrillDown,
    /// Step back to the previous tree version
    HistoryBack,
    /// Step forward to the next tree version
    HistoryForward,
    /// Focus the prompt bar
    FocusPrompt,
    /// Clear the prompt bar and focus it
    NewPrompt,
    /// Scroll the detail pane up
    ScrollUp,
    /// Scroll the detail pane down
    ScrollDown,
    /// Page up in the detail pane
    PageUp,
    /// Page down in the detail pane
    PageDown,
    /// Show help
    ShowHelp,
    /// Quit application
    Quit,
}

impl UserCommand {
    /// Convert a key event to a map-pane command
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        match (key.code, key.modifiers) {
            // Map navigation
            (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                Some(UserCommand::NavigateUp)
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                Some(UserCommand::NavigateDown)
            }

            // Drill-down gesture
            (KeyCode::Enter, _) => Some(UserCommand::DrillDown),

            // Linear history
            (KeyCode::Left, _) | (KeyCode::Char('['), KeyModifiers::NONE) => {
                Some(UserCommand::HistoryBack)
            }
            (KeyCode::Right, _) | (KeyCode::Char(']'), KeyModifiers::NONE) => {
                Some(UserCommand::HistoryForward)
            }

            // Prompt entry
            (KeyCode::Char('i'), KeyModifiers::NONE) | (KeyCode::Char('/'), KeyModifiers::NONE) => {
                Some(UserCommand::FocusPrompt)
            }
            (KeyCode::Char('n'), KeyModifiers::NONE) => Some(UserCommand::NewPrompt),

            // Detail pane scrolling
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => Some(UserCommand::PageUp),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => Some(UserCommand::PageDown),
            (KeyCode::PageUp, _) => Some(UserCommand::PageUp),
            (KeyCode::PageDown, _) => Some(UserCommand::PageDown),

            // Help and quit
            (KeyCode::Char('?'), _) => Some(UserCommand::ShowHelp),
            (KeyCode::Char('q'), KeyModifiers::NONE) => Some(UserCommand::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(UserCommand::Quit),

            _ => None,
        }
    }
}

/// Event loop handle
pub struct EventLoop {
    /// Sender for events
    tx: mpsc::Sender<AppEvent>,
    /// Receiver for events
    rx: mpsc::Receiver<AppEvent>,
}

impl EventLoop {
    /// Create a new event loop
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(256);
        Self { tx, rx }
    }

    /// Get a sender for posting events
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    /// Start the event loop
    ///
    /// This spawns background tasks for:
    /// - Terminal input
    /// - Render ticks
    pub fn start(&mut self, tick_rate: Duration) {
        let tx = self.tx.clone();

        // Terminal input task - single long-running reader
        tokio::spawn(async move {
            let mut reader = EventStream::new();

            loop {
                let event = reader.next().fuse().await;

                match event {
                    Some(Ok(event)) => {
                        let app_event = match event {
                            CrosstermEvent::Key(key) => AppEvent::Input(InputEvent::Key(key)),
                            CrosstermEvent::Mouse(mouse) => {
                                AppEvent::Input(InputEvent::Mouse(mouse))
                            }
                            CrosstermEvent::Resize(w, h) => {
                                AppEvent::Input(InputEvent::Resize(w, h))
                            }
                            _ => continue,
                        };

                        if tx.send(app_event).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("Error reading terminal event: {}", e);
                        continue;
                    }
                    None => break,
                }
            }
        });

        // Render tick task
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);

            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Forward session events from the controller into the event stream
    pub fn forward_session_events(&self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if tx.send(AppEvent::Session(event)).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
