//! Terminal User Interface implementation
//!
//! Provides the main TUI interface using ratatui.

mod input;
mod render;

use std::io::{Stdout, stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use super::AppState;
use crate::AppResult;
use crate::session::SessionController;

pub use input::handle_key_event;
pub use render::{TerminalView, render_root};

/// Actions generated from key handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    None,
    SendInput(String),
    CreateSession,
    DeleteActive,
    RenameSession { id: String, name: String },
    RefreshSessions,
    ToggleTheme,
    CyclePrevious,
    CycleNext,
    SelectIndex(usize),
    Scroll(i32),
    QuitRequested,
}

/// RAII helper controlling the terminal lifecycle
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Create a new TUI terminal instance
    pub fn new() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    /// Render the application; returns the terminal pane area
    pub fn draw(&mut self, app: &AppState, controller: &SessionController) -> AppResult<Rect> {
        let mut pane = Rect::default();
        self.terminal.draw(|frame| {
            pane = render_root(frame, app, controller);
        })?;
        Ok(pane)
    }

    /// Restore terminal to canonical mode
    pub fn restore(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Attempt to restore the terminal; ignore errors because we are in Drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
