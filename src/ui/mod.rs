//! User Interface module
//!
//! Provides the TUI (Terminal User Interface) and simple CLI output for the
//! one-shot commands.

/// TUI application state and rendering
pub mod tui;

/// Simple CLI output functions
pub mod cli;

/// Interactive loop driving the session controller
pub mod ui_manager;

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::session::{Notice, NoticeLevel};

const MAX_NOTIFICATIONS: usize = 50;

/// What typed characters currently edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Line sent to the active session
    Input,
    /// New name for the session with this id
    Rename { id: String },
}

/// A notice as shown in the status line
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl From<Notice> for Notification {
    fn from(notice: Notice) -> Self {
        Self {
            level: notice.level,
            message: notice.message,
            timestamp: Local::now(),
        }
    }
}

/// Application state for UI components
#[derive(Debug, Clone)]
pub struct AppState {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub rename_buffer: String,
    pub notifications: VecDeque<Notification>,
    pub show_help: bool,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Input,
            input_buffer: String::new(),
            rename_buffer: String::new(),
            notifications: VecDeque::new(),
            show_help: false,
        }
    }

    pub fn push_notification(&mut self, notice: Notice) {
        self.notifications.push_back(notice.into());
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.push_notification(Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        });
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    /// Take the typed line, leaving the buffer empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input_buffer)
    }

    /// Start editing the name of session `id`, prefilled with its current name
    pub fn begin_rename(&mut self, id: impl Into<String>, current_name: &str) {
        self.input_mode = InputMode::Rename { id: id.into() };
        self.rename_buffer = current_name.to_string();
    }

    pub fn cancel_rename(&mut self) {
        self.input_mode = InputMode::Input;
        self.rename_buffer.clear();
    }

    /// Finish renaming; returns the session id and the entered name
    pub fn finish_rename(&mut self) -> Option<(String, String)> {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Input);
        let name = std::mem::take(&mut self.rename_buffer);
        match mode {
            InputMode::Rename { id } => Some((id, name)),
            InputMode::Input => None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_flow() {
        let mut app = AppState::new();
        app.begin_rename("s1", "Session 1");
        assert_eq!(app.rename_buffer, "Session 1");

        app.rename_buffer.push_str(" (build)");
        assert_eq!(
            app.finish_rename(),
            Some(("s1".to_string(), "Session 1 (build)".to_string()))
        );
        assert_eq!(app.input_mode, InputMode::Input);
        assert!(app.finish_rename().is_none());
    }

    #[test]
    fn test_notifications_are_capped() {
        let mut app = AppState::new();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            app.notify(format!("message {}", i));
        }
        assert_eq!(app.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(
            app.latest_notification().unwrap().message,
            format!("message {}", MAX_NOTIFICATIONS + 4)
        );
    }

    #[test]
    fn test_take_input_clears_buffer() {
        let mut app = AppState::new();
        app.input_buffer.push_str("ls");
        assert_eq!(app.take_input(), "ls");
        assert!(app.input_buffer.is_empty());
    }
}
