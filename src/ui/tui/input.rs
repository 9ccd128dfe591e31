use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::UiAction;
use crate::remote::SessionRecord;
use crate::ui::{AppState, InputMode};

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: i32 = 10;

/// Handle keyboard events for TUI, returning actions for the controller.
/// `active` is the foreground session, if any.
pub fn handle_key_event(
    app: &mut AppState,
    key_event: KeyEvent,
    active: Option<&SessionRecord>,
) -> UiAction {
    if key_event.kind == KeyEventKind::Release {
        return UiAction::None;
    }

    // Global shortcuts first
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        match key_event.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                app.should_quit = true;
                return UiAction::QuitRequested;
            }
            KeyCode::Char('n') => return UiAction::CreateSession,
            KeyCode::Char('w') => {
                return if active.is_some() {
                    UiAction::DeleteActive
                } else {
                    app.notify("No active session to delete");
                    UiAction::None
                };
            }
            KeyCode::Char('r') => {
                match active {
                    Some(record) => app.begin_rename(record.id.clone(), &record.name),
                    None => app.notify("No active session to rename"),
                }
                return UiAction::None;
            }
            KeyCode::Char('t') => return UiAction::ToggleTheme,
            KeyCode::Char('l') => return UiAction::RefreshSessions,
            _ => {}
        }
    }

    if key_event.modifiers.contains(KeyModifiers::ALT) {
        match key_event.code {
            KeyCode::Up => return UiAction::CyclePrevious,
            KeyCode::Down => return UiAction::CycleNext,
            KeyCode::Char(c @ '1'..='9') => {
                return UiAction::SelectIndex(c as usize - '1' as usize);
            }
            _ => {}
        }
    }

    match key_event.code {
        KeyCode::PageUp => return UiAction::Scroll(SCROLL_STEP),
        KeyCode::PageDown => return UiAction::Scroll(-SCROLL_STEP),
        KeyCode::F(1) => {
            app.toggle_help();
            return UiAction::None;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Input => handle_input_mode_keys(app, key_event),
        InputMode::Rename { .. } => handle_rename_mode_keys(app, key_event),
    }
}

fn handle_input_mode_keys(app: &mut AppState, key_event: KeyEvent) -> UiAction {
    match key_event.code {
        KeyCode::Enter => {
            let line = app.take_input();
            if line.trim().is_empty() {
                UiAction::None
            } else {
                UiAction::SendInput(line)
            }
        }
        KeyCode::Esc => {
            app.input_buffer.clear();
            UiAction::None
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
            UiAction::None
        }
        KeyCode::Char(c) => {
            if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
                app.input_buffer.push(c);
            }
            UiAction::None
        }
        _ => UiAction::None,
    }
}

fn handle_rename_mode_keys(app: &mut AppState, key_event: KeyEvent) -> UiAction {
    match key_event.code {
        KeyCode::Esc => {
            app.cancel_rename();
            UiAction::None
        }
        KeyCode::Enter => match app.finish_rename() {
            Some((id, name)) => UiAction::RenameSession { id, name },
            None => UiAction::None,
        },
        KeyCode::Backspace => {
            app.rename_buffer.pop();
            UiAction::None
        }
        KeyCode::Char(c) => {
            if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
                app.rename_buffer.push(c);
            }
            UiAction::None
        }
        _ => UiAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key_event(app, key(KeyCode::Char(c)), None);
        }
    }

    #[test]
    fn test_enter_sends_line() {
        let mut app = AppState::new();
        type_text(&mut app, "ls");

        let action = handle_key_event(&mut app, key(KeyCode::Enter), None);
        assert_eq!(action, UiAction::SendInput("ls".to_string()));
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_blank_line_is_not_sent() {
        let mut app = AppState::new();
        type_text(&mut app, "   ");
        assert_eq!(
            handle_key_event(&mut app, key(KeyCode::Enter), None),
            UiAction::None
        );
    }

    #[test]
    fn test_alt_arrows_cycle_sessions() {
        let mut app = AppState::new();
        assert_eq!(
            handle_key_event(&mut app, with(KeyCode::Up, KeyModifiers::ALT), None),
            UiAction::CyclePrevious
        );
        assert_eq!(
            handle_key_event(&mut app, with(KeyCode::Down, KeyModifiers::ALT), None),
            UiAction::CycleNext
        );
        assert_eq!(
            handle_key_event(&mut app, with(KeyCode::Char('3'), KeyModifiers::ALT), None),
            UiAction::SelectIndex(2)
        );
    }

    #[test]
    fn test_rename_prefills_and_submits() {
        let mut app = AppState::new();
        let record = SessionRecord::new("s1", "Session 1");

        let action = handle_key_event(
            &mut app,
            with(KeyCode::Char('r'), KeyModifiers::CONTROL),
            Some(&record),
        );
        assert_eq!(action, UiAction::None);
        assert_eq!(
            app.input_mode,
            InputMode::Rename {
                id: "s1".to_string()
            }
        );

        for _ in 0.."Session 1".len() {
            handle_key_event(&mut app, key(KeyCode::Backspace), Some(&record));
        }
        type_text(&mut app, "build");
        assert_eq!(
            handle_key_event(&mut app, key(KeyCode::Enter), Some(&record)),
            UiAction::RenameSession {
                id: "s1".to_string(),
                name: "build".to_string()
            }
        );
        assert_eq!(app.input_mode, InputMode::Input);
    }

    #[test]
    fn test_delete_requires_active_session() {
        let mut app = AppState::new();
        assert_eq!(
            handle_key_event(&mut app, with(KeyCode::Char('w'), KeyModifiers::CONTROL), None),
            UiAction::None
        );
        assert!(app.latest_notification().is_some());

        let record = SessionRecord::new("s1", "Session 1");
        assert_eq!(
            handle_key_event(
                &mut app,
                with(KeyCode::Char('w'), KeyModifiers::CONTROL),
                Some(&record)
            ),
            UiAction::DeleteActive
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = AppState::new();
        assert_eq!(
            handle_key_event(&mut app, with(KeyCode::Char('c'), KeyModifiers::CONTROL), None),
            UiAction::QuitRequested
        );
        assert!(app.should_quit);
    }
}
