mod header;
mod prompt;
mod sessions;
mod status;
mod terminal;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::session::SessionController;
use crate::ui::AppState;

use self::header::render_header;
use self::prompt::render_prompt;
use self::sessions::render_sessions;
use self::status::{render_help_overlay, render_status};
use self::terminal::render_terminal;

pub use self::terminal::TerminalView;

const SIDEBAR_WIDTH: u16 = 28;

/// Draw the whole view. Returns the area the terminal surface occupies.
pub fn render_root(frame: &mut Frame<'_>, app: &AppState, controller: &SessionController) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], controller);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(chunks[1]);

    render_sessions(frame, body_chunks[0], controller);
    let pane = render_terminal(frame, body_chunks[1], controller);

    render_prompt(frame, chunks[2], app, controller);
    render_status(frame, chunks[3], app);

    if app.show_help {
        render_help_overlay(frame, frame.size());
    }

    pane
}
