use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::session::SessionController;
use crate::ui::{AppState, InputMode};

pub(super) fn render_prompt(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &AppState,
    controller: &SessionController,
) {
    let (title, marker, buffer) = match &app.input_mode {
        InputMode::Input => {
            let title = if controller.active_session().is_some() {
                " Input "
            } else {
                " Input (no session) "
            };
            (title, ">", app.input_buffer.as_str())
        }
        InputMode::Rename { .. } => (" Rename session (Enter to save, Esc to cancel) ", "name:", app.rename_buffer.as_str()),
    };

    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    // keep the tail of long lines visible
    let prompt_offset = marker.chars().count() as u16 + 1;
    let visible = inner.width.saturating_sub(prompt_offset + 1) as usize;
    let char_count = buffer.chars().count();
    let shown: String = buffer
        .chars()
        .skip(char_count.saturating_sub(visible))
        .collect();

    let input_line = Paragraph::new(Text::from(vec![Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::raw(shown.clone()),
    ])]));
    frame.render_widget(input_line, inner);

    let max_cursor_x = inner.x.saturating_add(inner.width.saturating_sub(1));
    let cursor_x = inner
        .x
        .saturating_add(prompt_offset)
        .saturating_add(shown.chars().count() as u16)
        .min(max_cursor_x);
    frame.set_cursor(cursor_x, inner.y);
}
