use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::session::SessionController;

pub(super) fn render_sessions(frame: &mut Frame<'_>, area: Rect, controller: &SessionController) {
    let directory = controller.directory();
    let block = Block::default()
        .title(format!(" Sessions ({}) ", directory.len()))
        .borders(Borders::ALL);

    if directory.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Span::styled(
                "No sessions yet",
                Style::default().fg(Color::Gray),
            )),
            ListItem::new(Span::styled(
                "Ctrl+N to create one",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = directory
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let shortcut = if index < 9 {
                format!("{} ", index + 1)
            } else {
                "  ".to_string()
            };
            ListItem::new(Line::from(vec![
                Span::styled(shortcut, Style::default().fg(Color::DarkGray)),
                Span::raw(record.name.clone()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(
        controller
            .active_session()
            .and_then(|id| directory.position(id)),
    );

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut state);
}
