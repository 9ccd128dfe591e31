use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::session::SessionController;
use crate::transport::ConnectionStatus;

pub(super) fn render_header(frame: &mut Frame<'_>, area: Rect, controller: &SessionController) {
    let title = Span::styled(
        " muxdeck ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let status = match controller.connection_status() {
        Some(ConnectionStatus::Connected) => {
            Span::styled("● Connected ", Style::default().fg(Color::Green))
        }
        Some(ConnectionStatus::Connecting) => {
            Span::styled("● Connecting ", Style::default().fg(Color::Yellow))
        }
        Some(ConnectionStatus::Closed) => {
            Span::styled("● Closed ", Style::default().fg(Color::Red))
        }
        Some(ConnectionStatus::Error(_)) => {
            Span::styled("● Error ", Style::default().fg(Color::Red))
        }
        None => Span::styled("○ Idle ", Style::default().fg(Color::Gray)),
    };

    let session = controller
        .active_session()
        .and_then(|id| controller.directory().get(id))
        .map(|record| record.name.clone())
        .unwrap_or_else(|| "no session".to_string());

    let body = vec![Line::from(vec![
        title,
        Span::raw(" "),
        status,
        Span::raw(" "),
        Span::styled(session, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            format!(
                "Sessions: {} | Theme: {} ",
                controller.directory().len(),
                controller.theme()
            ),
            Style::default().fg(Color::Gray),
        ),
    ])];

    let block = Block::default().borders(Borders::ALL).title(" Session ");

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
