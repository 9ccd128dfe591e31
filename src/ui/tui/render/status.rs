use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::session::NoticeLevel;
use crate::ui::AppState;

const SHORTCUTS: &[(&str, &str)] = &[
    ("Enter", "Send input"),
    ("Ctrl+N", "New session"),
    ("Ctrl+W", "Delete active session"),
    ("Ctrl+R", "Rename active session"),
    ("Alt+Up/Down", "Previous / next session"),
    ("Alt+1..9", "Jump to session"),
    ("PgUp/PgDn", "Scroll terminal history"),
    ("Ctrl+T", "Toggle dark/light theme"),
    ("Ctrl+L", "Reload session list"),
    ("F1", "Toggle this help"),
    ("Ctrl+Q", "Quit"),
];

pub(super) fn render_status(frame: &mut Frame<'_>, area: Rect, app: &AppState) {
    let line = match app.latest_notification() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::LightBlue,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(
                    notice.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(notice.message.clone(), Style::default().fg(color)),
            ])
        }
        None => Line::from(vec![
            Span::styled("F1", Style::default().fg(Color::Cyan)),
            Span::raw(": Help   "),
            Span::styled("Ctrl+N", Style::default().fg(Color::Cyan)),
            Span::raw(": New   "),
            Span::styled("Alt+↑/↓", Style::default().fg(Color::Cyan)),
            Span::raw(": Switch   "),
            Span::styled("Ctrl+Q", Style::default().fg(Color::Cyan)),
            Span::raw(": Quit"),
        ]),
    };

    frame.render_widget(Paragraph::new(line), area);
}

pub(super) fn render_help_overlay(frame: &mut Frame<'_>, area: Rect) {
    let width = 52.min(area.width);
    let height = (SHORTCUTS.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = SHORTCUTS
        .iter()
        .map(|(keys, description)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<14}", keys),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*description),
            ])
        })
        .collect();

    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
