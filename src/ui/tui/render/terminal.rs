use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::session::SessionController;
use crate::surface::{Palette, TerminalSurface};

/// Renders the visible screen of one terminal surface
pub struct TerminalView<'a> {
    screen: &'a vt100::Screen,
    palette: &'a Palette,
    cursor_blink: bool,
}

impl<'a> TerminalView<'a> {
    pub fn new(surface: &'a TerminalSurface) -> Option<Self> {
        Some(Self {
            screen: surface.screen()?,
            palette: surface.palette(),
            cursor_blink: surface.options().cursor_blink,
        })
    }

    fn cell_style(&self, cell: &vt100::Cell) -> Style {
        let mut fg = self
            .palette
            .resolve(cell.fgcolor(), self.palette.foreground);
        let mut bg = self
            .palette
            .resolve(cell.bgcolor(), self.palette.background);
        if cell.inverse() {
            std::mem::swap(&mut fg, &mut bg);
        }
        let mut style = Style::default().fg(fg).bg(bg);
        if cell.bold() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if cell.italic() {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if cell.underline() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    fn cursor_style(&self) -> Style {
        let mut style = Style::default()
            .fg(self.palette.background.into())
            .bg(self.palette.cursor.into());
        if self.cursor_blink {
            style = style.add_modifier(Modifier::SLOW_BLINK);
        }
        style
    }

    /// Build styled lines for an area of `rows` x `cols`
    pub fn lines(&self, rows: u16, cols: u16) -> Vec<Line<'static>> {
        let (screen_rows, screen_cols) = self.screen.size();
        let rows = rows.min(screen_rows);
        let cols = cols.min(screen_cols);
        let cursor = if self.screen.hide_cursor() || self.screen.scrollback() > 0 {
            None
        } else {
            Some(self.screen.cursor_position())
        };

        let mut lines = Vec::with_capacity(rows as usize);
        for row in 0..rows {
            let mut spans = Vec::with_capacity(cols as usize);
            for col in 0..cols {
                let Some(cell) = self.screen.cell(row, col) else {
                    spans.push(Span::raw(" "));
                    continue;
                };
                if cell.is_wide_continuation() {
                    continue;
                }
                let style = if cursor == Some((row, col)) {
                    self.cursor_style()
                } else {
                    self.cell_style(cell)
                };
                let text = if cell.has_contents() {
                    cell.contents()
                } else {
                    " ".to_string()
                };
                spans.push(Span::styled(text, style));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Widget for TerminalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let background = Style::default()
            .bg(self.palette.background.into())
            .fg(self.palette.foreground.into());
        let lines = self.lines(area.height, area.width);
        Paragraph::new(Text::from(lines))
            .style(background)
            .render(area, buf);
    }
}

/// Draw the terminal pane; returns the inner area reported as the container
pub(super) fn render_terminal(
    frame: &mut Frame<'_>,
    area: Rect,
    controller: &SessionController,
) -> Rect {
    let title = controller
        .active_session()
        .and_then(|id| controller.directory().get(id))
        .map(|record| format!(" {} ", record.name))
        .unwrap_or_else(|| " Terminal ".to_string());

    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return inner;
    }

    match controller.surface().and_then(TerminalView::new) {
        Some(view) => frame.render_widget(view, inner),
        None => {
            let message = if controller.active_session().is_some() {
                "Connecting..."
            } else {
                "No session selected. Ctrl+N creates one, Alt+Up/Down switches."
            };
            let placeholder = Paragraph::new(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(placeholder, inner);
        }
    }

    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Geometry, TerminalOptions, Theme};

    fn surface() -> TerminalSurface {
        TerminalSurface::create(
            Theme::Dark,
            &TerminalOptions::default(),
            Some(Geometry::new(20, 4)),
        )
        .unwrap()
    }

    #[test]
    fn test_lines_follow_screen() {
        let mut surface = surface();
        surface.write("\x1b[31mred\x1b[0m ok\n").unwrap();

        let view = TerminalView::new(&surface).unwrap();
        let lines = view.lines(4, 20);
        assert_eq!(lines.len(), 4);

        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first.trim_end(), "red ok");
        assert_eq!(
            lines[0].spans[0].style.fg,
            Some(Color::Rgb(0xcd, 0x31, 0x31))
        );
    }

    #[test]
    fn test_cursor_cell_is_highlighted() {
        let mut surface = surface();
        surface.write("ab").unwrap();

        let view = TerminalView::new(&surface).unwrap();
        let lines = view.lines(4, 20);
        let cursor = &lines[0].spans[2];
        assert_eq!(cursor.style.bg, Some(Color::from(Palette::DARK.cursor)));
        assert!(cursor.style.add_modifier.contains(Modifier::SLOW_BLINK));
    }

    #[test]
    fn test_lines_clamped_to_screen() {
        let surface = surface();
        let view = TerminalView::new(&surface).unwrap();
        let lines = view.lines(10, 80);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].spans.len(), 20);
    }

    #[test]
    fn test_disposed_surface_has_no_view() {
        let mut surface = surface();
        surface.dispose();
        assert!(TerminalView::new(&surface).is_none());
    }
}
