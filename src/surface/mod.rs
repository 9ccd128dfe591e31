//! Terminal rendering surface module
//!
//! A surface owns one terminal emulator bound to one container (the terminal
//! pane rectangle of the view). It accepts raw text, keeps scrollback, and is
//! re-themed and re-fitted in place.

pub mod resize;
pub mod theme;

use tracing::{debug, warn};

pub use resize::ResizeCoordinator;
pub use theme::{Palette, Rgb, Theme};

/// Size of a container or surface in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
}

impl Geometry {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// Emulator settings that do not depend on the theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Fitted width never exceeds this many columns
    pub max_cols: u16,
    pub scrollback: usize,
    pub cursor_blink: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            max_cols: 120,
            scrollback: 10_000,
            cursor_blink: true,
        }
    }
}

/// Error types for surface operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("terminal container is not available")]
    ContainerUnavailable,
    #[error("surface has been disposed")]
    Disposed,
}

/// Convert bare `\n` to `\r\n`; existing `\r\n` pairs are kept as they are.
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + text.len() / 16);
    let mut previous = None;
    for c in text.chars() {
        if c == '\n' && previous != Some('\r') {
            normalized.push('\r');
        }
        normalized.push(c);
        previous = Some(c);
    }
    normalized
}

/// One terminal emulator instance bound to one container
pub struct TerminalSurface {
    parser: Option<vt100::Parser>,
    theme: Theme,
    palette: Palette,
    geometry: Geometry,
    options: TerminalOptions,
}

impl TerminalSurface {
    /// Create a surface sized to `container`. Fails without side effects when
    /// the container does not exist yet.
    pub fn create(
        theme: Theme,
        options: &TerminalOptions,
        container: Option<Geometry>,
    ) -> Result<Self, SurfaceError> {
        let container = match container {
            Some(container) if !container.is_empty() => container,
            _ => return Err(SurfaceError::ContainerUnavailable),
        };

        let geometry = Self::fitted(container, options.max_cols);
        let parser = vt100::Parser::new(geometry.rows, geometry.cols, options.scrollback);
        debug!(
            "Created terminal surface {}x{} ({} theme)",
            geometry.cols, geometry.rows, theme
        );

        Ok(Self {
            parser: Some(parser),
            theme,
            palette: theme.palette(),
            geometry,
            options: options.clone(),
        })
    }

    fn fitted(container: Geometry, max_cols: u16) -> Geometry {
        Geometry {
            cols: container.cols.min(max_cols.max(1)).max(1),
            rows: container.rows.max(1),
        }
    }

    fn parser_mut(&mut self) -> Result<&mut vt100::Parser, SurfaceError> {
        self.parser.as_mut().ok_or(SurfaceError::Disposed)
    }

    /// Append raw text; line endings are normalised, escape sequences are left
    /// to the emulator
    pub fn write(&mut self, text: &str) -> Result<(), SurfaceError> {
        let normalized = normalize_line_endings(text);
        self.parser_mut()?.process(normalized.as_bytes());
        Ok(())
    }

    /// Swap the palette; screen contents and scrollback are kept
    pub fn apply_theme(&mut self, theme: Theme) -> Result<(), SurfaceError> {
        if self.parser.is_none() {
            return Err(SurfaceError::Disposed);
        }
        self.theme = theme;
        self.palette = theme.palette();
        Ok(())
    }

    /// Resize the emulator to fit `container`
    pub fn fit(&mut self, container: Geometry) -> Result<Geometry, SurfaceError> {
        if container.is_empty() {
            return Err(SurfaceError::ContainerUnavailable);
        }
        let geometry = Self::fitted(container, self.options.max_cols);
        if geometry != self.geometry {
            self.parser_mut()?.set_size(geometry.rows, geometry.cols);
            debug!("Fitted surface to {}x{}", geometry.cols, geometry.rows);
            self.geometry = geometry;
        } else if self.parser.is_none() {
            return Err(SurfaceError::Disposed);
        }
        Ok(geometry)
    }

    /// Scroll the view into scrollback; positive values move back in history
    pub fn scroll_by(&mut self, delta: i32) -> Result<usize, SurfaceError> {
        let parser = self.parser_mut()?;
        let current = parser.screen().scrollback() as i64;
        let target = (current + delta as i64).max(0) as usize;
        parser.set_scrollback(target);
        Ok(parser.screen().scrollback())
    }

    /// Release the emulator. Calling it again only logs.
    pub fn dispose(&mut self) {
        match self.parser.take() {
            Some(_) => debug!("Disposed terminal surface"),
            None => warn!("Terminal surface disposed twice"),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.parser.is_none()
    }

    pub fn screen(&self) -> Option<&vt100::Screen> {
        self.parser.as_ref().map(|parser| parser.screen())
    }

    /// Visible screen text without attributes
    pub fn contents(&self) -> String {
        self.screen().map(|screen| screen.contents()).unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn options(&self) -> &TerminalOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(cols: u16, rows: u16) -> TerminalSurface {
        TerminalSurface::create(
            Theme::Dark,
            &TerminalOptions::default(),
            Some(Geometry::new(cols, rows)),
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_bare_newlines() {
        assert_eq!(normalize_line_endings("a.txt\n"), "a.txt\r\n");
        assert_eq!(normalize_line_endings("a\nb\r\nc"), "a\r\nb\r\nc");
        assert_eq!(normalize_line_endings(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = ["a\nb", "x\r\ny\n", "\n\n", "\r\r\n", "\x1b[31mred\x1b[0m\n"];
        for sample in samples {
            let once = normalize_line_endings(sample);
            assert_eq!(normalize_line_endings(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_create_requires_container() {
        let options = TerminalOptions::default();
        assert_eq!(
            TerminalSurface::create(Theme::Dark, &options, None).err(),
            Some(SurfaceError::ContainerUnavailable)
        );
        assert_eq!(
            TerminalSurface::create(Theme::Dark, &options, Some(Geometry::new(0, 10))).err(),
            Some(SurfaceError::ContainerUnavailable)
        );
    }

    #[test]
    fn test_create_clamps_columns() {
        let surface = surface(300, 40);
        assert_eq!(surface.geometry(), Geometry::new(120, 40));
    }

    #[test]
    fn test_write_moves_cursor_to_line_start() {
        let mut surface = surface(80, 24);
        surface.write("a.txt\n").unwrap();
        surface.write("b.txt").unwrap();

        let screen = surface.screen().unwrap();
        let contents = screen.contents();
        let lines: Vec<&str> = contents.lines().map(str::trim_end).collect();
        assert_eq!(&lines[..2], &["a.txt", "b.txt"]);
        assert_eq!(screen.cursor_position(), (1, 5));
    }

    #[test]
    fn test_apply_theme_keeps_contents() {
        let mut surface = surface(80, 24);
        surface.write("\x1b[32mready\x1b[0m\n").unwrap();

        surface.apply_theme(Theme::Light).unwrap();

        assert_eq!(surface.theme(), Theme::Light);
        assert_eq!(*surface.palette(), Palette::LIGHT);
        assert!(surface.contents().contains("ready"));
    }

    #[test]
    fn test_fit_resizes_in_place() {
        let mut surface = surface(80, 24);
        surface.write("hello\n").unwrap();

        let fitted = surface.fit(Geometry::new(100, 30)).unwrap();

        assert_eq!(fitted, Geometry::new(100, 30));
        assert_eq!(surface.screen().unwrap().size(), (30, 100));
        assert!(surface.contents().contains("hello"));
    }

    #[test]
    fn test_disposed_surface_rejects_use() {
        let mut surface = surface(80, 24);
        surface.dispose();

        assert!(surface.is_disposed());
        assert_eq!(surface.write("x"), Err(SurfaceError::Disposed));
        assert_eq!(surface.apply_theme(Theme::Light), Err(SurfaceError::Disposed));
        assert_eq!(
            surface.fit(Geometry::new(90, 20)).err(),
            Some(SurfaceError::Disposed)
        );
        assert_eq!(surface.fit(Geometry::new(80, 24)).err(), Some(SurfaceError::Disposed));
        assert!(surface.contents().is_empty());

        // second dispose is harmless
        surface.dispose();
    }

    #[test]
    fn test_scrollback_navigation() {
        let mut surface = surface(20, 3);
        for i in 0..10 {
            surface.write(&format!("line {}\n", i)).unwrap();
        }

        let offset = surface.scroll_by(2).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(surface.scroll_by(-5).unwrap(), 0);
    }
}
