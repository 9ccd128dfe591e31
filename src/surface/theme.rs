//! Terminal palettes for the dark and light themes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

/// User-selectable theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette::DARK,
            Theme::Light => Palette::LIGHT,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{}', expected dark or light", other)),
        }
    }
}

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// Colour data handed to the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
    pub cursor: Rgb,
    /// black, red, green, yellow, blue, magenta, cyan, white, then the bright variants
    pub ansi: [Rgb; 16],
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: Rgb::hex(0x1e1e1e),
        foreground: Rgb::hex(0xd4d4d4),
        cursor: Rgb::hex(0xd4d4d4),
        ansi: [
            Rgb::hex(0x000000),
            Rgb::hex(0xcd3131),
            Rgb::hex(0x0dbc79),
            Rgb::hex(0xe5e510),
            Rgb::hex(0x2472c8),
            Rgb::hex(0xbc3fbc),
            Rgb::hex(0x11a8cd),
            Rgb::hex(0xe5e5e5),
            Rgb::hex(0x666666),
            Rgb::hex(0xf14c4c),
            Rgb::hex(0x23d18b),
            Rgb::hex(0xf5f543),
            Rgb::hex(0x3b8eea),
            Rgb::hex(0xd670d6),
            Rgb::hex(0x29b8db),
            Rgb::hex(0xe5e5e5),
        ],
    };

    pub const LIGHT: Palette = Palette {
        background: Rgb::hex(0xffffff),
        foreground: Rgb::hex(0x000000),
        cursor: Rgb::hex(0x000000),
        ansi: [
            Rgb::hex(0x000000),
            Rgb::hex(0xcd3131),
            Rgb::hex(0x00bc00),
            Rgb::hex(0x949800),
            Rgb::hex(0x0451a5),
            Rgb::hex(0xbc05bc),
            Rgb::hex(0x0598bc),
            Rgb::hex(0x555555),
            Rgb::hex(0x666666),
            Rgb::hex(0xcd3131),
            Rgb::hex(0x14ce14),
            Rgb::hex(0xb5ba00),
            Rgb::hex(0x0451a5),
            Rgb::hex(0xbc05bc),
            Rgb::hex(0x0598bc),
            Rgb::hex(0xa5a5a5),
        ],
    };

    /// Map an emulator colour to a display colour
    pub fn resolve(&self, color: vt100::Color, default: Rgb) -> Color {
        match color {
            vt100::Color::Default => default.into(),
            vt100::Color::Idx(i) if (i as usize) < self.ansi.len() => self.ansi[i as usize].into(),
            vt100::Color::Idx(i) => Color::Indexed(i),
            vt100::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
        }
    }
}
