// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

pub const UPPER_HALF: char = '\u{2580}';
pub const LOWER_HALF: char = '\u{2584}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg,
            bold: false,
        }
    }

    /// Two stacked raster pixels in one cell. `None` is the terminal's own
    /// background, so a lone bottom pixel flips to the lower half block.
    pub fn half_block(top: Option<Color>, bottom: Option<Color>) -> Self {
        match (top, bottom) {
            (t, b) if t == b => Self::blank_with_bg(b),
            (None, Some(b)) => Self::glyph(LOWER_HALF, Some(b), None, false),
            (t, b) => Self::glyph(UPPER_HALF, t, b, false),
        }
    }

    pub fn glyph(ch: char, fg: Option<Color>, bg: Option<Color>, bold: bool) -> Self {
        Self { ch, fg, bg, bold }
    }

    pub fn same_style(&self, other: &Cell) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.bold == other.bold
    }
}
