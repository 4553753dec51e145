// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;
use rand::Rng;

use crate::runtime::{ColorMode, PaletteScheme};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn random_bright<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let hue = rng.random_range(0.0..360.0);
        let sat = rng.random_range(0.6..0.95);
        let light = rng.random_range(0.62..0.82);
        let (r, g, b) = hsl_to_rgb(hue, sat, light);
        Rgba::new(r, g, b, 0.9)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(hex) = t.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!("invalid hex color: {}", s));
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
            return Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, 1.0));
        }

        let (body, want) = if let Some(rest) = t.strip_prefix("rgba(") {
            (rest, 4)
        } else if let Some(rest) = t.strip_prefix("rgb(") {
            (rest, 3)
        } else {
            return Err(format!("invalid color: {} (expected rgba(...), rgb(...) or #rrggbb)", s));
        };
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| format!("invalid color: {} (missing ')')", s))?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != want {
            return Err(format!("invalid color: {} (expected {} components)", s, want));
        }
        let channel = |p: &str| {
            p.parse::<u8>()
                .map_err(|_| format!("invalid color channel: {}", p))
        };
        let a = if want == 4 {
            let a: f32 = parts[3]
                .parse()
                .map_err(|_| format!("invalid alpha: {}", parts[3]))?;
            if !a.is_finite() || !(0.0..=1.0).contains(&a) {
                return Err(format!("alpha out of range: {}", parts[3]));
            }
            a
        } else {
            1.0
        };
        Ok(Rgba::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to(r1), to(g1), to(b1))
}

/// Particles copy an entry at reset time, so edits only reach particles
/// that reset later.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    entries: Vec<Rgba>,
}

impl Palette {
    pub fn new(entries: Vec<Rgba>) -> Self {
        let entries = if entries.is_empty() {
            vec![Rgba::new(255, 255, 255, 0.9)]
        } else {
            entries
        };
        Self { entries }
    }

    pub fn from_scheme(scheme: PaletteScheme) -> Self {
        let list: &[(u8, u8, u8, f32)] = match scheme {
            PaletteScheme::Frost => &[
                (255, 255, 255, 0.95),
                (200, 230, 255, 0.9),
                (160, 210, 255, 0.9),
                (220, 200, 255, 0.85),
            ],
            PaletteScheme::Ember => &[
                (255, 220, 160, 0.95),
                (255, 170, 90, 0.9),
                (255, 120, 70, 0.85),
                (255, 240, 200, 0.9),
            ],
            PaletteScheme::Aurora => &[
                (120, 255, 200, 0.9),
                (90, 200, 255, 0.9),
                (180, 140, 255, 0.85),
                (210, 255, 230, 0.95),
            ],
            PaletteScheme::Candy => &[
                (255, 170, 220, 0.9),
                (170, 220, 255, 0.9),
                (255, 240, 170, 0.9),
                (200, 255, 190, 0.9),
            ],
            PaletteScheme::Mono => &[(255, 255, 255, 0.9), (190, 190, 190, 0.85)],
        };
        Self::new(list.iter().map(|&(r, g, b, a)| Rgba::new(r, g, b, a)).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Rgba] {
        &self.entries
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgba {
        self.entries[rng.random_range(0..self.entries.len())]
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for slot in &mut self.entries {
            *slot = Rgba::random_bright(rng);
        }
    }
}

pub fn parse_palette_scheme(s: &str) -> Result<PaletteScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "frost" | "snow" => Ok(PaletteScheme::Frost),
        "ember" | "fire" => Ok(PaletteScheme::Ember),
        "aurora" => Ok(PaletteScheme::Aurora),
        "candy" => Ok(PaletteScheme::Candy),
        "mono" | "gray" | "grey" => Ok(PaletteScheme::Mono),
        _ => Err(format!("invalid palette: {} (see --list-palettes)", s)),
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let step = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (step(r), step(g), step(b));
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gv) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let i = (avg - 8) / 10;
            (232 + i, 8 + 10 * i)
        }
    };

    if dist2(r, g, b, gv, gv, gv) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

pub fn terminal_color(mode: ColorMode, r: u8, g: u8, b: u8) -> Color {
    match mode {
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 => rgb_to_color16(r, g, b),
        ColorMode::Mono => {
            let luma = (r as u16 * 3 + g as u16 * 6 + b as u16) / 10;
            if luma > 140 {
                Color::White
            } else if luma > 40 {
                Color::DarkGrey
            } else {
                Color::Black
            }
        }
    }
}
