// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::frame::Frame;
use crate::palette::terminal_color;
use crate::runtime::{ColorMode, CELL_PX_H, CELL_PX_W};

const KEY_W: u16 = 7;
const KEY_H: u16 = 3;
const KEY_GAP: u16 = 2;
const PRESS_FRAMES: u8 = 10;
const WOBBLE_FRAMES: u8 = 12;
const BURST_SCALE: f32 = 1.4;

const MOTION_LABEL_ON: &str = "[x] motion (m)";
const MOTION_LABEL_OFF: &str = "[ ] motion (m)";
const RANDOMIZE_LABEL: &str = "[ palette (r) ]";
const HINT: &str = "tab: focus  enter/space/click: press  q: quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl CellRect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }

    pub fn center_px(&self) -> (f32, f32) {
        (
            (self.x as f32 + self.w as f32 / 2.0) * CELL_PX_W,
            (self.y as f32 + self.h as f32 / 2.0) * CELL_PX_H,
        )
    }

    pub fn center_col(&self) -> u16 {
        self.x + self.w / 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tilt {
    Left,
    Level,
    Right,
}

#[derive(Clone, Debug)]
pub struct KeyCap {
    pub label: char,
    pub rect: CellRect,
    press: u8,
    tilt: Tilt,
}

impl KeyCap {
    pub fn is_pressed(&self) -> bool {
        self.press > 0
    }

    #[cfg(test)]
    pub fn tilt(&self) -> Tilt {
        self.tilt
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Key(usize),
    MotionToggle,
    Randomize,
}

#[derive(Clone, Debug)]
pub struct Keypad {
    keys: Vec<KeyCap>,
    focused: Option<usize>,
    wobble: u8,
    motion_rect: CellRect,
    randomize_rect: CellRect,
}

impl Keypad {
    pub fn new(labels: &[char]) -> Self {
        let empty = CellRect {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
        };
        Self {
            keys: labels
                .iter()
                .map(|&label| KeyCap {
                    label,
                    rect: empty,
                    press: 0,
                    tilt: Tilt::Level,
                })
                .collect(),
            focused: None,
            wobble: 0,
            motion_rect: empty,
            randomize_rect: empty,
        }
    }

    pub fn layout(&mut self, cols: u16, rows: u16) {
        let n = self.keys.len() as u16;
        let (mut key_w, mut gap) = (KEY_W, KEY_GAP);
        if n > 0 && n * key_w + n.saturating_sub(1) * gap > cols {
            gap = 0;
            key_w = (cols / n).max(3);
        }
        let total = n * key_w + n.saturating_sub(1) * gap;
        let x0 = cols.saturating_sub(total) / 2;
        let y = ((rows as u32 * 2 / 3) as u16).min(rows.saturating_sub(KEY_H + 1));

        for (i, key) in self.keys.iter_mut().enumerate() {
            key.rect = CellRect {
                x: x0 + i as u16 * (key_w + gap),
                y,
                w: key_w,
                h: KEY_H,
            };
        }

        let bar = rows.saturating_sub(1);
        self.motion_rect = CellRect {
            x: 1,
            y: bar,
            w: MOTION_LABEL_ON.len() as u16,
            h: 1,
        };
        self.randomize_rect = CellRect {
            x: self.motion_rect.x + self.motion_rect.w + 2,
            y: bar,
            w: RANDOMIZE_LABEL.len() as u16,
            h: 1,
        };
    }

    #[cfg(test)]
    pub fn key(&self, id: usize) -> Option<&KeyCap> {
        self.keys.get(id)
    }

    pub fn find_label(&self, ch: char) -> Option<usize> {
        let ch = ch.to_ascii_uppercase();
        self.keys
            .iter()
            .position(|k| k.label.to_ascii_uppercase() == ch)
    }

    pub fn hit_test(&self, col: u16, row: u16) -> Option<Control> {
        if let Some(id) = self.keys.iter().position(|k| k.rect.contains(col, row)) {
            return Some(Control::Key(id));
        }
        if self.motion_rect.contains(col, row) {
            return Some(Control::MotionToggle);
        }
        if self.randomize_rect.contains(col, row) {
            return Some(Control::Randomize);
        }
        None
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focus(&mut self, id: usize) -> Option<usize> {
        if id >= self.keys.len() || self.focused == Some(id) {
            return None;
        }
        self.focused.replace(id)
    }

    pub fn neighbour(&self, forward: bool) -> Option<usize> {
        let n = self.keys.len();
        if n == 0 {
            return None;
        }
        Some(match (self.focused, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        })
    }

    pub fn blur(&mut self) -> Option<usize> {
        self.focused.take()
    }

    pub fn press(&mut self, id: usize, pointer_col: Option<u16>) {
        if let Some(key) = self.keys.get_mut(id) {
            key.press = PRESS_FRAMES;
            let mid = key.rect.center_col();
            key.tilt = match pointer_col {
                Some(c) if c < mid => Tilt::Left,
                Some(c) if c > mid => Tilt::Right,
                _ => Tilt::Level,
            };
        }
    }

    pub fn wobble(&mut self) {
        self.wobble = WOBBLE_FRAMES;
    }

    pub fn is_wobbling(&self) -> bool {
        self.wobble > 0
    }

    pub fn burst_origin(&self, id: usize) -> Option<(f32, f32, f32)> {
        let rect = self.keys.get(id)?.rect;
        let (x, y) = rect.center_px();
        let side = (rect.w as f32 * CELL_PX_W).max(rect.h as f32 * CELL_PX_H);
        Some((x, y, side * BURST_SCALE))
    }

    pub fn step(&mut self) {
        for key in &mut self.keys {
            if key.press > 0 {
                key.press -= 1;
                if key.press == 0 {
                    key.tilt = Tilt::Level;
                }
            }
        }
        self.wobble = self.wobble.saturating_sub(1);
    }

    fn wobble_offset(&self) -> i32 {
        match self.wobble % 4 {
            1 => 1,
            3 => -1,
            _ => 0,
        }
    }

    pub fn render(&self, frame: &mut Frame, motion_on: bool, mode: ColorMode) {
        let rgb = |r, g, b| Some(terminal_color(mode, r, g, b));
        let face = rgb(18, 20, 34);
        let lit = rgb(255, 240, 214);
        let border = rgb(130, 140, 175);
        let ring = rgb(120, 220, 255);
        let ink = rgb(232, 234, 246);
        let dark_ink = rgb(24, 24, 32);

        let shift = self.wobble_offset();
        let sx = |x: u16| (x as i32 + shift).max(0) as u16;

        for (i, key) in self.keys.iter().enumerate() {
            let r = key.rect;
            if r.w < 3 || r.h < 3 {
                continue;
            }
            let focused = self.focused == Some(i);
            let edge = if focused { ring } else { border };
            let (fill, label_ink) = if key.is_pressed() {
                (lit, dark_ink)
            } else {
                (face, ink)
            };
            let inner = (r.w - 2) as usize;

            let top = format!("┌{}┐", "─".repeat(inner));
            let bottom = format!("└{}┘", "─".repeat(inner));
            frame.put_str(sx(r.x), r.y, &top, edge, fill, focused);
            frame.put_str(sx(r.x), r.y + r.h - 1, &bottom, edge, fill, focused);

            for row in r.y + 1..r.y + r.h - 1 {
                frame.put_str(sx(r.x), row, "│", edge, fill, focused);
                frame.put_str(sx(r.x + 1), row, &" ".repeat(inner), label_ink, fill, false);
                frame.put_str(sx(r.x + r.w - 1), row, "│", edge, fill, focused);
            }

            let lean: i32 = match key.tilt {
                Tilt::Left => -1,
                Tilt::Level => 0,
                Tilt::Right => 1,
            };
            let label_col = (r.center_col() as i32 + lean)
                .clamp(r.x as i32 + 1, (r.x + r.w) as i32 - 2) as u16;
            let mut buf = [0u8; 4];
            frame.put_str(
                sx(label_col),
                r.y + r.h / 2,
                key.label.encode_utf8(&mut buf),
                label_ink,
                fill,
                true,
            );
        }

        let bar_bg: Option<Color> = face;
        let motion_label = if motion_on {
            MOTION_LABEL_ON
        } else {
            MOTION_LABEL_OFF
        };
        frame.put_str(self.motion_rect.x, self.motion_rect.y, motion_label, ink, bar_bg, false);
        frame.put_str(
            self.randomize_rect.x,
            self.randomize_rect.y,
            RANDOMIZE_LABEL,
            if self.is_wobbling() { ring } else { ink },
            bar_bg,
            self.is_wobbling(),
        );
        let hint_x = self.randomize_rect.x + self.randomize_rect.w + 2;
        frame.put_str(hint_x, self.randomize_rect.y, HINT, border, bar_bg, false);
    }
}
