// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::palette::terminal_color;
use crate::runtime::ColorMode;
use crate::surface::Canvas;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank_with_bg(bg); width as usize * height as usize],
        }
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn put_str(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Option<Color>,
        bg: Option<Color>,
        bold: bool,
    ) {
        for (i, ch) in text.chars().enumerate() {
            let Ok(dx) = u16::try_from(i) else {
                break;
            };
            let Some(cx) = x.checked_add(dx) else {
                break;
            };
            self.set(cx, y, Cell::glyph(ch, fg, bg, bold));
        }
    }

    pub fn paint_canvas(&mut self, canvas: &Canvas, mode: ColorMode, transparent_bg: bool) {
        let to_color = |px: Option<[f32; 4]>| -> Option<Color> {
            let [r, g, b, a] = px.unwrap_or([0.0; 4]);
            // Over black the premultiplied pixel is already the composite.
            let scale = if transparent_bg {
                if a <= 0.0 {
                    return None;
                }
                1.0 / a
            } else {
                1.0
            };
            let ch = |v: f32| (v * scale * 255.0).round().clamp(0.0, 255.0) as u8;
            Some(terminal_color(mode, ch(r), ch(g), ch(b)))
        };

        for y in 0..self.height {
            for x in 0..self.width {
                let top = to_color(canvas.pixel(x as usize, y as usize * 2));
                let bottom = to_color(canvas.pixel(x as usize, y as usize * 2 + 1));
                self.set(x, y, Cell::half_block(top, bottom));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{LOWER_HALF, UPPER_HALF};
    use crate::palette::Rgba;
    use crate::surface::{Paint, Surface};

    #[test]
    fn put_str_clips_at_edge() {
        let mut f = Frame::new(4, 1, None);
        f.put_str(2, 0, "abc", None, None, false);
        assert_eq!(f.get(2, 0).unwrap().ch, 'a');
        assert_eq!(f.get(3, 0).unwrap().ch, 'b');
        assert!(f.get(4, 0).is_none());
        assert_eq!(f.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn canvas_pixels_become_half_blocks() {
        let mut canvas = Canvas::new(16.0, 32.0, 2, 4);
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0, &Paint::Solid(Rgba::new(255, 0, 0, 1.0)));
        canvas.fill_rect(8.0, 8.0, 8.0, 8.0, &Paint::Solid(Rgba::new(0, 0, 255, 1.0)));

        let mut f = Frame::new(2, 2, None);
        f.paint_canvas(&canvas, ColorMode::TrueColor, true);

        let red = Some(Color::Rgb { r: 255, g: 0, b: 0 });
        let blue = Some(Color::Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(*f.get(0, 0).unwrap(), Cell::glyph(UPPER_HALF, red, None, false));
        assert_eq!(*f.get(1, 0).unwrap(), Cell::glyph(LOWER_HALF, blue, None, false));
        assert_eq!(*f.get(0, 1).unwrap(), Cell::blank_with_bg(None));
    }

    #[test]
    fn faint_glow_keeps_its_hue_over_terminal_background() {
        let mut canvas = Canvas::new(8.0, 16.0, 1, 2);
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0, &Paint::Solid(Rgba::new(255, 64, 0, 0.05)));

        let mut f = Frame::new(1, 1, None);
        f.paint_canvas(&canvas, ColorMode::TrueColor, true);
        let cell = *f.get(0, 0).unwrap();
        assert_eq!(cell.ch, UPPER_HALF);
        let Some(Color::Rgb { r, g, b }) = cell.fg else {
            panic!("expected a truecolor glyph, got {cell:?}");
        };
        assert!(r > 200 && g > 30 && g < 100 && b < 20, "{r} {g} {b}");
        assert_eq!(cell.bg, None);

        f.paint_canvas(&canvas, ColorMode::TrueColor, false);
        let Some(Color::Rgb { r, .. }) = f.get(0, 0).unwrap().fg else {
            panic!("expected a truecolor glyph");
        };
        assert!(r < 20);
    }

    #[test]
    fn black_background_fills_every_cell() {
        let canvas = Canvas::new(8.0, 16.0, 1, 2);
        let mut f = Frame::new(1, 1, None);
        f.paint_canvas(&canvas, ColorMode::TrueColor, false);
        let black = Some(Color::Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(*f.get(0, 0).unwrap(), Cell::blank_with_bg(black));
    }
}
