// Copyright (c) 2026 rezky_nightky

use std::f32::consts::PI;

use rand::Rng;

use crate::palette::{Palette, Rgba};
use crate::surface::Surface;

pub const BOTTOM_MARGIN: f32 = 20.0;
pub const GLOW_BLUR: f32 = 14.0;

const ALPHA_MIN: f32 = 0.05;
const ALPHA_MAX: f32 = 0.95;
const SWAY_RATE: f32 = 0.01;
const SWAY_GAIN: f32 = 0.002;
const STAR_POINTS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub life: u32,
    pub ttl: f32,
    pub color: Rgba,
    pub alpha: f32,
    pub spin: f32,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) size: f32,
    pub(crate) life: u32,
    pub(crate) ttl: f32,
    pub(crate) color: Rgba,
    pub(crate) alpha: f32,
    pub(crate) spin: f32,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(bounds: Bounds, palette: &Palette, rng: &mut R) -> Self {
        let mut p = Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            size: rng.random_range(1.2..4.4),
            life: 0,
            ttl: 0.0,
            color: Rgba::TRANSPARENT,
            alpha: 0.0,
            spin: 0.0,
        };
        p.reset(bounds, palette, rng);
        p
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, bounds: Bounds, palette: &Palette, rng: &mut R) {
        self.x = rng.random_range(0.0..bounds.width.max(1.0));
        self.y = rng.random_range(-bounds.height.max(2.0) * 0.5..bounds.height.max(1.0));
        self.vx = rng.random_range(-0.15..0.15);
        self.vy = rng.random_range(0.15..0.75);
        self.life = 0;
        self.ttl = rng.random_range(400.0..1200.0);
        self.color = palette.pick(rng);
        self.alpha = rng.random_range(0.2..0.9);
        self.spin = rng.random_range(-0.02..0.02);
    }

    pub fn is_expired(&self, bounds: Bounds) -> bool {
        self.life as f32 > self.ttl || self.y > bounds.height + BOTTOM_MARGIN
    }

    pub fn update<R: Rng + ?Sized>(&mut self, bounds: Bounds, palette: &Palette, rng: &mut R) {
        self.x += self.vx;
        self.y += self.vy;
        self.vx += (self.life as f32 * SWAY_RATE).sin() * SWAY_GAIN;
        self.life = self.life.saturating_add(1);

        if self.is_expired(bounds) {
            self.reset(bounds, palette, rng);
        }
    }

    fn star(&self) -> [(f32, f32); STAR_POINTS * 2] {
        let outer = self.size * 2.0;
        let inner = self.size * 0.9;
        let mut pts = [(0.0, 0.0); STAR_POINTS * 2];
        for (i, pt) in pts.iter_mut().enumerate() {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = i as f32 * PI / STAR_POINTS as f32;
            *pt = (theta.cos() * r, theta.sin() * r);
        }
        pts
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.save();
        surface.translate(self.x, self.y);
        surface.rotate(self.life as f32 * self.spin);
        surface.set_global_alpha(self.alpha.clamp(ALPHA_MIN, ALPHA_MAX));
        surface.set_shadow(GLOW_BLUR, self.color);
        surface.fill_polygon(&self.star(), self.color);
        surface.restore();
    }

    pub fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            size: self.size,
            life: self.life,
            ttl: self.ttl,
            color: self.color,
            alpha: self.alpha,
            spin: self.spin,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::runtime::PaletteScheme;
    use crate::surface::Canvas;

    fn setup() -> (Bounds, Palette, StdRng) {
        (
            Bounds::new(800.0, 600.0),
            Palette::from_scheme(PaletteScheme::Frost),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn reset_stays_in_documented_ranges() {
        let (bounds, palette, mut rng) = setup();
        for _ in 0..200 {
            let p = Particle::new(bounds, &palette, &mut rng);
            assert!((0.0..800.0).contains(&p.x));
            assert!((-300.0..600.0).contains(&p.y));
            assert!(p.vy > 0.0);
            assert!((400.0..1200.0).contains(&p.ttl));
            assert_eq!(p.life, 0);
            assert!(palette.entries().contains(&p.color));
        }
    }

    #[test]
    fn ages_past_ttl_then_resets() {
        let (bounds, palette, mut rng) = setup();
        let mut p = Particle::new(bounds, &palette, &mut rng);
        p.x = 100.0;
        p.y = 0.0;
        p.vy = 0.2;
        p.ttl = 5.0;
        let size = p.size;

        for _ in 0..5 {
            p.update(bounds, &palette, &mut rng);
        }
        assert_eq!(p.life, 5);
        assert_eq!(p.ttl, 5.0);

        p.update(bounds, &palette, &mut rng);
        assert_eq!(p.life, 0);
        assert!(p.ttl >= 400.0);
        assert_eq!(p.size, size);
    }

    #[test]
    fn falling_below_margin_resets_same_call() {
        let (bounds, palette, mut rng) = setup();
        let mut p = Particle::new(bounds, &palette, &mut rng);
        p.ttl = 1000.0;
        p.y = bounds.height + BOTTOM_MARGIN - 0.1;
        p.vy = 0.5;
        p.life = 3;
        p.update(bounds, &palette, &mut rng);
        assert_eq!(p.life, 0);
        assert!(p.y < bounds.height);
    }

    #[test]
    fn sway_only_nudges_vx() {
        let (bounds, palette, mut rng) = setup();
        let mut p = Particle::new(bounds, &palette, &mut rng);
        p.y = 0.0;
        p.ttl = 1000.0;
        p.life = 100;
        let vx = p.vx;
        p.update(bounds, &palette, &mut rng);
        let expected = vx + (100.0f32 * 0.01).sin() * 0.002;
        assert!((p.vx - expected).abs() < 1e-6);
    }

    #[test]
    fn palette_changes_reach_only_future_resets() {
        let (bounds, mut palette, mut rng) = setup();
        let mut p = Particle::new(bounds, &palette, &mut rng);
        p.x = 10.0;
        p.y = 0.0;
        p.vy = 0.2;
        p.ttl = 50.0;
        let color = p.color;

        palette.randomize(&mut rng);
        for _ in 0..10 {
            p.update(bounds, &palette, &mut rng);
        }
        assert_eq!(p.color, color);

        p.life = 50;
        p.update(bounds, &palette, &mut rng);
        assert_eq!(p.life, 0);
        assert!(palette.entries().contains(&p.color));
    }

    #[test]
    fn draw_leaves_surface_state_balanced() {
        let (bounds, palette, mut rng) = setup();
        let mut canvas = Canvas::new(bounds.width, bounds.height, 100, 75);
        let mut p = Particle::new(bounds, &palette, &mut rng);
        p.x = 400.0;
        p.y = 300.0;
        p.draw(&mut canvas);
        assert_eq!(canvas.save_depth(), 0);
        assert!(!canvas.is_blank());
        assert!(canvas.pixel(50, 37).unwrap()[3] > 0.0);
    }
}
