// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::palette::Palette;
use crate::particle::{Bounds, Particle, ParticleSnapshot};
use crate::surface::Surface;

pub const MIN_PARTICLES: usize = 20;
pub const AREA_PER_PARTICLE: f64 = 70_000.0;

pub fn pool_size(width: f32, height: f32) -> usize {
    let area = (width.max(0.0) as f64) * (height.max(0.0) as f64);
    ((area / AREA_PER_PARTICLE).round() as usize).max(MIN_PARTICLES)
}

#[derive(Clone, Debug)]
pub struct ParticleField {
    bounds: Bounds,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(width: f32, height: f32, palette: &Palette, rng: &mut R) -> Self {
        let mut field = Self {
            bounds: Bounds::new(width, height),
            particles: Vec::new(),
        };
        field.initialize(width, height, palette, rng);
        field
    }

    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        palette: &Palette,
        rng: &mut R,
    ) {
        self.bounds = Bounds::new(width, height);
        let n = pool_size(width, height);
        let bounds = self.bounds;
        self.particles.clear();
        self.particles
            .extend((0..n).map(|_| Particle::new(bounds, palette, &mut *rng)));
    }

    pub fn update_all<R: Rng + ?Sized>(&mut self, palette: &Palette, rng: &mut R) {
        let bounds = self.bounds;
        for p in &mut self.particles {
            p.update(bounds, palette, rng);
        }
    }

    pub fn draw_all<S: Surface + ?Sized>(&self, surface: &mut S) {
        for p in &self.particles {
            p.draw(surface);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(Particle::snapshot).collect()
    }
}
