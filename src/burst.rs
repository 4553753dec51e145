// Copyright (c) 2026 rezky_nightky

use crate::palette::Rgba;
use crate::surface::{ColorStop, Composite, Paint, Surface};

pub const BURST_DURATION: f32 = 420.0;
pub const BURST_STEP: f32 = 16.0;
const PEAK_ALPHA: f32 = 0.35;
const DEFAULT_COLOR: Rgba = Rgba::new(255, 244, 220, 1.0);

#[derive(Clone, Debug, PartialEq)]
pub struct BurstEffect {
    x: f32,
    y: f32,
    max_radius: f32,
    color: Rgba,
    elapsed: f32,
    duration: f32,
}

impl BurstEffect {
    pub fn spawn(x: f32, y: f32, max_radius: f32) -> Self {
        Self {
            x,
            y,
            max_radius: max_radius.max(0.0),
            color: DEFAULT_COLOR,
            elapsed: 0.0,
            duration: BURST_DURATION,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn tick<S: Surface + ?Sized>(mut self, surface: &mut S) -> Option<Self> {
        self.elapsed += BURST_STEP;
        let progress = self.progress();
        let radius = self.max_radius * (0.4 + progress);
        let alpha = PEAK_ALPHA * (1.0 - progress);

        if radius > 0.0 {
            surface.save();
            surface.set_composite(Composite::Lighter);
            surface.fill_rect(
                self.x - radius,
                self.y - radius,
                radius * 2.0,
                radius * 2.0,
                &Paint::Radial {
                    center: (self.x, self.y),
                    r0: 0.0,
                    r1: radius,
                    stops: [
                        ColorStop::new(0.0, self.color.with_alpha(alpha)),
                        ColorStop::new(1.0, self.color.with_alpha(0.0)),
                    ],
                },
            );
            surface.restore();
        }

        if self.is_done() {
            None
        } else {
            Some(self)
        }
    }
}
