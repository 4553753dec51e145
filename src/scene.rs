// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::burst::BurstEffect;
use crate::field::ParticleField;
use crate::palette::{Palette, Rgba};
use crate::particle::ParticleSnapshot;
use crate::render_loop::{FrameCtx, LoopState, RenderLoop};
use crate::runtime::PaletteScheme;
use crate::scheduler::FrameScheduler;
use crate::surface::{Canvas, Surface};

#[derive(Debug)]
pub enum FrameTask {
    Backdrop,
    Burst(BurstEffect),
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub reduced_motion: bool,
    pub motion_enabled: bool,
    pub palette: Palette,
    pub max_bursts: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            motion_enabled: true,
            palette: Palette::from_scheme(PaletteScheme::Frost),
            max_bursts: 48,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub px_w: usize,
    pub px_h: usize,
}

pub struct Scene {
    canvas: Canvas,
    palette: Palette,
    field: ParticleField,
    render_loop: RenderLoop,
    scheduler: FrameScheduler<FrameTask>,
    rng: StdRng,
    max_bursts: usize,
}

impl Scene {
    pub fn new(config: SceneConfig, viewport: Viewport) -> Self {
        Self::with_rng(config, viewport, StdRng::from_os_rng())
    }

    pub fn with_rng(config: SceneConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let palette = config.palette;
        let field = ParticleField::new(viewport.width, viewport.height, &palette, &mut rng);
        Self {
            canvas: Canvas::new(viewport.width, viewport.height, viewport.px_w, viewport.px_h),
            palette,
            field,
            render_loop: RenderLoop::new(config.reduced_motion, config.motion_enabled),
            scheduler: FrameScheduler::new(),
            rng,
            max_bursts: config.max_bursts,
        }
    }

    pub fn begin(&mut self) {
        if self.render_loop.reduced_motion() {
            info!("reduced motion preferred, painting a still backdrop");
            self.paint_still();
        } else if self.render_loop.motion_enabled() {
            self.render_loop.start(&mut self.scheduler);
        }
        info!(
            particles = self.field.len(),
            running = self.render_loop.is_running(),
            "scene ready"
        );
    }

    fn paint_still(&mut self) {
        let ctx = FrameCtx {
            surface: &mut self.canvas,
            field: &mut self.field,
            palette: &self.palette,
            rng: &mut self.rng,
        };
        self.render_loop.render_still(ctx);
    }

    pub fn run_frame(&mut self) -> usize {
        let mut due = self.scheduler.take_due();
        // The backdrop clears the canvas, so it runs before any burst.
        due.sort_by_key(|(_, task)| !matches!(task, FrameTask::Backdrop));
        let n = due.len();
        for (id, task) in due {
            match task {
                FrameTask::Backdrop => {
                    let ctx = FrameCtx {
                        surface: &mut self.canvas,
                        field: &mut self.field,
                        palette: &self.palette,
                        rng: &mut self.rng,
                    };
                    self.render_loop.on_frame(id, &mut self.scheduler, ctx);
                }
                FrameTask::Burst(burst) => {
                    if let Some(next) = burst.tick(&mut self.canvas) {
                        self.scheduler.request(FrameTask::Burst(next));
                    }
                }
            }
        }
        n
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.canvas
            .resize(viewport.width, viewport.height, viewport.px_w, viewport.px_h);
        self.field
            .initialize(viewport.width, viewport.height, &self.palette, &mut self.rng);
        debug!(
            width = viewport.width,
            height = viewport.height,
            particles = self.field.len(),
            "scene resized"
        );
        if self.render_loop.reduced_motion() {
            self.paint_still();
        }
    }

    pub fn reinitialize(&mut self) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.field.initialize(w, h, &self.palette, &mut self.rng);
        debug!(particles = self.field.len(), "particle field reinitialized");
    }

    pub fn spawn_burst(&mut self, x: f32, y: f32, max_radius: f32) -> bool {
        if self.max_bursts > 0 && self.live_bursts() >= self.max_bursts {
            debug!(limit = self.max_bursts, "burst refused, limit reached");
            return false;
        }
        let color = self.palette.pick(&mut self.rng).with_alpha(1.0);
        let burst = BurstEffect::spawn(x, y, max_radius).with_color(color);
        self.scheduler.request(FrameTask::Burst(burst));
        debug!(x, y, max_radius, "burst spawned");
        true
    }

    pub fn live_bursts(&self) -> usize {
        self.scheduler
            .tasks()
            .filter(|t| matches!(t, FrameTask::Burst(_)))
            .count()
    }

    pub fn set_motion_enabled(&mut self, enabled: bool) {
        self.render_loop
            .set_motion_enabled(enabled, &mut self.scheduler, &mut self.canvas);
        info!(enabled, running = self.render_loop.is_running(), "motion toggled");
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.render_loop
            .set_visible(visible, &mut self.scheduler, &mut self.canvas);
        debug!(visible, "visibility changed");
    }

    pub fn randomize_palette(&mut self) {
        self.palette.randomize(&mut self.rng);
        let colors: Vec<String> = self.palette.entries().iter().map(Rgba::to_string).collect();
        debug!(entries = self.palette.len(), ?colors, "palette randomized");
    }

    pub fn particles(&self) -> Vec<ParticleSnapshot> {
        self.field.snapshot()
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn motion_enabled(&self) -> bool {
        self.render_loop.motion_enabled()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_loop.frames_rendered()
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn host_frames(&self) -> u64 {
        self.scheduler.frame()
    }

    #[cfg(test)]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 640.0,
            height: 320.0,
            px_w: 80,
            px_h: 40,
        }
    }

    fn scene(config: SceneConfig) -> Scene {
        let mut s = Scene::with_rng(config, viewport(), StdRng::seed_from_u64(5));
        s.begin();
        s
    }

    #[test]
    fn animated_scene_keeps_one_backdrop_request() {
        let mut s = scene(SceneConfig::default());
        assert_eq!(s.loop_state(), LoopState::Running);
        for _ in 0..10 {
            s.run_frame();
            assert_eq!(s.pending_frames(), 1);
        }
        assert_eq!(s.particles().len(), 20);
        assert!(!s.canvas().is_blank());
    }

    #[test]
    fn reduced_motion_scene_paints_once_and_idles() {
        let mut s = scene(SceneConfig {
            reduced_motion: true,
            ..SceneConfig::default()
        });
        assert_eq!(s.loop_state(), LoopState::Stopped);
        assert_eq!(s.pending_frames(), 0);
        assert!(!s.canvas().is_blank());
        assert_eq!(s.run_frame(), 0);
        s.set_motion_enabled(true);
        assert_eq!(s.pending_frames(), 0);
    }

    #[test]
    fn bursts_run_while_backdrop_is_stopped() {
        let mut s = scene(SceneConfig {
            motion_enabled: false,
            ..SceneConfig::default()
        });
        assert_eq!(s.loop_state(), LoopState::Stopped);
        assert!(s.canvas().is_blank());

        assert!(s.spawn_burst(320.0, 160.0, 60.0));
        assert!(s.spawn_burst(100.0, 100.0, 40.0));
        assert_eq!(s.live_bursts(), 2);

        let mut frames = 0;
        while s.live_bursts() > 0 {
            s.run_frame();
            frames += 1;
        }
        assert_eq!(frames, 27);
        assert!(!s.canvas().is_blank());
        assert_eq!(s.loop_state(), LoopState::Stopped);
    }

    #[test]
    fn bursts_stay_lit_when_backdrop_restarts() {
        let mut s = scene(SceneConfig {
            motion_enabled: false,
            ..SceneConfig::default()
        });
        assert!(s.spawn_burst(320.0, 160.0, 60.0));
        s.run_frame();
        s.set_motion_enabled(true);
        s.run_frame();
        s.run_frame();

        assert_eq!(s.live_bursts(), 1);
        assert_eq!(s.loop_state(), LoopState::Running);
        let centre = s.canvas().pixel(40, 20).unwrap();
        assert!(centre[3] > 0.3, "burst centre alpha {}", centre[3]);
    }

    #[test]
    fn burst_limit_refuses_extra_spawns() {
        let mut s = scene(SceneConfig {
            max_bursts: 3,
            ..SceneConfig::default()
        });
        for _ in 0..3 {
            assert!(s.spawn_burst(10.0, 10.0, 10.0));
        }
        assert!(!s.spawn_burst(10.0, 10.0, 10.0));
        assert_eq!(s.live_bursts(), 3);
    }

    #[test]
    fn unlimited_bursts_pile_up() {
        let mut s = scene(SceneConfig {
            max_bursts: 0,
            ..SceneConfig::default()
        });
        for _ in 0..200 {
            assert!(s.spawn_burst(10.0, 10.0, 10.0));
        }
        assert_eq!(s.live_bursts(), 200);
    }

    #[test]
    fn hiding_stops_and_clears() {
        let mut s = scene(SceneConfig::default());
        s.run_frame();
        s.set_visible(false);
        assert_eq!(s.loop_state(), LoopState::Stopped);
        assert!(s.canvas().is_blank());
        assert_eq!(s.pending_frames(), 0);
        s.set_visible(true);
        assert_eq!(s.loop_state(), LoopState::Running);
    }

    #[test]
    fn resize_rebuilds_pool_without_touching_run_state() {
        let mut s = scene(SceneConfig::default());
        s.resize(Viewport {
            width: 3000.0,
            height: 3000.0,
            px_w: 30,
            px_h: 30,
        });
        assert_eq!(s.particles().len(), 129);
        assert_eq!(s.loop_state(), LoopState::Running);
        assert_eq!(s.pending_frames(), 1);
    }

    #[test]
    fn reinitialize_resets_ages() {
        let mut s = scene(SceneConfig::default());
        for _ in 0..3 {
            s.run_frame();
        }
        assert!(s.particles().iter().any(|p| p.life > 0));
        s.reinitialize();
        assert!(s.particles().iter().all(|p| p.life == 0));
    }

    #[test]
    fn randomized_palette_leaves_live_colors() {
        let mut s = scene(SceneConfig::default());
        let before: Vec<_> = s.particles().iter().map(|p| p.color).collect();
        let old_palette = s.palette().clone();
        s.randomize_palette();
        assert_ne!(s.palette(), &old_palette);
        let after: Vec<_> = s.particles().iter().map(|p| p.color).collect();
        assert_eq!(before, after);
    }
}
