// Copyright (c) 2026 rezky_nightky

use rand::Rng;
use tracing::debug;

use crate::field::ParticleField;
use crate::palette::{Palette, Rgba};
use crate::scene::FrameTask;
use crate::scheduler::{FrameRequestId, FrameScheduler};
use crate::surface::{ColorStop, Paint, Surface};

const OVERLAY_TOP: Rgba = Rgba::new(0, 0, 0, 0.0);
const OVERLAY_BOTTOM: Rgba = Rgba::new(4, 6, 18, 0.35);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

pub struct FrameCtx<'a, S: Surface + ?Sized, R: Rng + ?Sized> {
    pub surface: &'a mut S,
    pub field: &'a mut ParticleField,
    pub palette: &'a Palette,
    pub rng: &'a mut R,
}

/// Holds a frame request exactly while running.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    reduced_motion: bool,
    motion_enabled: bool,
    pending: Option<FrameRequestId>,
    frames: u64,
}

impl RenderLoop {
    pub fn new(reduced_motion: bool, motion_enabled: bool) -> Self {
        Self {
            state: LoopState::Stopped,
            reduced_motion,
            motion_enabled,
            pending: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    #[cfg(test)]
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self, scheduler: &mut FrameScheduler<FrameTask>) -> bool {
        if self.reduced_motion || self.state == LoopState::Running {
            return false;
        }
        self.state = LoopState::Running;
        self.pending = Some(scheduler.request(FrameTask::Backdrop));
        debug!("render loop started");
        true
    }

    pub fn stop<S: Surface + ?Sized>(
        &mut self,
        scheduler: &mut FrameScheduler<FrameTask>,
        surface: &mut S,
    ) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
        self.state = LoopState::Stopped;
        surface.clear();
        debug!(frames = self.frames, "render loop stopped");
    }

    pub fn on_frame<S: Surface + ?Sized, R: Rng + ?Sized>(
        &mut self,
        id: FrameRequestId,
        scheduler: &mut FrameScheduler<FrameTask>,
        ctx: FrameCtx<'_, S, R>,
    ) {
        if self.pending != Some(id) {
            return;
        }
        self.pending = None;
        if self.state != LoopState::Running {
            return;
        }

        Self::paint(ctx);
        self.frames = self.frames.wrapping_add(1);

        if self.reduced_motion {
            self.state = LoopState::Stopped;
            return;
        }
        self.pending = Some(scheduler.request(FrameTask::Backdrop));
    }

    pub fn render_still<S: Surface + ?Sized, R: Rng + ?Sized>(&mut self, ctx: FrameCtx<'_, S, R>) {
        Self::paint(ctx);
        self.frames = self.frames.wrapping_add(1);
    }

    fn paint<S: Surface + ?Sized, R: Rng + ?Sized>(ctx: FrameCtx<'_, S, R>) {
        let FrameCtx {
            surface,
            field,
            palette,
            rng,
        } = ctx;

        surface.clear();
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(
            0.0,
            0.0,
            w,
            h,
            &Paint::Linear {
                from: (0.0, 0.0),
                to: (0.0, h),
                stops: [
                    ColorStop::new(0.0, OVERLAY_TOP),
                    ColorStop::new(1.0, OVERLAY_BOTTOM),
                ],
            },
        );
        field.update_all(palette, rng);
        field.draw_all(surface);
    }

    pub fn set_motion_enabled<S: Surface + ?Sized>(
        &mut self,
        enabled: bool,
        scheduler: &mut FrameScheduler<FrameTask>,
        surface: &mut S,
    ) {
        self.motion_enabled = enabled;
        if enabled {
            self.start(scheduler);
        } else {
            self.stop(scheduler, surface);
        }
    }

    pub fn set_visible<S: Surface + ?Sized>(
        &mut self,
        visible: bool,
        scheduler: &mut FrameScheduler<FrameTask>,
        surface: &mut S,
    ) {
        if !visible {
            self.stop(scheduler, surface);
        } else if self.motion_enabled && !self.reduced_motion {
            self.start(scheduler);
        }
    }
}
