// Copyright (c) 2026 rezky_nightky

use crossterm::event::Event;
use crossterm::style::Color;
use tracing::{debug, info};

use crate::frame::Frame;
use crate::input::{InputBridge, Intent};
use crate::keypad::Keypad;
use crate::palette::terminal_color;
use crate::runtime::{ColorMode, CELL_PX_H, CELL_PX_W};
use crate::scene::{Scene, SceneConfig, Viewport};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub labels: Vec<char>,
    pub color_mode: ColorMode,
    pub transparent_bg: bool,
}

pub struct App {
    scene: Scene,
    keypad: Keypad,
    bridge: InputBridge,
    frame: Frame,
    color_mode: ColorMode,
    transparent_bg: bool,
    running: bool,
}

fn viewport(cols: u16, rows: u16) -> Viewport {
    Viewport {
        width: cols as f32 * CELL_PX_W,
        height: rows as f32 * CELL_PX_H,
        px_w: cols as usize,
        px_h: rows as usize * 2,
    }
}

impl App {
    pub fn new(config: AppConfig, cols: u16, rows: u16) -> Self {
        let scene = Scene::new(config.scene.clone(), viewport(cols, rows));
        Self::build(config, cols, rows, scene)
    }

    fn build(config: AppConfig, cols: u16, rows: u16, mut scene: Scene) -> Self {
        let mut keypad = Keypad::new(&config.labels);
        keypad.layout(cols, rows);
        scene.begin();
        Self {
            scene,
            keypad,
            bridge: InputBridge::new(config.scene.motion_enabled),
            frame: Frame::new(
                cols,
                rows,
                blank_bg(config.color_mode, config.transparent_bg),
            ),
            color_mode: config.color_mode,
            transparent_bg: config.transparent_bg,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[cfg(test)]
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn handle_event(&mut self, ev: &Event) {
        for intent in self.bridge.translate(ev, &self.keypad) {
            self.apply(intent);
        }
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Activate { id, pointer_col } => {
                self.keypad.press(id, pointer_col);
                if let Some((x, y, radius)) = self.keypad.burst_origin(id) {
                    self.scene.spawn_burst(x, y, radius);
                }
            }
            Intent::Focus(id) => {
                self.keypad.focus(id);
                debug!(id, "focus");
            }
            Intent::Blur(id) => {
                if self.keypad.focused() == Some(id) {
                    self.keypad.blur();
                }
                debug!(id, "blur");
            }
            Intent::MotionToggle(enabled) => self.scene.set_motion_enabled(enabled),
            Intent::RandomizePalette => {
                self.scene.randomize_palette();
                self.keypad.wobble();
            }
            Intent::Visibility(visible) => self.scene.set_visible(visible),
            Intent::Resize(cols, rows) => self.resize(cols, rows),
            Intent::Reinitialize => self.scene.reinitialize(),
            Intent::Inspect => self.inspect(),
            Intent::Quit => {
                info!("quit requested");
                self.running = false;
            }
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.scene.resize(viewport(cols, rows));
        self.keypad.layout(cols, rows);
        self.frame = Frame::new(cols, rows, blank_bg(self.color_mode, self.transparent_bg));
    }

    fn inspect(&self) {
        let particles = self.scene.particles();
        let n = particles.len().max(1) as f64;
        let mean_life = particles.iter().map(|p| p.life as f64).sum::<f64>() / n;
        let oldest = particles.iter().map(|p| p.life).max().unwrap_or(0);
        info!(
            particles = particles.len(),
            mean_life,
            oldest,
            live_bursts = self.scene.live_bursts(),
            pending = self.scene.pending_frames(),
            host_frames = self.scene.host_frames(),
            state = ?self.scene.loop_state(),
            motion = self.scene.motion_enabled(),
            "scene snapshot"
        );
    }

    pub fn tick(&mut self) {
        self.scene.run_frame();
        self.keypad.step();
        self.frame
            .paint_canvas(self.scene.canvas(), self.color_mode, self.transparent_bg);
        self.keypad
            .render(&mut self.frame, self.scene.motion_enabled(), self.color_mode);
    }
}

fn blank_bg(mode: ColorMode, transparent_bg: bool) -> Option<Color> {
    if transparent_bg {
        None
    } else {
        Some(terminal_color(mode, 0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::render_loop::LoopState;
    use crate::surface::Surface;

    impl App {
        fn with_rng(config: AppConfig, cols: u16, rows: u16, rng: StdRng) -> Self {
            let scene = Scene::with_rng(config.scene.clone(), viewport(cols, rows), rng);
            Self::build(config, cols, rows, scene)
        }
    }

    fn app(motion_enabled: bool) -> App {
        let config = AppConfig {
            scene: SceneConfig {
                motion_enabled,
                ..SceneConfig::default()
            },
            labels: vec!['A', 'S', 'D'],
            color_mode: ColorMode::TrueColor,
            transparent_bg: false,
        };
        App::with_rng(config, 80, 24, StdRng::seed_from_u64(11))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn clicking_a_key_presses_it_and_spawns_a_burst() {
        let mut a = app(true);
        let r = a.keypad().key(0).unwrap().rect;
        a.handle_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: r.x,
            row: r.y + 1,
            modifiers: KeyModifiers::NONE,
        }));
        assert!(a.keypad().key(0).unwrap().is_pressed());
        assert_eq!(a.keypad().focused(), Some(0));
        assert_eq!(a.scene().live_bursts(), 1);
    }

    #[test]
    fn keyboard_activation_spawns_the_same_burst() {
        let mut a = app(true);
        a.handle_event(&key(KeyCode::Tab));
        a.handle_event(&key(KeyCode::Enter));
        a.handle_event(&key(KeyCode::Char('s')));
        assert_eq!(a.scene().live_bursts(), 2);
        assert_eq!(a.keypad().focused(), Some(1));
    }

    #[test]
    fn motion_toggle_drives_the_loop() {
        let mut a = app(true);
        assert_eq!(a.scene().loop_state(), LoopState::Running);
        a.handle_event(&key(KeyCode::Char('m')));
        assert_eq!(a.scene().loop_state(), LoopState::Stopped);
        assert!(a.scene().canvas().is_blank());
        a.handle_event(&key(KeyCode::Char('m')));
        assert_eq!(a.scene().loop_state(), LoopState::Running);
    }

    #[test]
    fn bursts_play_with_motion_off() {
        let mut a = app(false);
        a.handle_event(&key(KeyCode::Char('a')));
        a.tick();
        assert!(!a.scene().canvas().is_blank());
        assert_eq!(a.scene().loop_state(), LoopState::Stopped);
    }

    #[test]
    fn tick_composes_keypad_over_backdrop() {
        let mut a = app(true);
        a.tick();
        let r = a.keypad().key(2).unwrap().rect;
        assert_eq!(a.frame().get(r.center_col(), r.y + 1).unwrap().ch, 'D');
    }

    #[test]
    fn resize_relayouts_everything() {
        let mut a = app(true);
        a.handle_event(&Event::Resize(120, 40));
        assert_eq!((a.frame().width, a.frame().height), (120, 40));
        assert_eq!(a.scene().canvas().width(), 960.0);
        assert_eq!(a.keypad().key(0).unwrap().rect.y, 26);
        assert_eq!(a.scene().loop_state(), LoopState::Running);
    }

    #[test]
    fn focus_lost_pauses_and_quit_stops() {
        let mut a = app(true);
        a.handle_event(&Event::FocusLost);
        assert_eq!(a.scene().pending_frames(), 0);
        a.handle_event(&Event::FocusGained);
        assert_eq!(a.scene().pending_frames(), 1);
        a.handle_event(&key(KeyCode::Char('q')));
        assert!(!a.is_running());
    }
}
