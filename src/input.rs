// Copyright (c) 2026 rezky_nightky

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::keypad::{Control, Keypad};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Activate {
        id: usize,
        pointer_col: Option<u16>,
    },
    Focus(usize),
    Blur(usize),
    MotionToggle(bool),
    RandomizePalette,
    Visibility(bool),
    Resize(u16, u16),
    Reinitialize,
    Inspect,
    Quit,
}

#[derive(Debug)]
pub struct InputBridge {
    motion_enabled: bool,
}

fn focus_change(keypad: &Keypad, id: usize, out: &mut Vec<Intent>) {
    match keypad.focused() {
        Some(prev) if prev == id => {}
        Some(prev) => {
            out.push(Intent::Blur(prev));
            out.push(Intent::Focus(id));
        }
        None => out.push(Intent::Focus(id)),
    }
}

impl InputBridge {
    pub fn new(motion_enabled: bool) -> Self {
        Self { motion_enabled }
    }

    #[cfg(test)]
    pub fn motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    fn toggle_motion(&mut self) -> Intent {
        self.motion_enabled = !self.motion_enabled;
        Intent::MotionToggle(self.motion_enabled)
    }

    pub fn translate(&mut self, ev: &Event, keypad: &Keypad) -> Vec<Intent> {
        let mut out = Vec::new();
        match ev {
            Event::Resize(w, h) => out.push(Intent::Resize(*w, *h)),
            Event::FocusGained => out.push(Intent::Visibility(true)),
            Event::FocusLost => out.push(Intent::Visibility(false)),
            Event::Mouse(m) => self.translate_mouse(m, keypad, &mut out),
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                self.translate_key(k, keypad, &mut out)
            }
            _ => {}
        }
        out
    }

    fn translate_mouse(&mut self, m: &MouseEvent, keypad: &Keypad, out: &mut Vec<Intent>) {
        if m.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        match keypad.hit_test(m.column, m.row) {
            Some(Control::Key(id)) => {
                focus_change(keypad, id, out);
                out.push(Intent::Activate {
                    id,
                    pointer_col: Some(m.column),
                });
            }
            Some(Control::MotionToggle) => out.push(self.toggle_motion()),
            Some(Control::Randomize) => out.push(Intent::RandomizePalette),
            None => {}
        }
    }

    fn translate_key(&mut self, k: &KeyEvent, keypad: &Keypad, out: &mut Vec<Intent>) {
        match k.code {
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                out.push(Intent::Quit)
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => out.push(Intent::Quit),
            KeyCode::Tab | KeyCode::Right => {
                if let Some(id) = keypad.neighbour(true) {
                    focus_change(keypad, id, out);
                }
            }
            KeyCode::BackTab | KeyCode::Left => {
                if let Some(id) = keypad.neighbour(false) {
                    focus_change(keypad, id, out);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = keypad.focused() {
                    out.push(Intent::Activate {
                        id,
                        pointer_col: None,
                    });
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => out.push(self.toggle_motion()),
            KeyCode::Char('r') | KeyCode::Char('R') => out.push(Intent::RandomizePalette),
            KeyCode::F(2) => out.push(Intent::Inspect),
            KeyCode::F(5) => out.push(Intent::Reinitialize),
            KeyCode::Char(c) => {
                if let Some(id) = keypad.find_label(c) {
                    focus_change(keypad, id, out);
                    out.push(Intent::Activate {
                        id,
                        pointer_col: None,
                    });
                }
            }
            _ => {}
        }
    }
}
