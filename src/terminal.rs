// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
}

#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

fn leave(out: &mut Stdout) {
    let _ = out.execute(event::DisableFocusChange);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(event::EnableMouseCapture)?;
            // Not every terminal reports focus; visibility then simply never changes.
            let _ = out.execute(event::EnableFocusChange);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn pen_to(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if pen.fg != cell.fg {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = cell.fg;
        }
        if pen.bg != cell.bg {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = cell.bg;
        }
        if pen.bold != cell.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let resized = self
            .shown
            .as_ref()
            .map(|s| s.width != frame.width || s.height != frame.height)
            .unwrap_or(true);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let mut shown = match self.shown.take() {
            Some(s) if !resized => s,
            _ => Shown {
                width: frame.width,
                height: frame.height,
                cells: Vec::new(),
            },
        };
        let cells = frame.cells();
        let width = frame.width as usize;
        let mut pen = Pen::default();
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;

        for y in 0..frame.height {
            let row = y as usize * width;
            let mut x = 0usize;
            while x < width {
                let cell = cells[row + x];
                if shown.cells.get(row + x) == Some(&cell) {
                    x += 1;
                    continue;
                }

                self.run_buf.clear();
                self.run_buf.push(cell.ch);
                let start = x;
                x += 1;
                while x < width {
                    let next = cells[row + x];
                    if !next.same_style(&cell) || shown.cells.get(row + x) == Some(&next) {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    x += 1;
                }

                let at = (start as u16, y);
                if pen.pos != Some(at) {
                    self.stdout.queue(cursor::MoveTo(at.0, at.1))?;
                }
                self.pen_to(&mut pen, &cell)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                pen.pos = if x < width { Some((x as u16, y)) } else { None };
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;

        shown.cells.clear();
        shown.cells.extend_from_slice(cells);
        self.shown = Some(shown);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}
