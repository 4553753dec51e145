// Copyright (c) 2026 rezky_nightky

mod app;
mod burst;
mod cell;
mod config;
mod field;
mod frame;
mod input;
mod keypad;
mod logging;
mod palette;
mod particle;
mod render_loop;
mod runtime;
mod scene;
mod scheduler;
mod surface;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::Event;
use tracing::info;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::app::{App, AppConfig};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, parse_colors, parse_duration,
    parse_key_labels, print_list_palettes, reduced_motion_preferred, require_f64_range,
    require_u16_range, Args, ColorBg,
};
use crate::palette::{parse_palette_scheme, Palette};
use crate::runtime::ColorMode;
use crate::scene::SceneConfig;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("GLOWKEYS_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn or_exit<T>(r: Result<T, String>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> Result<ColorMode, String> {
    match args.colormode {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8) | Some(256) => Ok(ColorMode::Color256),
        Some(24) | Some(32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            m
        )),
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_palettes {
        print_list_palettes();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let color_mode = or_exit(detect_color_mode(&args));
    let target_fps = or_exit(require_f64_range("--fps", args.fps, 1.0, 240.0));
    let duration_s = or_exit(parse_duration(args.duration));
    let max_bursts = or_exit(require_u16_range("--max-bursts", args.max_bursts, 0, 1024));
    let labels = or_exit(parse_key_labels(&args.keys));
    let palette = match &args.colors {
        Some(list) => Palette::new(or_exit(parse_colors(list))),
        None => Palette::from_scheme(or_exit(parse_palette_scheme(&args.palette))),
    };

    if let Some(path) = &args.log_file {
        or_exit(logging::init_file_logging(path));
    }

    let config = AppConfig {
        scene: SceneConfig {
            reduced_motion: reduced_motion_preferred(&args),
            motion_enabled: !args.no_motion,
            palette,
            max_bursts: max_bursts as usize,
        },
        labels,
        color_mode,
        transparent_bg: args.color_bg == ColorBg::DefaultBackground,
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        build = build_info(),
        ?color_mode,
        target_fps,
        ?config,
        "starting"
    );

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut app = App::new(config, w, h);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut frames: u64 = 0;

    while app.is_running() {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            info!("duration reached");
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    ev => app.handle_event(&ev),
                }
                if !app.is_running() {
                    break;
                }
            }

            if !app.is_running() || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !app.is_running() {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            app.handle_event(&Event::Resize(nw, nh));
        }

        app.tick();
        term.draw(app.frame())?;
        frames = frames.saturating_add(1);

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(term);
    info!(
        frames,
        backdrop_frames = app.scene().frames_rendered(),
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "stopped"
    );

    Ok(())
}
