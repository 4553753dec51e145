// Copyright (c) 2026 rezky_nightky

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::palette::Rgba;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glowkeys --duration 0 --keys ASDFGHJKL --palette frost --color-bg black --fps 60 --max-bursts 48";

pub const DEFAULT_KEYS: &str = "ASDFGHJKL";
const MAX_KEYS: usize = 12;
const RESERVED_KEYS: [char; 3] = ['Q', 'M', 'R'];

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for line in text.lines() {
        if !out.is_empty() {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix("  glowkeys") {
            out.push_str("  \x1b[1;34mglowkeys\x1b[0m");
            out.push_str(rest);
        } else if line.ends_with(':') && line == line.to_ascii_uppercase() {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glowkeys", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 'k',
        long = "keys",
        default_value = DEFAULT_KEYS,
        help_heading = "GENERAL",
        help = "Key labels, one per key (1 to 12 letters or digits; q, m, r are reserved)"
    )]
    pub keys: String,

    #[arg(
        long = "no-motion",
        help_heading = "GENERAL",
        help = "Start with the motion toggle off"
    )]
    pub no_motion: bool,

    #[arg(
        long = "reduced-motion",
        help_heading = "GENERAL",
        help = "Paint one still backdrop and never animate (also GLOWKEYS_REDUCED_MOTION, NO_MOTION)"
    )]
    pub reduced_motion: bool,

    #[arg(
        short = 'p',
        long = "palette",
        default_value = "frost",
        help_heading = "APPEARANCE",
        help = "Particle palette (see --list-palettes)"
    )]
    pub palette: String,

    #[arg(
        long = "colors",
        help_heading = "APPEARANCE",
        help = "Custom palette entries separated by ';' (rgba(r, g, b, a), rgb(r, g, b) or #rrggbb); overrides --palette"
    )]
    pub colors: Option<String>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color), else 16-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "max-bursts",
        default_value_t = 48,
        help_heading = "PERFORMANCE",
        help = "Live burst limit (min 0 max 1024; 0 = no limit)"
    )]
    pub max_bursts: u16,

    #[arg(
        long = "log-file",
        help_heading = "LOGGING",
        help = "Write logs to this file (filter with GLOWKEYS_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-palettes",
        help_heading = "HELP",
        help = "List available palettes and exit"
    )]
    pub list_palettes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> Result<f64, String> {
    if !v.is_finite() {
        return Err(format!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        return Err(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    Ok(v)
}

pub fn require_u16_range(name: &str, v: u16, min: u16, max: u16) -> Result<u16, String> {
    if v < min || v > max {
        return Err(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    Ok(v)
}

pub fn parse_duration(v: Option<f64>) -> Result<Option<f64>, String> {
    match v {
        None => Ok(None),
        Some(s) if !s.is_finite() => Err(format!(
            "failed to apply --duration {} (must be a finite number)",
            s
        )),
        Some(s) if s <= 0.0 => Ok(None),
        Some(s) => require_f64_range("--duration", s, 0.1, 86400.0).map(Some),
    }
}

pub fn parse_key_labels(s: &str) -> Result<Vec<char>, String> {
    let labels: Vec<char> = s.trim().chars().map(|c| c.to_ascii_uppercase()).collect();
    if labels.is_empty() || labels.len() > MAX_KEYS {
        return Err(format!(
            "invalid --keys {:?} (1 to {} labels)",
            s, MAX_KEYS
        ));
    }
    for (i, c) in labels.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            return Err(format!("invalid --keys label {:?} (letters and digits only)", c));
        }
        if RESERVED_KEYS.contains(c) {
            return Err(format!("invalid --keys label {:?} (reserved: q, m, r)", c));
        }
        if labels[..i].contains(c) {
            return Err(format!("invalid --keys label {:?} (duplicate)", c));
        }
    }
    Ok(labels)
}

pub fn parse_colors(s: &str) -> Result<Vec<Rgba>, String> {
    let colors = s
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| {
            c.parse::<Rgba>()
                .map_err(|e| format!("invalid --colors entry {:?}: {}", c, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if colors.is_empty() {
        return Err("invalid --colors (no entries given)".to_string());
    }
    Ok(colors)
}

fn env_flag(value: Option<OsString>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v.to_str() != Some("0"))
}

pub fn reduced_motion_preferred(args: &Args) -> bool {
    args.reduced_motion
        || env_flag(std::env::var_os("GLOWKEYS_REDUCED_MOTION"))
        || env_flag(std::env::var_os("NO_MOTION"))
}

pub fn print_list_palettes() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE PALETTES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --palette.\x1b[0m");
    } else {
        println!("AVAILABLE PALETTES:");
        println!("NOTE: Use only the VALUE (left side) with --palette.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("frost        Pale blues and white (alias: snow)");
    println!("ember        Warm oranges and reds (alias: fire)");
    println!("aurora       Greens, teals and violet");
    println!("candy        Pinks and pastels");
    println!("mono         Grays (aliases: gray, grey)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["glowkeys"]).unwrap();
        assert_eq!(args.keys, DEFAULT_KEYS);
        assert_eq!(args.max_bursts, 48);
        assert_eq!(args.fps, 60.0);
        assert_eq!(args.color_bg, ColorBg::Black);
        assert!(args.log_file.is_none());
        assert_eq!(parse_key_labels(&args.keys).unwrap().len(), 9);
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "glowkeys",
            "--keys",
            "wasd",
            "--no-motion",
            "--color-bg",
            "default-background",
            "--max-bursts",
            "0",
            "--log-file",
            "/tmp/glowkeys.log",
        ])
        .unwrap();
        assert!(args.no_motion);
        assert_eq!(args.color_bg, ColorBg::DefaultBackground);
        assert_eq!(args.max_bursts, 0);
        assert_eq!(parse_key_labels(&args.keys).unwrap(), vec!['W', 'A', 'S', 'D']);
    }

    #[test]
    fn key_labels_are_validated() {
        assert!(parse_key_labels("").is_err());
        assert!(parse_key_labels("ABCDEFGHIJKLN").is_err());
        assert!(parse_key_labels("AQ").is_err());
        assert!(parse_key_labels("a-b").is_err());
        assert!(parse_key_labels("aA").is_err());
        assert_eq!(parse_key_labels(" 12z ").unwrap(), vec!['1', '2', 'Z']);
    }

    #[test]
    fn duration_limits() {
        assert_eq!(parse_duration(None), Ok(None));
        assert_eq!(parse_duration(Some(0.0)), Ok(None));
        assert_eq!(parse_duration(Some(-3.0)), Ok(None));
        assert_eq!(parse_duration(Some(2.5)), Ok(Some(2.5)));
        assert!(parse_duration(Some(0.05)).is_err());
        assert!(parse_duration(Some(f64::NAN)).is_err());
    }

    #[test]
    fn ranges_report_the_flag() {
        let err = require_f64_range("--fps", 500.0, 1.0, 240.0).unwrap_err();
        assert!(err.contains("--fps"));
        assert!(require_u16_range("--max-bursts", 1024, 0, 1024).is_ok());
        assert!(require_u16_range("--max-bursts", 1025, 0, 1024).is_err());
    }

    #[test]
    fn custom_colors_parse() {
        let colors = parse_colors("rgba(255, 255, 255, 0.9); #88ccff ;").unwrap();
        assert_eq!(
            colors,
            vec![Rgba::new(255, 255, 255, 0.9), Rgba::new(0x88, 0xcc, 0xff, 1.0)]
        );
        assert!(parse_colors(" ; ").is_err());
        let err = parse_colors("rgb(1, 2, 3);teal").unwrap_err();
        assert!(err.contains("teal"));
    }

    #[test]
    fn env_flags_ignore_empty_and_zero() {
        assert!(!env_flag(None));
        assert!(!env_flag(Some(OsString::from(""))));
        assert!(!env_flag(Some(OsString::from("0"))));
        assert!(env_flag(Some(OsString::from("1"))));
    }
}
