mod actions;
mod config;
mod driver;
mod engine;
#[cfg(feature = "hotkeys")]
mod hotkeys;
mod motion;
mod rng;
mod state;

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn, LevelFilter};

use crate::config::{Config, DEFAULT_MIN_MOVE};
use crate::driver::{EnigoDriver, MouseDriver};
use crate::engine::Engine;
use crate::rng::RandomSource;
use crate::state::ControlEvent;

#[derive(Parser, Debug)]
#[command(name = "anti_afk", about = "Random mouse mover / anti-AFK utility")]
struct Cli {
    /// Minimum seconds between action cycles
    #[arg(long, default_value_t = 3.0)]
    min_sleep: f64,
    /// Maximum seconds between action cycles
    #[arg(long, default_value_t = 12.0)]
    max_sleep: f64,
    /// Minimum movement duration in seconds
    #[arg(long, default_value_t = 0.4)]
    move_duration_min: f64,
    /// Maximum movement duration in seconds
    #[arg(long, default_value_t = 1.6)]
    move_duration_max: f64,
    /// Margin from screen edges in pixels
    #[arg(long, default_value_t = 40)]
    margin: i32,
    /// Probability of a click per cycle
    #[arg(long, default_value_t = 0.55)]
    click_prob: f64,
    /// Probability that a click is a right-click
    #[arg(long, default_value_t = 0.08)]
    right_click_prob: f64,
    /// Probability of a scroll per cycle
    #[arg(long, default_value_t = 0.25)]
    scroll_prob: f64,
    /// Minimum scroll amount (absolute)
    #[arg(long, default_value_t = 40)]
    scroll_min: i32,
    /// Maximum scroll amount (absolute)
    #[arg(long, default_value_t = 240)]
    scroll_max: i32,
    /// Do not actuate, only log intended actions
    #[arg(long)]
    dry_run: bool,
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
    /// Verbose cycle logging
    #[arg(long)]
    verbose: bool,
    /// Prompt for the sleep interval interactively before starting
    #[arg(long)]
    prompt_interval: bool,
    /// Keep moves near the current cursor position
    #[arg(long)]
    local_move: bool,
    /// Radius in pixels for local moves
    #[arg(long, default_value_t = 150)]
    move_radius: i32,
    /// Disable center-limited movement (allow full or local moves)
    #[arg(long)]
    no_centered: bool,
    /// Fraction of the half-screen radius to allow when centered
    #[arg(long, default_value_t = 0.8)]
    center_fraction: f64,
    /// Minimum seconds between scheduled clicks
    #[arg(long, default_value_t = 120.0)]
    click_interval_min: f64,
    /// Maximum seconds between scheduled clicks
    #[arg(long, default_value_t = 480.0)]
    click_interval_max: f64,
    /// Minimum seconds between scheduled scrolls
    #[arg(long, default_value_t = 90.0)]
    scroll_interval_min: f64,
    /// Maximum seconds between scheduled scrolls
    #[arg(long, default_value_t = 360.0)]
    scroll_interval_max: f64,
    /// Minimum distance in pixels to perform a full move
    #[arg(long, default_value_t = DEFAULT_MIN_MOVE)]
    min_move: i32,
    /// Disable global hotkeys (use CTRL+C to exit)
    #[arg(long)]
    no_hotkeys: bool,
    /// Stop after this many action cycles
    #[arg(long)]
    max_cycles: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            min_sleep: self.min_sleep,
            max_sleep: self.max_sleep,
            move_duration_min: self.move_duration_min,
            move_duration_max: self.move_duration_max,
            margin: self.margin,
            click_probability: self.click_prob,
            right_click_probability: self.right_click_prob,
            scroll_probability: self.scroll_prob,
            scroll_amount_min: self.scroll_min,
            scroll_amount_max: self.scroll_max,
            dry_run: self.dry_run,
            seed: self.seed,
            verbose: self.verbose,
            min_move: self.min_move,
            prompt_interval: self.prompt_interval,
            local_move: self.local_move,
            move_radius: self.move_radius,
            centered: !self.no_centered,
            center_fraction: self.center_fraction,
            click_interval_min: self.click_interval_min,
            click_interval_max: self.click_interval_max,
            scroll_interval_min: self.scroll_interval_min,
            scroll_interval_max: self.scroll_interval_max,
            enable_hotkeys: !self.no_hotkeys,
            max_cycles: self.max_cycles,
            ..Config::default()
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();
}

fn log_platform_notes() {
    match std::env::consts::OS {
        "macos" => {
            info!("Platform detected: macOS");
            info!("Grant Accessibility permission to your terminal in System Settings > Privacy & Security > Accessibility.");
        }
        "windows" => {
            info!("Platform detected: Windows");
            info!("If hotkeys do not respond, try running the terminal as Administrator.");
        }
        "linux" => {
            info!("Platform detected: Linux");
            if std::env::var_os("DISPLAY").is_none()
                && std::env::var_os("WAYLAND_DISPLAY").is_none()
            {
                warn!("DISPLAY/WAYLAND_DISPLAY not set. Cursor control needs a graphical session (X11/Wayland).");
            }
        }
        other => info!("Platform detected: {other}"),
    }
}

/// Parse "5", "3-7", "3 7" or "3,7" into a (min, max) sleep interval.
/// `Ok(None)` means empty input, i.e. keep the configured defaults.
fn parse_interval(raw: &str) -> Result<Option<(f64, f64)>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    let normalized = raw.replace([',', '-'], " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    let parse = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| "Invalid number format. Try again.".to_string())
    };
    match parts.as_slice() {
        [one] => {
            let v = parse(one)?;
            if v <= 0.0 {
                return Err("Interval must be positive.".into());
            }
            Ok(Some((v, v)))
        }
        [a, b] => {
            let a = parse(a)?;
            let b = parse(b)?;
            if a <= 0.0 || b <= 0.0 {
                return Err("Intervals must be positive numbers.".into());
            }
            Ok(Some(if a <= b { (a, b) } else { (b, a) }))
        }
        _ => Err("Couldn't parse input. Try '5' or '3-7'.".into()),
    }
}

fn prompt_for_interval(config: &mut Config) {
    info!("Enter sleep interval as a single number (e.g. 5) or min-max (e.g. 3-7). Leave empty to keep defaults.");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Interval (min or min-max): ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                info!("No input provided, keeping defaults.");
                return;
            }
            Ok(_) => {}
        }
        match parse_interval(line.trim()) {
            Ok(None) => {
                info!(
                    "Keeping default min/max sleep: {:.2} - {:.2}",
                    config.min_sleep, config.max_sleep
                );
                return;
            }
            Ok(Some((lo, hi))) => {
                config.min_sleep = lo;
                config.max_sleep = hi;
                if lo == hi {
                    info!("Using fixed interval: {:.2}s", lo);
                } else {
                    info!("Using interval: {:.2} - {:.2} seconds", lo, hi);
                }
                return;
            }
            Err(msg) => warn!("{msg}"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = cli.into_config();
    init_logging(config.verbose);
    log_platform_notes();

    if config.prompt_interval {
        prompt_for_interval(&mut config);
    }
    debug!(
        "Config: sleep {:.1}-{:.1}s, move {:.1}-{:.1}s, margin {}, click prob {:.2} (right {:.2}, double {:.2}), scroll prob {:.2} (amount {}..{}), click every {:.0}-{:.0}s, scroll every {:.0}-{:.0}s",
        config.min_sleep,
        config.max_sleep,
        config.move_duration_min,
        config.move_duration_max,
        config.margin,
        config.click_probability,
        config.right_click_probability,
        config.double_click_probability,
        config.scroll_probability,
        config.scroll_amount_min,
        config.scroll_amount_max,
        config.click_interval_min,
        config.click_interval_max,
        config.scroll_interval_min,
        config.scroll_interval_max,
    );

    let mut rng = RandomSource::new(config.seed);
    let mut driver = EnigoDriver::new();

    if config.centered {
        let (w, h) = driver.screen_size();
        let (cx, cy) = (w / 2, h / 2);
        if config.dry_run {
            info!("[INIT] Would move cursor to center ({cx}, {cy})");
        } else {
            driver.move_to(cx, cy, Duration::from_secs_f64(rng.uniform(0.2, 0.7)));
        }
    }

    info!("Anti-AFK mouse mover started.");
    if config.dry_run {
        info!("Dry-run mode: no real input events will be sent.");
    }

    let (tx, rx) = mpsc::channel();
    {
        let tx = tx.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received. Exiting.");
            let _ = tx.send(ControlEvent::Quit);
        })?;
    }

    #[cfg(feature = "hotkeys")]
    {
        if config.enable_hotkeys {
            info!("Hotkeys: CTRL+ALT+P pause/resume | CTRL+ALT+Q quit.");
            hotkeys::spawn_listener(tx.clone());
        } else {
            info!("Hotkeys disabled. Use CTRL+C to exit.");
        }
    }
    #[cfg(not(feature = "hotkeys"))]
    if config.enable_hotkeys {
        info!("Hotkey support not compiled in. Use CTRL+C to exit.");
    }
    info!("Park the cursor in a screen corner to abort via the fail-safe.");

    let mut engine = Engine::new(&config, &mut driver, &mut rng, rx);
    if let Err(err) = engine.run() {
        warn!("Fail-safe triggered: {err}. Exiting.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_accepts_all_documented_forms() {
        assert_eq!(parse_interval("5"), Ok(Some((5.0, 5.0))));
        assert_eq!(parse_interval("3-7"), Ok(Some((3.0, 7.0))));
        assert_eq!(parse_interval("3 7"), Ok(Some((3.0, 7.0))));
        assert_eq!(parse_interval("3,7"), Ok(Some((3.0, 7.0))));
        assert_eq!(parse_interval("2.5"), Ok(Some((2.5, 2.5))));
    }

    #[test]
    fn parse_interval_orders_reversed_bounds() {
        assert_eq!(parse_interval("7-3"), Ok(Some((3.0, 7.0))));
    }

    #[test]
    fn parse_interval_keeps_defaults_on_empty_input() {
        assert_eq!(parse_interval(""), Ok(None));
    }

    #[test]
    fn parse_interval_rejects_bad_input() {
        assert!(parse_interval("abc").is_err());
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("3-0").is_err());
        assert!(parse_interval("1-2-3").is_err());
    }
}
