use std::f64::consts::PI;
use std::thread;
use std::time::{Duration, Instant};

use log::info;

use crate::config::Config;
use crate::driver::{check_fail_safe, FailSafeTripped, MouseDriver};
use crate::rng::{Decision, RandomSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn dist(self, other: Point) -> f64 {
        ((self.x - other.x) as f64).hypot((self.y - other.y) as f64)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point { x, y }
    }
}

/// Pick the next destination. Centered mode takes priority over local mode;
/// both retry a bounded number of times to avoid returning the exact anchor
/// point, then fall back deterministically.
pub fn choose_point<D: MouseDriver>(
    driver: &mut D,
    rng: &mut RandomSource,
    cfg: &Config,
) -> Point {
    let (width, height) = driver.screen_size();
    let clamp_x = |x: i32| x.clamp(cfg.margin, width - cfg.margin);
    let clamp_y = |y: i32| y.clamp(cfg.margin, height - cfg.margin);

    if cfg.centered {
        let (cx, cy) = (width / 2, height / 2);
        let max_r = ((width.min(height) as f64 / 2.0 * cfg.center_fraction) as i32 - cfg.margin)
            .max(0) as f64;
        for _ in 0..40 {
            let angle = rng.uniform(0.0, 2.0 * PI);
            let r = rng.uniform(0.0, max_r);
            let x = clamp_x((cx as f64 + angle.cos() * r).round() as i32);
            let y = clamp_y((cy as f64 + angle.sin() * r).round() as i32);
            if (x, y) != (cx, cy) {
                return Point { x, y };
            }
        }
        return Point { x: cx, y: cy };
    }

    if cfg.local_move {
        let (cx, cy) = driver.position();
        for _ in 0..20 {
            let angle = rng.uniform(0.0, 2.0 * PI);
            let r = rng.uniform(0.0, cfg.move_radius as f64);
            let x = clamp_x((cx as f64 + angle.cos() * r).round() as i32);
            let y = clamp_y((cy as f64 + angle.sin() * r).round() as i32);
            if (x, y) != (cx, cy) {
                return Point { x, y };
            }
        }
        return Point {
            x: clamp_x(cx + cfg.move_radius / 2),
            y: clamp_y(cy),
        };
    }

    Point {
        x: rng.pick(cfg.margin, width - cfg.margin),
        y: rng.pick(cfg.margin, height - cfg.margin),
    }
}

/// Quadratic Bezier between `start` and `end` with a randomly displaced
/// control point, plus sinusoidal-windowed jitter that is zero at both
/// endpoints. One tremor roll per path may widen the jitter by 1.5x.
pub fn bezier_path(
    rng: &mut RandomSource,
    cfg: &Config,
    start: Point,
    end: Point,
    steps: usize,
) -> Vec<Point> {
    let steps = steps.max(2);
    let (x0, y0) = (start.x as f64, start.y as f64);
    let (x2, y2) = (end.x as f64, end.y as f64);
    let x1 = (x0 + x2) / 2.0 + (x2 - x0) * rng.uniform(-0.5, 0.5);
    let y1 = (y0 + y2) / 2.0 + (y2 - y0) * rng.uniform(-0.5, 0.5);
    let jitter_base = if rng.decide(cfg, Decision::TremorBoost) {
        0.8 * 1.5
    } else {
        0.8
    };
    let mut pts = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        let inv = 1.0 - t;
        let mut x = inv * inv * x0 + 2.0 * inv * t * x1 + t * t * x2;
        let mut y = inv * inv * y0 + 2.0 * inv * t * y1 + t * t * y2;
        let jitter = jitter_base * (t * PI).sin().powi(2);
        x += rng.uniform(-3.0, 3.0) * jitter;
        y += rng.uniform(-3.0, 3.0) * jitter;
        pts.push(Point {
            x: x.round() as i32,
            y: y.round() as i32,
        });
    }
    pts
}

/// Glide the cursor to `target` over roughly `duration` seconds. Targets
/// closer than `min_move` get a single tiny jitter hop instead, so the tool
/// does not fight a user who is actually at the keyboard.
pub fn perform_move<D: MouseDriver>(
    driver: &mut D,
    rng: &mut RandomSource,
    cfg: &Config,
    target: Point,
    duration: f64,
) -> Result<(), FailSafeTripped> {
    let start: Point = driver.position().into();
    if start.dist(target) < cfg.min_move as f64 {
        if cfg.dry_run {
            info!(
                "[MOVE] Skipped (too close) ({}, {}) -> ({}, {})",
                start.x, start.y, target.x, target.y
            );
        } else {
            let jx = start.x + rng.pick(-cfg.min_move, cfg.min_move);
            let jy = start.y + rng.pick(-cfg.min_move, cfg.min_move);
            driver.move_to(jx, jy, Duration::from_millis(50));
        }
        return Ok(());
    }

    let steps = ((duration * rng.uniform(40.0, 80.0)) as usize).max(8);
    let path = bezier_path(rng, cfg, start, target, steps);
    if cfg.dry_run {
        info!(
            "[MOVE] ({}, {}) -> ({}, {}) duration={:.2}s steps={}",
            start.x,
            start.y,
            target.x,
            target.y,
            duration,
            path.len()
        );
        return Ok(());
    }

    let started = Instant::now();
    let total = path.len();
    for (i, pt) in path.into_iter().enumerate() {
        check_fail_safe(driver)?;
        let remaining = (duration - started.elapsed().as_secs_f64()).max(0.0);
        let steps_left = (total - i) as f64;
        // Re-budget what is left of the duration across the remaining points.
        let chunk = ((remaining / steps_left) * rng.uniform(0.8, 1.2)).max(0.001);
        driver.move_to(pt.x, pt.y, Duration::from_secs_f64(chunk));
    }
    Ok(())
}

/// Restless small adjustments: 2-4 short hops around the current position.
pub fn perform_micro_move<D: MouseDriver>(
    driver: &mut D,
    rng: &mut RandomSource,
    cfg: &Config,
) -> Result<(), FailSafeTripped> {
    let (bx, by) = driver.position();
    let hops = rng.pick(2, 4);
    if cfg.dry_run {
        info!("[MICRO-MOVE] starting at ({}, {}) with {} hops", bx, by, hops);
        return Ok(());
    }
    for idx in 0..hops {
        check_fail_safe(driver)?;
        let angle = rng.uniform(0.0, 2.0 * PI);
        let r = rng.uniform(2.0, cfg.micro_move_radius as f64);
        let nx = (bx as f64 + angle.cos() * r).round() as i32;
        let ny = (by as f64 + angle.sin() * r).round() as i32;
        driver.move_to(nx, ny, Duration::from_secs_f64(rng.uniform(0.05, 0.18)));
        if rng.decide(cfg, Decision::HopRest) && idx < hops - 1 {
            thread::sleep(Duration::from_secs_f64(rng.uniform(0.05, 0.2)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, ScriptedDriver};

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn bezier_returns_exact_step_count_with_clean_endpoints() {
        let cfg = cfg();
        let start = Point { x: 100, y: 200 };
        let end = Point { x: 800, y: 600 };
        for seed in 0..10 {
            let mut rng = RandomSource::new(Some(seed));
            for steps in [2, 8, 24, 61] {
                let path = bezier_path(&mut rng, &cfg, start, end, steps);
                assert_eq!(path.len(), steps);
                assert_eq!(path[0], start, "seed {seed} steps {steps}");
                assert_eq!(path[steps - 1], end, "seed {seed} steps {steps}");
            }
        }
    }

    #[test]
    fn short_distance_becomes_single_jitter_hop() {
        let cfg = cfg();
        let mut rng = RandomSource::new(Some(5));
        let mut driver = ScriptedDriver::new((1920, 1080), (500, 500));
        let target = Point { x: 503, y: 502 };
        perform_move(&mut driver, &mut rng, &cfg, target, 1.0).unwrap();
        assert_eq!(driver.calls.len(), 1);
        match driver.calls[0] {
            DriverCall::MoveTo(x, y) => {
                assert!((x - 500).abs() <= cfg.min_move);
                assert!((y - 500).abs() <= cfg.min_move);
            }
            other => panic!("expected MoveTo, got {other:?}"),
        }
    }

    #[test]
    fn dry_run_move_issues_no_driver_calls() {
        let mut cfg = cfg();
        cfg.dry_run = true;
        let mut rng = RandomSource::new(Some(6));
        let mut driver = ScriptedDriver::new((1920, 1080), (500, 500));
        perform_move(&mut driver, &mut rng, &cfg, Point { x: 900, y: 700 }, 1.0).unwrap();
        perform_move(&mut driver, &mut rng, &cfg, Point { x: 502, y: 501 }, 1.0).unwrap();
        perform_micro_move(&mut driver, &mut rng, &cfg).unwrap();
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn full_move_walks_the_whole_path_to_target() {
        let cfg = cfg();
        let mut rng = RandomSource::new(Some(7));
        let mut driver = ScriptedDriver::new((1920, 1080), (200, 200));
        let target = Point { x: 900, y: 700 };
        perform_move(&mut driver, &mut rng, &cfg, target, 0.0).unwrap();
        // duration 0 bottoms out at the 8-step minimum
        assert_eq!(driver.calls.len(), 8);
        assert_eq!(*driver.calls.last().unwrap(), DriverCall::MoveTo(900, 700));
    }

    #[test]
    fn centered_points_respect_margin_and_radius() {
        let cfg = cfg();
        let mut rng = RandomSource::new(Some(8));
        let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
        let center = Point { x: 960, y: 540 };
        let max_r = (1080.0 / 2.0 * cfg.center_fraction) as i32 - cfg.margin;
        for _ in 0..200 {
            let p = choose_point(&mut driver, &mut rng, &cfg);
            assert!(p.x >= cfg.margin && p.x <= 1920 - cfg.margin);
            assert!(p.y >= cfg.margin && p.y <= 1080 - cfg.margin);
            assert_ne!(p, center);
            // allow for per-axis rounding
            assert!(p.dist(center) <= max_r as f64 + 1.0, "{p:?}");
        }
    }

    #[test]
    fn local_points_stay_within_move_radius() {
        let mut cfg = cfg();
        cfg.centered = false;
        cfg.local_move = true;
        let mut rng = RandomSource::new(Some(9));
        let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
        let here = Point { x: 960, y: 540 };
        for _ in 0..200 {
            let p = choose_point(&mut driver, &mut rng, &cfg);
            assert!(p.dist(here) <= cfg.move_radius as f64 + 1.0, "{p:?}");
            assert!(p.x >= cfg.margin && p.x <= 1920 - cfg.margin);
            assert!(p.y >= cfg.margin && p.y <= 1080 - cfg.margin);
        }
    }

    #[test]
    fn uniform_points_stay_inside_margin_rectangle() {
        let mut cfg = cfg();
        cfg.centered = false;
        let mut rng = RandomSource::new(Some(10));
        let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
        for _ in 0..200 {
            let p = choose_point(&mut driver, &mut rng, &cfg);
            assert!(p.x >= cfg.margin && p.x <= 1920 - cfg.margin);
            assert!(p.y >= cfg.margin && p.y <= 1080 - cfg.margin);
        }
    }

    #[test]
    fn micro_move_hops_stay_near_the_anchor() {
        let cfg = cfg();
        for seed in 0..20 {
            let mut rng = RandomSource::new(Some(seed));
            let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
            perform_micro_move(&mut driver, &mut rng, &cfg).unwrap();
            assert!((2..=4).contains(&driver.calls.len()), "seed {seed}");
            for call in &driver.calls {
                match *call {
                    DriverCall::MoveTo(x, y) => {
                        let d = Point { x, y }.dist(Point { x: 960, y: 540 });
                        assert!(d <= cfg.micro_move_radius as f64 + 1.0);
                    }
                    ref other => panic!("unexpected call {other:?}"),
                }
            }
        }
    }
}
