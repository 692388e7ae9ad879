use std::thread;
use std::time::Duration;

use log::info;

use crate::config::Config;
use crate::driver::{Button, MouseDriver};
use crate::rng::{Decision, RandomSource};

/// One scheduled click, with the human-texture extras: an occasional
/// pre-click correction nudge, double-clicks, and post-click drift.
pub fn maybe_click<D: MouseDriver>(driver: &mut D, rng: &mut RandomSource, cfg: &Config) {
    let button = if rng.decide(cfg, Decision::RightClick) {
        Button::Right
    } else {
        Button::Left
    };
    let clicks = if rng.decide(cfg, Decision::DoubleClick) {
        2
    } else {
        1
    };
    if cfg.dry_run {
        info!("[CLICK] button={:?} clicks={}", button, clicks);
        return;
    }
    if rng.decide(cfg, Decision::PreClickNudge) {
        let dx = rng.uniform(-5.0, 5.0).round() as i32;
        let dy = rng.uniform(-5.0, 5.0).round() as i32;
        driver.move_rel(dx, dy, Duration::from_secs_f64(rng.uniform(0.04, 0.12)));
    }
    driver.click(button);
    if clicks == 2 {
        thread::sleep(Duration::from_secs_f64(rng.uniform(0.08, 0.15)));
        driver.click(button);
    }
    if rng.decide(cfg, Decision::PostClickDrift) {
        let dx = rng.uniform(-6.0, 6.0).round() as i32;
        let dy = rng.uniform(-4.0, 4.0).round() as i32;
        driver.move_rel(dx, dy, Duration::from_secs_f64(rng.uniform(0.05, 0.14)));
    }
}

/// One scheduled scroll. Large amounts sometimes split into 2-3 bursts, a
/// single scroll may get a tiny hover first, and some scrolls are followed
/// by a small opposite-direction correction.
pub fn maybe_scroll<D: MouseDriver>(driver: &mut D, rng: &mut RandomSource, cfg: &Config) {
    let amount = rng.pick(cfg.scroll_amount_min, cfg.scroll_amount_max);
    let value = if rng.decide(cfg, Decision::ScrollDownward) {
        -amount
    } else {
        amount
    };
    if cfg.dry_run {
        info!("[SCROLL] amount={}", value);
        return;
    }
    if value.abs() > 100 && rng.decide(cfg, Decision::SplitScroll) {
        let bursts = rng.pick(2, 3);
        let per = value / bursts;
        for i in 0..bursts {
            driver.scroll(per);
            if i < bursts - 1 {
                thread::sleep(Duration::from_secs_f64(rng.uniform(0.05, 0.15)));
            }
        }
    } else if rng.decide(cfg, Decision::HoverBeforeScroll) {
        let dx = rng.uniform(-4.0, 4.0).round() as i32;
        let dy = rng.uniform(-4.0, 4.0).round() as i32;
        driver.move_rel(dx, dy, Duration::from_secs_f64(rng.uniform(0.04, 0.1)));
        driver.scroll(value);
    } else {
        driver.scroll(value);
    }
    if rng.decide(cfg, Decision::ScrollCorrection) {
        let correction = (value as f64 * rng.uniform(-0.3, -0.1)) as i32;
        if correction != 0 {
            thread::sleep(Duration::from_secs_f64(rng.uniform(0.05, 0.2)));
            driver.scroll(correction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverCall, ScriptedDriver};

    #[test]
    fn dry_run_click_and_scroll_never_actuate() {
        let mut cfg = Config::default();
        cfg.dry_run = true;
        let mut rng = RandomSource::new(Some(1));
        let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
        for _ in 0..50 {
            maybe_click(&mut driver, &mut rng, &cfg);
            maybe_scroll(&mut driver, &mut rng, &cfg);
        }
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn click_emits_exactly_one_left_click_by_default() {
        let mut cfg = Config::default();
        cfg.right_click_probability = 0.0;
        cfg.double_click_probability = 0.0;
        for seed in 0..20 {
            let mut rng = RandomSource::new(Some(seed));
            let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
            maybe_click(&mut driver, &mut rng, &cfg);
            let clicks: Vec<_> = driver
                .calls
                .iter()
                .filter(|c| matches!(c, DriverCall::Click(_)))
                .collect();
            assert_eq!(clicks.len(), 1, "seed {seed}");
            assert_eq!(*clicks[0], DriverCall::Click(Button::Left));
            for call in &driver.calls {
                assert!(
                    matches!(call, DriverCall::Click(_) | DriverCall::MoveRel(_, _)),
                    "unexpected call {call:?}"
                );
            }
        }
    }

    #[test]
    fn forced_double_right_click_clicks_twice() {
        let mut cfg = Config::default();
        cfg.right_click_probability = 1.0;
        cfg.double_click_probability = 1.0;
        let mut rng = RandomSource::new(Some(3));
        let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
        maybe_click(&mut driver, &mut rng, &cfg);
        let clicks: Vec<_> = driver
            .calls
            .iter()
            .filter(|c| matches!(c, DriverCall::Click(_)))
            .collect();
        assert_eq!(clicks.len(), 2);
        assert!(clicks.iter().all(|c| **c == DriverCall::Click(Button::Right)));
    }

    #[test]
    fn scroll_magnitudes_stay_bounded() {
        let mut cfg = Config::default();
        cfg.scroll_amount_min = 200;
        cfg.scroll_amount_max = 200;
        for seed in 0..50 {
            let mut rng = RandomSource::new(Some(seed));
            let mut driver = ScriptedDriver::new((1920, 1080), (960, 540));
            maybe_scroll(&mut driver, &mut rng, &cfg);
            let scrolls: Vec<i32> = driver
                .calls
                .iter()
                .filter_map(|c| match c {
                    DriverCall::Scroll(v) => Some(*v),
                    _ => None,
                })
                .collect();
            assert!(!scrolls.is_empty(), "seed {seed}");
            assert!(scrolls.len() <= 4, "seed {seed}: {scrolls:?}");
            for v in &scrolls {
                assert!(v.abs() <= 200, "seed {seed}: {scrolls:?}");
            }
            // an opposite-sign correction can only be the last scroll and is small
            let first_sign = scrolls[0].signum();
            for (i, v) in scrolls.iter().enumerate() {
                if v.signum() != first_sign {
                    assert_eq!(i, scrolls.len() - 1, "seed {seed}: {scrolls:?}");
                    assert!(v.abs() <= 60, "seed {seed}: {scrolls:?}");
                }
            }
        }
    }
}
