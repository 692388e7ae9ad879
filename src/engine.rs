use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::info;

use crate::actions;
use crate::config::Config;
use crate::driver::{check_fail_safe, FailSafeTripped, MouseDriver};
use crate::motion;
use crate::rng::{Decision, RandomSource};
use crate::state::{ControlEvent, RunState};

const PAUSED_POLL: Duration = Duration::from_millis(500);

/// The action loop: owns the run state outright and applies control events
/// sent by the hotkey listener and the Ctrl-C handler.
pub struct Engine<'a, D: MouseDriver> {
    cfg: &'a Config,
    driver: &'a mut D,
    rng: &'a mut RandomSource,
    events: Receiver<ControlEvent>,
    state: RunState,
}

impl<'a, D: MouseDriver> Engine<'a, D> {
    pub fn new(
        cfg: &'a Config,
        driver: &'a mut D,
        rng: &'a mut RandomSource,
        events: Receiver<ControlEvent>,
    ) -> Self {
        Self {
            cfg,
            driver,
            rng,
            events,
            state: RunState::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), FailSafeTripped> {
        self.state.schedule_next_click(self.cfg, self.rng);
        self.state.schedule_next_scroll(self.cfg, self.rng);
        let mut iteration: u64 = 0;
        loop {
            self.drain_events();
            if !self.state.running {
                break;
            }
            if self.state.paused {
                self.wait_for_event(PAUSED_POLL);
                continue;
            }
            iteration += 1;
            check_fail_safe(self.driver)?;

            if self.rng.decide(self.cfg, Decision::ThinkingPause) {
                let pause = self
                    .rng
                    .uniform(self.cfg.pause_duration_min, self.cfg.pause_duration_max);
                if self.cfg.verbose || self.cfg.dry_run {
                    info!("[PAUSE] Thinking pause: {:.2}s", pause);
                }
                self.sleep_interruptible(pause);
            }

            if self.rng.decide(self.cfg, Decision::MicroMove) {
                motion::perform_micro_move(self.driver, self.rng, self.cfg)?;
            } else {
                let target = motion::choose_point(self.driver, self.rng, self.cfg);
                let duration = self
                    .rng
                    .uniform(self.cfg.move_duration_min, self.cfg.move_duration_max);
                motion::perform_move(self.driver, self.rng, self.cfg, target, duration)?;
            }

            let now = Instant::now();
            if now >= self.state.next_click_at {
                if self.rng.decide(self.cfg, Decision::DeferClick) {
                    let delay = self.rng.uniform(6.0, 22.0);
                    self.state.next_click_at = now + Duration::from_secs_f64(delay);
                    if self.cfg.verbose || self.cfg.dry_run {
                        info!("[CLICK] Deferred by {:.1}s", delay);
                    }
                } else {
                    actions::maybe_click(self.driver, self.rng, self.cfg);
                    self.state.schedule_next_click(self.cfg, self.rng);
                }
            }
            if now >= self.state.next_scroll_at {
                if self.rng.decide(self.cfg, Decision::DeferScroll) {
                    let delay = self.rng.uniform(5.0, 18.0);
                    self.state.next_scroll_at = now + Duration::from_secs_f64(delay);
                    if self.cfg.verbose || self.cfg.dry_run {
                        info!("[SCROLL] Deferred by {:.1}s", delay);
                    }
                } else {
                    actions::maybe_scroll(self.driver, self.rng, self.cfg);
                    self.state.schedule_next_scroll(self.cfg, self.rng);
                }
            }

            let sleep_time = self.rng.uniform(self.cfg.min_sleep, self.cfg.max_sleep);
            if self.cfg.verbose || self.cfg.dry_run {
                info!("[SLEEP] {:.2}s (iteration {})", sleep_time, iteration);
            }
            self.sleep_interruptible(sleep_time);

            if self.rng.decide(self.cfg, Decision::LongPause) {
                let long_pause = self
                    .rng
                    .uniform(self.cfg.long_pause_min, self.cfg.long_pause_max);
                if self.cfg.verbose || self.cfg.dry_run {
                    info!("[PAUSE] Long pause: {:.2}s", long_pause);
                }
                self.sleep_interruptible(long_pause);
            }

            if let Some(max) = self.cfg.max_cycles {
                if iteration >= max {
                    info!("Completed {} cycles, exiting.", iteration);
                    break;
                }
            }
        }
        info!("Loop terminated.");
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.state.apply(event);
        }
    }

    /// Block for one event or until the timeout elapses.
    fn wait_for_event(&mut self, timeout: Duration) {
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.state.apply(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => thread::sleep(timeout),
        }
    }

    /// Sleep that wakes up on a control event so pause/quit land mid-sleep.
    fn sleep_interruptible(&mut self, secs: f64) {
        let deadline = Instant::now() + Duration::from_secs_f64(secs.max(0.0));
        loop {
            let now = Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now) else {
                return;
            };
            if remaining.is_zero() {
                return;
            }
            match self.events.recv_timeout(remaining) {
                Ok(event) => {
                    self.state.apply(event);
                    return;
                }
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(remaining);
                    return;
                }
            }
        }
    }
}
