use std::time::{Duration, Instant};

use log::info;

use crate::config::Config;
use crate::rng::RandomSource;

/// Requests from the hotkey listener and the Ctrl-C handler to the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    TogglePause,
    Quit,
}

/// Loop-owned run state. The loop is the only writer: other threads only
/// send `ControlEvent`s, so no lock is needed around any of this.
pub struct RunState {
    pub running: bool,
    pub paused: bool,
    pub next_click_at: Instant,
    pub next_scroll_at: Instant,
}

impl RunState {
    pub fn new() -> Self {
        // Far-future placeholders; the loop schedules both before iterating.
        let far = Instant::now() + Duration::from_secs(999_999);
        Self {
            running: true,
            paused: false,
            next_click_at: far,
            next_scroll_at: far,
        }
    }

    pub fn schedule_next_click(&mut self, cfg: &Config, rng: &mut RandomSource) {
        let secs = rng.uniform(cfg.click_interval_min, cfg.click_interval_max);
        self.next_click_at = Instant::now() + Duration::from_secs_f64(secs);
    }

    pub fn schedule_next_scroll(&mut self, cfg: &Config, rng: &mut RandomSource) {
        let secs = rng.uniform(cfg.scroll_interval_min, cfg.scroll_interval_max);
        self.next_scroll_at = Instant::now() + Duration::from_secs_f64(secs);
    }

    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::TogglePause => {
                self.paused = !self.paused;
                info!("Paused={}", self.paused);
            }
            ControlEvent::Quit => {
                self.running = false;
                info!("Stopping main loop...");
            }
        }
    }
}
