use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::Config;

/// Every probabilistic branch in the program, by name. Keeping them in one
/// table makes the decision policy enumerable and lets tests drive the
/// whole thing from a seeded source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    ThinkingPause,
    MicroMove,
    LongPause,
    RightClick,
    DoubleClick,
    PreClickNudge,
    PostClickDrift,
    DeferClick,
    DeferScroll,
    SplitScroll,
    HoverBeforeScroll,
    ScrollCorrection,
    ScrollDownward,
    TremorBoost,
    HopRest,
}

impl Decision {
    pub fn probability(self, cfg: &Config) -> f64 {
        match self {
            Decision::ThinkingPause => cfg.pause_probability,
            Decision::MicroMove => cfg.micro_move_probability,
            Decision::LongPause => cfg.long_pause_probability,
            Decision::RightClick => cfg.right_click_probability,
            Decision::DoubleClick => cfg.double_click_probability,
            Decision::PreClickNudge => 0.30,
            Decision::PostClickDrift => 0.25,
            Decision::DeferClick => 0.25,
            Decision::DeferScroll => 0.30,
            Decision::SplitScroll => 0.40,
            Decision::HoverBeforeScroll => 0.25,
            Decision::ScrollCorrection => 0.20,
            Decision::ScrollDownward => 0.50,
            Decision::TremorBoost => 0.10,
            Decision::HopRest => 0.35,
        }
    }
}

/// Seedable random source passed explicitly to everything that rolls dice.
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Uniform float in [a, b]; bounds may be given in either order.
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform integer in [lo, hi], inclusive on both ends.
    pub fn pick(&mut self, a: i32, b: i32) -> i32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.rng.gen_range(lo..=hi)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    pub fn decide(&mut self, cfg: &Config, choice: Decision) -> bool {
        self.chance(choice.probability(cfg))
    }
}
