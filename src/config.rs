pub const DEFAULT_MIN_MOVE: i32 = 8;

/// All runtime knobs. Built once from the CLI and read-only afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub min_sleep: f64,
    pub max_sleep: f64,
    pub move_duration_min: f64,
    pub move_duration_max: f64,
    pub margin: i32,
    pub click_probability: f64,
    pub right_click_probability: f64,
    pub scroll_probability: f64,
    pub scroll_amount_min: i32,
    pub scroll_amount_max: i32,
    pub dry_run: bool,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub min_move: i32,
    pub prompt_interval: bool,
    pub local_move: bool,
    pub move_radius: i32,
    pub click_interval_min: f64,
    pub click_interval_max: f64,
    pub scroll_interval_min: f64,
    pub scroll_interval_max: f64,
    pub double_click_probability: f64,
    pub pause_probability: f64,
    pub pause_duration_min: f64,
    pub pause_duration_max: f64,
    pub micro_move_probability: f64,
    pub micro_move_radius: i32,
    pub long_pause_probability: f64,
    pub long_pause_min: f64,
    pub long_pause_max: f64,
    pub centered: bool,
    pub center_fraction: f64,
    pub enable_hotkeys: bool,
    pub max_cycles: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_sleep: 3.0,
            max_sleep: 12.0,
            move_duration_min: 0.4,
            move_duration_max: 1.6,
            margin: 40,
            click_probability: 0.55,
            right_click_probability: 0.08,
            scroll_probability: 0.25,
            scroll_amount_min: 40,
            scroll_amount_max: 240,
            dry_run: false,
            seed: None,
            verbose: false,
            min_move: DEFAULT_MIN_MOVE,
            prompt_interval: false,
            local_move: false,
            move_radius: 150,
            click_interval_min: 120.0,
            click_interval_max: 480.0,
            scroll_interval_min: 90.0,
            scroll_interval_max: 360.0,
            double_click_probability: 0.05,
            pause_probability: 0.15,
            pause_duration_min: 0.3,
            pause_duration_max: 2.5,
            micro_move_probability: 0.25,
            micro_move_radius: 15,
            long_pause_probability: 0.05,
            long_pause_min: 5.0,
            long_pause_max: 18.0,
            centered: true,
            center_fraction: 0.8,
            enable_hotkeys: true,
            max_cycles: None,
        }
    }
}
