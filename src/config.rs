// Command-line configuration: which mode to run, where the photo lives,
// how fast time flows. Everything is checked once before the window opens.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::animation::{DEFAULT_TARGET_RATE_HZ, TARGET_RATE_RANGE_HZ};
use crate::error::Error;
use crate::render::DEFAULT_ASPECT;
use crate::stages::{stage_count, StepMode};

/// Animated candlelight over a still photo.
#[derive(Debug, Clone, Parser)]
#[command(name = "candlelight")]
#[command(version)]
pub struct Config {
    /// Cycle through the composition stages instead of showing the full effect
    #[arg(long)]
    pub breakdown: bool,

    /// Directory holding candlelight.jpg, candlelight-flame-mask.jpg and candlelight-mask.jpg
    #[arg(long, default_value = "images")]
    pub assets: PathBuf,

    /// Initial surface width in pixels (height follows the aspect ratio)
    #[arg(long, default_value_t = 480)]
    pub width: usize,

    /// Surface aspect ratio, width / height
    #[arg(long, default_value_t = DEFAULT_ASPECT)]
    pub aspect: f64,

    /// Ticks per second of wall time
    #[arg(long, default_value_t = DEFAULT_TARGET_RATE_HZ)]
    pub target_rate: f64,

    /// Milliseconds between stage changes in breakdown mode
    #[arg(long, default_value_t = 3000)]
    pub step_interval_ms: u64,

    /// Seed of the simplex noise field
    #[arg(long, default_value_t = 0)]
    pub seed: u32,

    /// Show an FPS readout
    #[arg(long)]
    pub hud: bool,

    /// Render one frame to this PNG file and exit
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Tick to render with --snapshot
    #[arg(long, default_value_t = 0.0, requires = "snapshot")]
    pub tick: f64,

    /// Stage index to render with --snapshot (defaults to the mode's first stage)
    #[arg(long, requires = "snapshot")]
    pub stage: Option<usize>,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 {
            return Err(Error::Config("--width must be positive".into()));
        }
        if !self.aspect.is_finite() || self.aspect <= 0.0 {
            return Err(Error::Config(format!("--aspect must be a positive number, got {}", self.aspect)));
        }
        if !TARGET_RATE_RANGE_HZ.contains(&self.target_rate) {
            return Err(Error::Config(format!(
                "--target-rate must be within {}..={} Hz, got {}",
                TARGET_RATE_RANGE_HZ.start(),
                TARGET_RATE_RANGE_HZ.end(),
                self.target_rate
            )));
        }
        if self.step_interval_ms == 0 {
            return Err(Error::Config("--step-interval-ms must be positive".into()));
        }
        if !self.tick.is_finite() || self.tick < 0.0 {
            return Err(Error::Config(format!("--tick must be >= 0, got {}", self.tick)));
        }
        if let Some(stage) = self.stage {
            if stage >= stage_count() {
                return Err(Error::Config(format!("--stage must be below {}, got {stage}", stage_count())));
            }
        }
        Ok(())
    }

    pub fn step_mode(&self) -> StepMode {
        if self.breakdown { StepMode::Breakdown } else { StepMode::Static }
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}
