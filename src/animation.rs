// The time axis of the effect and the driver that owns it.
// Visual expectation: at the reference 1 Hz target, one second of wall time
// is one tick no matter how often the display refreshes. A slow device just
// takes bigger steps, so the flicker keeps its speed.

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;
use crate::stages::{EffectStepper, StagePreset, StepMode};

/// Reference target rate: one tick per second.
pub const DEFAULT_TARGET_RATE_HZ: f64 = 1.0;

/// Accepted target rates. Inside this range the frame duration is a
/// positive, finite number of seconds.
pub const TARGET_RATE_RANGE_HZ: RangeInclusive<f64> = 1e-6..=1e6;

/// Per-refresh tick accumulator.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    frame_secs: f64, // seconds per target frame, always > 0
    last: Duration, // previous callback time, measured from the clock origin
    tick: f64,
}

impl AnimationClock {
    /// Fails for rates outside `TARGET_RATE_RANGE_HZ` (including NaN).
    pub fn new(target_rate_hz: f64) -> Result<Self, Error> {
        if !TARGET_RATE_RANGE_HZ.contains(&target_rate_hz) {
            return Err(Error::Config(format!(
                "target rate must be within {}..={} Hz, got {target_rate_hz}",
                TARGET_RATE_RANGE_HZ.start(),
                TARGET_RATE_RANGE_HZ.end()
            )));
        }
        Ok(Self { frame_secs: 1.0 / target_rate_hz, last: Duration::ZERO, tick: 0.0 })
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    /// Display refresh callback. `now` is the time since the clock origin.
    /// A timestamp earlier than the previous one counts as zero elapsed time.
    pub fn on_refresh(&mut self, now: Duration) -> f64 {
        let delta = now.saturating_sub(self.last);
        self.last = now;
        self.tick += delta.as_secs_f64() / self.frame_secs;
        self.tick
    }
}

/// Everything that changes between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub tick: f64,
    pub stage_index: usize,
}

/// Owns the state and both of its writers: the clock (every refresh) and
/// the stepper's interval timer (breakdown mode only).
#[derive(Debug)]
pub struct Animator {
    clock: AnimationClock,
    stepper: EffectStepper,
    state: AnimationState,
}

impl Animator {
    pub fn new(clock: AnimationClock, stepper: EffectStepper) -> Self {
        let state = AnimationState { tick: clock.tick(), stage_index: stepper.index() };
        Self { clock, stepper, state }
    }

    /// Advance to `now` and return the snapshot to render with.
    pub fn frame(&mut self, now: Duration) -> (AnimationState, &'static StagePreset) {
        self.state.tick = self.clock.on_refresh(now);
        self.stepper.poll(now);
        self.state.stage_index = self.stepper.index();
        (self.state, self.stepper.current())
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn mode(&self) -> StepMode {
        self.stepper.mode()
    }

    /// Release the interval timer. Also runs on drop.
    pub fn stop(&mut self) {
        if self.stepper.is_timer_active() {
            debug!("cancelling stage timer");
            self.stepper.cancel();
        }
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop();
    }
}
