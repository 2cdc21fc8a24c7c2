// Stage presets for the progressive "breakdown" of the effect, and the
// stepper that walks through them.
// Visual expectation: in breakdown mode the picture builds up one layer at a
// time (noise, more noise, masked flame, full effect) and starts over.

use std::time::Duration;

use tracing::info;

use crate::error::Error;

/// Uniform weights for one composition step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StagePreset {
    pub name: &'static str,
    /// 1 = show the flame layer alone over black.
    pub only_flame: f32,
    pub flame_noise1: f32,
    pub flame_noise2: f32,
    /// 1 = confine the flame to the flame mask.
    pub flame_mask_factor: f32,
}

/// From least to most composited; each step only adds detail.
pub static STAGES: [StagePreset; 4] = [
    StagePreset { name: "1 layer of noise", only_flame: 1.0, flame_noise1: 1.0, flame_noise2: 0.0, flame_mask_factor: 0.0 },
    StagePreset { name: "2 layers of noise", only_flame: 1.0, flame_noise1: 1.0, flame_noise2: 1.0, flame_mask_factor: 0.0 },
    StagePreset { name: "Masked flame", only_flame: 1.0, flame_noise1: 1.0, flame_noise2: 1.0, flame_mask_factor: 1.0 },
    StagePreset { name: "Full effect", only_flame: 0.0, flame_noise1: 1.0, flame_noise2: 1.0, flame_mask_factor: 1.0 },
];

/// Time between stage changes in breakdown mode.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(3000);

pub fn stage_count() -> usize {
    STAGES.len()
}

pub fn stage_name(index: usize) -> Option<&'static str> {
    STAGES.get(index).map(|s| s.name)
}

impl StagePreset {
    fn weights(&self) -> [(&'static str, f32); 4] {
        [
            ("only_flame", self.only_flame),
            ("flame_noise1", self.flame_noise1),
            ("flame_noise2", self.flame_noise2),
            ("flame_mask_factor", self.flame_mask_factor),
        ]
    }

    /// True when `self` shows everything `prev` shows, and possibly more.
    fn refines(&self, prev: &StagePreset) -> bool {
        self.flame_noise1 >= prev.flame_noise1
            && self.flame_noise2 >= prev.flame_noise2
            && self.flame_mask_factor >= prev.flame_mask_factor
            && self.only_flame <= prev.only_flame
    }
}

/// Check a preset table before anything renders with it.
pub fn validate_presets(presets: &[StagePreset]) -> Result<(), Error> {
    if presets.len() != 4 {
        return Err(Error::PresetTable(format!("expected 4 stages, found {}", presets.len())));
    }
    for (i, p) in presets.iter().enumerate() {
        if p.name.trim().is_empty() {
            return Err(Error::PresetTable(format!("stage {i} has no name")));
        }
        for (field, w) in p.weights() {
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(Error::PresetTable(format!("stage {i} ({}): {field} = {w} outside [0,1]", p.name)));
            }
        }
    }
    for pair in presets.windows(2) {
        if !pair[1].refines(&pair[0]) {
            return Err(Error::PresetTable(format!(
                "stage \"{}\" removes detail shown by \"{}\"",
                pair[1].name, pair[0].name
            )));
        }
    }
    Ok(())
}

/// Fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// Cycle through every stage on a timer.
    Breakdown,
    /// Always show the final stage.
    Static,
}

/// Walks the preset table. In breakdown mode an interval timer advances
/// the stage; the timer is driven by `poll` from the host's frame loop.
#[derive(Debug)]
pub struct EffectStepper {
    mode: StepMode,
    index: usize,
    interval: Duration,
    /// Time of the next firing, measured on the same axis as `poll`'s argument.
    /// `None` once cancelled, or always in static mode.
    next_fire: Option<Duration>,
}

impl EffectStepper {
    pub fn new(mode: StepMode, interval: Duration) -> Self {
        let (index, next_fire) = match mode {
            StepMode::Breakdown => (0, Some(interval)),
            StepMode::Static => (STAGES.len() - 1, None),
        };
        Self { mode, index, interval, next_fire }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static StagePreset {
        &STAGES[self.index]
    }

    /// One timer firing. A no-op outside breakdown mode.
    pub fn advance(&mut self) {
        if self.mode == StepMode::Breakdown {
            self.index = (self.index + 1) % STAGES.len();
        }
    }

    /// Fire the timer once per whole interval elapsed up to `now`.
    /// Returns how many times it fired; a long stall is caught up in one step.
    pub fn poll(&mut self, now: Duration) -> u64 {
        let Some(due) = self.next_fire else { return 0 };
        if self.interval.is_zero() || now < due {
            return 0;
        }
        let period = self.interval.as_nanos();
        let late = (now - due).as_nanos();
        let fired = late / period + 1;

        if self.mode == StepMode::Breakdown {
            self.index = (self.index + (fired % STAGES.len() as u128) as usize) % STAGES.len();
        }
        // Next firing lands on the original grid: due + fired * interval.
        let into_period = Duration::from_nanos(u64::try_from(late % period).unwrap_or(u64::MAX));
        self.next_fire = Some(now.saturating_add(self.interval.saturating_sub(into_period)));

        let fired = u64::try_from(fired).unwrap_or(u64::MAX);
        info!(stage = self.index, name = self.current().name, fired, "stage changed");
        fired
    }

    /// Stop the interval timer; the current stage stays on screen.
    pub fn cancel(&mut self) {
        self.next_fire = None;
    }

    pub fn is_timer_active(&self) -> bool {
        self.next_fire.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_valid() {
        validate_presets(&STAGES).unwrap();
        assert_eq!(stage_count(), 4);
    }

    #[test]
    fn names_in_order() {
        let names: Vec<_> = (0..stage_count()).filter_map(stage_name).collect();
        assert_eq!(names, ["1 layer of noise", "2 layers of noise", "Masked flame", "Full effect"]);
        assert_eq!(stage_name(4), None);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(validate_presets(&STAGES[..3]).is_err());
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let mut table = STAGES;
        table[1].flame_noise2 = 1.5;
        assert!(matches!(validate_presets(&table), Err(Error::PresetTable(_))));
        table[1].flame_noise2 = f32::NAN;
        assert!(validate_presets(&table).is_err());
    }

    #[test]
    fn rejects_non_monotonic_reveal() {
        let mut table = STAGES;
        table.swap(1, 2);
        assert!(validate_presets(&table).is_err());
    }

    #[test]
    fn breakdown_cycles_with_period_four() {
        let mut s = EffectStepper::new(StepMode::Breakdown, DEFAULT_STEP_INTERVAL);
        let start = s.index();
        assert_eq!(start, 0);
        let mut seen = vec![s.current().name];
        for _ in 0..4 {
            s.advance();
            seen.push(s.current().name);
        }
        assert_eq!(s.index(), start);
        assert_eq!(seen, ["1 layer of noise", "2 layers of noise", "Masked flame", "Full effect", "1 layer of noise"]);
    }

    #[test]
    fn static_mode_is_pinned_to_full_effect() {
        let mut s = EffectStepper::new(StepMode::Static, DEFAULT_STEP_INTERVAL);
        assert_eq!(s.index(), 3);
        assert!(!s.is_timer_active());
        s.advance();
        assert_eq!(s.poll(Duration::from_secs(60)), 0);
        assert_eq!(s.current().name, "Full effect");
    }

    #[test]
    fn poll_fires_once_per_interval() {
        let mut s = EffectStepper::new(StepMode::Breakdown, Duration::from_millis(3000));
        assert_eq!(s.poll(Duration::from_millis(2999)), 0);
        assert_eq!(s.poll(Duration::from_millis(3000)), 1);
        assert_eq!(s.index(), 1);
        // A long stall catches up on every missed firing.
        assert_eq!(s.poll(Duration::from_millis(12_500)), 3);
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn long_stall_catches_up_in_one_poll() {
        let mut s = EffectStepper::new(StepMode::Breakdown, Duration::from_millis(1));
        // An hour at 1 ms per firing: 3.6M firings, a multiple of 4.
        assert_eq!(s.poll(Duration::from_secs(3600)), 3_600_000);
        assert_eq!(s.index(), 0);
        assert_eq!(s.poll(Duration::from_secs(3600)), 0);
        assert_eq!(s.poll(Duration::from_millis(3_600_001)), 1);
        assert_eq!(s.index(), 1);
    }

    #[test]
    fn catch_up_keeps_the_firing_grid() {
        let mut s = EffectStepper::new(StepMode::Breakdown, Duration::from_millis(3000));
        assert_eq!(s.poll(Duration::from_millis(7_400)), 2);
        assert_eq!(s.index(), 2);
        assert_eq!(s.poll(Duration::from_millis(8_999)), 0);
        assert_eq!(s.poll(Duration::from_millis(9_000)), 1);
        assert_eq!(s.index(), 3);
    }

    #[test]
    fn cancel_stops_the_timer() {
        let mut s = EffectStepper::new(StepMode::Breakdown, Duration::from_millis(10));
        s.cancel();
        assert_eq!(s.poll(Duration::from_secs(1)), 0);
        assert_eq!(s.index(), 0);
    }
}
