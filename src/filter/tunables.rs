//! Live-adjustable filter parameters
//!
//! Every setter clamps into a fixed range instead of failing, and keeps the
//! sprint thresholds ordered (`disengage < engage`) so the hysteresis band is
//! never inverted.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 50..=1500;
pub const JITTER_PX_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const SPRINT_ENGAGE_RANGE: RangeInclusive<f64> = 20.0..=5000.0;
pub const SPRINT_DISENGAGE_RANGE: RangeInclusive<f64> = 10.0..=4800.0;
pub const SMOOTHING_ALPHA_RANGE: RangeInclusive<f64> = 0.05..=0.9;
pub const MAX_DY_RANGE: RangeInclusive<f64> = 1.0..=500.0;
pub const MIN_DT_MS_RANGE: RangeInclusive<u64> = 1..=100;
pub const SPRINT_SUPPRESS_MS_RANGE: RangeInclusive<u64> = 0..=2000;

/// Gap kept between the thresholds when disengage has to be pulled down
const THRESHOLD_GAP: f64 = 5.0;

/// Filter tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Release both outputs after this long without forward motion
    timeout_ms: u64,
    /// Upward motion at or below this many pixels per event is ignored
    jitter_px: f64,
    /// Smoothed speed (px/s) at which sprint engages
    sprint_engage: f64,
    /// Smoothed speed (px/s) at which sprint disengages
    sprint_disengage: f64,
    /// EMA weight of the newest sample
    smoothing_alpha: f64,
    /// Cap on per-event displacement (px)
    max_dy_per_event: f64,
    /// Floor for the time between two events
    min_dt_ms: u64,
    /// Sprint is ignored for this long after start
    sprint_suppress_ms: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            timeout_ms: 300,
            jitter_px: 2.0,
            sprint_engage: 90.0,
            sprint_disengage: 60.0,
            smoothing_alpha: 0.25,
            max_dy_per_event: 50.0,
            min_dt_ms: 10,
            sprint_suppress_ms: 120,
        }
    }
}

fn clamp_f64(current: f64, value: f64, range: RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return current;
    }
    value.clamp(*range.start(), *range.end())
}

fn clamp_u64(value: u64, range: RangeInclusive<u64>) -> u64 {
    value.clamp(*range.start(), *range.end())
}

impl Tunables {
    /// Re-apply every clamp, e.g. after loading from a file
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut out = defaults.clone();
        out.timeout_ms = clamp_u64(self.timeout_ms, TIMEOUT_MS_RANGE);
        out.jitter_px = clamp_f64(defaults.jitter_px, self.jitter_px, JITTER_PX_RANGE);
        out.smoothing_alpha = clamp_f64(
            defaults.smoothing_alpha,
            self.smoothing_alpha,
            SMOOTHING_ALPHA_RANGE,
        );
        out.max_dy_per_event =
            clamp_f64(defaults.max_dy_per_event, self.max_dy_per_event, MAX_DY_RANGE);
        out.min_dt_ms = clamp_u64(self.min_dt_ms, MIN_DT_MS_RANGE);
        out.sprint_suppress_ms = clamp_u64(self.sprint_suppress_ms, SPRINT_SUPPRESS_MS_RANGE);
        out.sprint_engage =
            clamp_f64(defaults.sprint_engage, self.sprint_engage, SPRINT_ENGAGE_RANGE);
        out.set_sprint_disengage(self.sprint_disengage);
        out
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn jitter_px(&self) -> f64 {
        self.jitter_px
    }

    pub fn sprint_engage(&self) -> f64 {
        self.sprint_engage
    }

    pub fn sprint_disengage(&self) -> f64 {
        self.sprint_disengage
    }

    pub fn smoothing_alpha(&self) -> f64 {
        self.smoothing_alpha
    }

    pub fn max_dy_per_event(&self) -> f64 {
        self.max_dy_per_event
    }

    pub fn min_dt_ms(&self) -> u64 {
        self.min_dt_ms
    }

    /// Minimum inter-event time in seconds
    pub fn min_dt_secs(&self) -> f64 {
        self.min_dt_ms as f64 / 1000.0
    }

    pub fn sprint_suppress_ms(&self) -> u64 {
        self.sprint_suppress_ms
    }

    pub fn sprint_suppress(&self) -> Duration {
        Duration::from_millis(self.sprint_suppress_ms)
    }

    pub fn set_timeout_ms(&mut self, value: u64) {
        self.timeout_ms = clamp_u64(value, TIMEOUT_MS_RANGE);
    }

    pub fn set_jitter_px(&mut self, value: f64) {
        self.jitter_px = clamp_f64(self.jitter_px, value, JITTER_PX_RANGE);
    }

    /// Set the engage speed, pulling disengage below it if needed
    pub fn set_sprint_engage(&mut self, value: f64) {
        self.sprint_engage = clamp_f64(self.sprint_engage, value, SPRINT_ENGAGE_RANGE);
        self.keep_thresholds_ordered();
    }

    /// Set the disengage speed; values at or above engage are pulled down
    pub fn set_sprint_disengage(&mut self, value: f64) {
        self.sprint_disengage =
            clamp_f64(self.sprint_disengage, value, SPRINT_DISENGAGE_RANGE);
        self.keep_thresholds_ordered();
    }

    pub fn set_smoothing_alpha(&mut self, value: f64) {
        self.smoothing_alpha = clamp_f64(self.smoothing_alpha, value, SMOOTHING_ALPHA_RANGE);
    }

    pub fn set_max_dy_per_event(&mut self, value: f64) {
        self.max_dy_per_event = clamp_f64(self.max_dy_per_event, value, MAX_DY_RANGE);
    }

    pub fn set_min_dt_ms(&mut self, value: u64) {
        self.min_dt_ms = clamp_u64(value, MIN_DT_MS_RANGE);
    }

    pub fn set_sprint_suppress_ms(&mut self, value: u64) {
        self.sprint_suppress_ms = clamp_u64(value, SPRINT_SUPPRESS_MS_RANGE);
    }

    fn keep_thresholds_ordered(&mut self) {
        if self.sprint_disengage >= self.sprint_engage {
            // engage >= 20, so this always lands strictly below it
            self.sprint_disengage = (self.sprint_engage - THRESHOLD_GAP)
                .max(*SPRINT_DISENGAGE_RANGE.start());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let t = Tunables::default();
        assert_eq!(t.timeout_ms(), 300);
        assert_eq!(t.jitter_px(), 2.0);
        assert_eq!(t.sprint_engage(), 90.0);
        assert_eq!(t.sprint_disengage(), 60.0);
        assert_eq!(t.smoothing_alpha(), 0.25);
        assert_eq!(t.max_dy_per_event(), 50.0);
        assert_eq!(t.min_dt_ms(), 10);
        assert_eq!(t.sprint_suppress_ms(), 120);
    }

    #[test]
    fn durations_follow_millis() {
        let t = Tunables::default();
        assert_eq!(t.timeout(), Duration::from_millis(300));
        assert_eq!(t.sprint_suppress(), Duration::from_millis(120));
        assert!((t.min_dt_secs() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn lowering_engage_pulls_disengage_down() {
        let mut t = Tunables::default();
        t.set_sprint_engage(50.0);
        assert_eq!(t.sprint_engage(), 50.0);
        assert_eq!(t.sprint_disengage(), 45.0);
        assert!(t.sprint_disengage() < t.sprint_engage());
    }

    #[test]
    fn disengage_at_or_above_engage_is_corrected() {
        let mut t = Tunables::default();
        t.set_sprint_disengage(90.0);
        assert_eq!(t.sprint_disengage(), 85.0);

        t.set_sprint_disengage(4000.0);
        assert_eq!(t.sprint_disengage(), 85.0);
    }

    #[test]
    fn engage_floor_keeps_gap() {
        let mut t = Tunables::default();
        t.set_sprint_engage(0.0);
        assert_eq!(t.sprint_engage(), 20.0);
        assert_eq!(t.sprint_disengage(), 15.0);
    }

    #[test]
    fn values_are_clamped_to_ranges() {
        let mut t = Tunables::default();
        t.set_timeout_ms(10);
        assert_eq!(t.timeout_ms(), 50);
        t.set_timeout_ms(10_000);
        assert_eq!(t.timeout_ms(), 1500);

        t.set_smoothing_alpha(1.5);
        assert_eq!(t.smoothing_alpha(), 0.9);
        t.set_smoothing_alpha(0.0);
        assert_eq!(t.smoothing_alpha(), 0.05);

        t.set_jitter_px(-3.0);
        assert_eq!(t.jitter_px(), 0.0);

        t.set_min_dt_ms(0);
        assert_eq!(t.min_dt_ms(), 1);

        t.set_max_dy_per_event(0.0);
        assert_eq!(t.max_dy_per_event(), 1.0);

        t.set_sprint_suppress_ms(60_000);
        assert_eq!(t.sprint_suppress_ms(), 2000);
    }

    #[test]
    fn nan_is_ignored() {
        let mut t = Tunables::default();
        t.set_smoothing_alpha(f64::NAN);
        t.set_sprint_engage(f64::NAN);
        assert_eq!(t.smoothing_alpha(), 0.25);
        assert_eq!(t.sprint_engage(), 90.0);
    }

    #[test]
    fn sanitized_repairs_swapped_thresholds() {
        let raw: Tunables = toml::from_str(
            r#"
sprint_engage = 100.0
sprint_disengage = 300.0
smoothing_alpha = 2.0
timeout_ms = 5
"#,
        )
        .expect("Failed to deserialize");

        let t = raw.sanitized();
        assert_eq!(t.sprint_engage(), 100.0);
        assert_eq!(t.sprint_disengage(), 95.0);
        assert_eq!(t.smoothing_alpha(), 0.9);
        assert_eq!(t.timeout_ms(), 50);
        // untouched fields come from defaults
        assert_eq!(t.jitter_px(), 2.0);
    }
}
