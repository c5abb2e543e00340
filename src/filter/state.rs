//! Motion tracking state guarded by the filter lock

use std::time::Instant;

/// Per-activation motion state
#[derive(Debug, Clone)]
pub struct FilterState {
    /// Whether samples are being processed
    pub active: bool,
    /// Last observed vertical coordinate; `None` means the next sample primes
    pub last_y: Option<f64>,
    /// Time of the last processed sample
    pub last_sample_time: Instant,
    /// Time of the last forward-classified sample
    pub last_forward_time: Instant,
    /// EMA of forward speed in px/s
    pub smoothed_speed: f64,
    /// Copy of the speed for display only
    pub displayed_speed: f64,
    /// Sprint cannot engage before this instant
    pub sprint_suppressed_until: Instant,
}

impl FilterState {
    pub fn new(now: Instant) -> Self {
        Self {
            active: false,
            last_y: None,
            last_sample_time: now,
            last_forward_time: now,
            smoothed_speed: 0.0,
            displayed_speed: 0.0,
            sprint_suppressed_until: now,
        }
    }

    /// Reset trackers for a new activation
    pub fn activate(&mut self, now: Instant, suppress_until: Instant) {
        self.active = true;
        self.last_y = None;
        self.last_sample_time = now;
        self.last_forward_time = now;
        self.smoothed_speed = 0.0;
        self.displayed_speed = 0.0;
        self.sprint_suppressed_until = suppress_until;
    }

    /// Whether the next sample only seeds `last_y`
    pub fn is_priming(&self) -> bool {
        self.last_y.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_state_is_inactive_and_zeroed() {
        let now = Instant::now();
        let state = FilterState::new(now);
        assert!(!state.active);
        assert!(state.is_priming());
        assert_eq!(state.smoothed_speed, 0.0);
        assert_eq!(state.displayed_speed, 0.0);
    }

    #[test]
    fn activate_resets_trackers() {
        let t0 = Instant::now();
        let mut state = FilterState::new(t0);
        state.last_y = Some(120.0);
        state.smoothed_speed = 400.0;
        state.displayed_speed = 400.0;

        let t1 = t0 + Duration::from_secs(1);
        state.activate(t1, t1 + Duration::from_millis(120));

        assert!(state.active);
        assert!(state.is_priming());
        assert_eq!(state.smoothed_speed, 0.0);
        assert_eq!(state.displayed_speed, 0.0);
        assert_eq!(state.last_sample_time, t1);
        assert_eq!(state.last_forward_time, t1);
        assert_eq!(state.sprint_suppressed_until, t1 + Duration::from_millis(120));
    }
}
