//! Motion sampler: velocity estimate and sprint hysteresis

use super::FilterCore;
use crate::keys::{KeySink, VirtualKey};
use log::{debug, trace};
use std::time::Instant;

/// Per-event decay of the smoothed speed when motion is not forward
pub const DECAY_FACTOR: f64 = 0.9;

/// Classification of one vertical displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Upward motion beyond the jitter threshold, with its distance in px
    Forward { distance: f64 },
    /// Downward motion, no motion, or jitter
    Other,
}

/// Classify a displacement. Screen coordinates grow downwards, so forward
/// is a negative `dy` strictly larger in magnitude than the threshold.
pub fn classify_motion(dy: f64, jitter_px: f64) -> Motion {
    if dy < -jitter_px {
        Motion::Forward { distance: -dy }
    } else {
        Motion::Other
    }
}

/// Outcome of the sprint hysteresis check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintDecision {
    Engage,
    Disengage,
    /// Speed is inside the dead band, keep the current state
    Hold,
}

pub fn sprint_decision(speed: f64, engage: f64, disengage: f64) -> SprintDecision {
    if speed >= engage {
        SprintDecision::Engage
    } else if speed <= disengage {
        SprintDecision::Disengage
    } else {
        SprintDecision::Hold
    }
}

impl<K: KeySink> FilterCore<K> {
    pub(crate) fn on_sample(&mut self, y: f64, now: Instant) {
        if !self.state.active {
            return;
        }

        let Some(last_y) = self.state.last_y else {
            trace!("Priming sample at y={}", y);
            self.state.last_y = Some(y);
            self.state.last_sample_time = now;
            self.state.last_forward_time = now;
            return;
        };

        // Backdated or duplicate timestamps saturate to zero, then hit the floor
        let dt = now
            .saturating_duration_since(self.state.last_sample_time)
            .as_secs_f64()
            .max(self.tunables.min_dt_secs());
        let dy = y - last_y;
        self.state.last_y = Some(y);
        self.state.last_sample_time = now;

        match classify_motion(dy, self.tunables.jitter_px()) {
            Motion::Forward { distance } => self.forward_sample(distance, dt, now),
            Motion::Other => self.decay(),
        }
    }

    fn forward_sample(&mut self, distance: f64, dt: f64, now: Instant) {
        let magnitude = distance.min(self.tunables.max_dy_per_event());
        let instant_speed = magnitude / dt;
        let alpha = self.tunables.smoothing_alpha();

        self.state.smoothed_speed = alpha * instant_speed + (1.0 - alpha) * self.state.smoothed_speed;
        self.state.displayed_speed = self.state.smoothed_speed;
        trace!(
            "Forward {:.1}px in {:.3}s -> {:.1}px/s (smoothed {:.1})",
            magnitude,
            dt,
            instant_speed,
            self.state.smoothed_speed
        );

        let forward_held = self.keys.engage(VirtualKey::Forward);
        self.state.last_forward_time = now;

        // Sprint only ever engages on top of a held forward key
        if !forward_held || now < self.state.sprint_suppressed_until {
            return;
        }

        match sprint_decision(
            self.state.smoothed_speed,
            self.tunables.sprint_engage(),
            self.tunables.sprint_disengage(),
        ) {
            SprintDecision::Engage => {
                if !self.keys.is_held(VirtualKey::Sprint) {
                    debug!("Sprint engage at {:.1}px/s", self.state.smoothed_speed);
                }
                self.keys.engage(VirtualKey::Sprint);
            }
            SprintDecision::Disengage => self.keys.release(VirtualKey::Sprint),
            SprintDecision::Hold => {}
        }
    }

    fn decay(&mut self) {
        self.state.smoothed_speed *= DECAY_FACTOR;
        self.state.displayed_speed = self.state.smoothed_speed.max(0.0);
    }
}
