//! Motion-to-intent filter
//!
//! Turns a stream of vertical pointer positions into two held outputs:
//!
//! ```text
//! pointer thread ──► on_sample ──┐
//!                                ├──► Mutex<FilterCore> ──► KeyActuator ──► KeySink
//! watchdog thread ─► tick ───────┤
//! tuning surface ──► setters ────┘
//! ```
//!
//! Every operation takes the single lock for its whole duration, so a
//! tunable change is never observed half-applied and a held flag never
//! disagrees with the injected key.

mod sampler;
mod state;
pub mod tunables;
pub mod watchdog;

pub use sampler::{classify_motion, sprint_decision, Motion, SprintDecision, DECAY_FACTOR};
pub use state::FilterState;
pub use tunables::Tunables;
pub use watchdog::Watchdog;

use crate::keys::{KeyActuator, KeySink, VirtualKey};
use log::info;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Everything guarded by the filter lock
#[derive(Debug)]
pub(crate) struct FilterCore<K> {
    pub(crate) state: FilterState,
    pub(crate) tunables: Tunables,
    pub(crate) keys: KeyActuator<K>,
}

/// Read-only view for display
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSnapshot {
    pub active: bool,
    pub displayed_speed: f64,
    pub forward_held: bool,
    pub sprint_held: bool,
    /// Last key-injection failure since start
    pub fault: Option<String>,
}

/// Shared motion filter, usually wrapped in an `Arc`
#[derive(Debug)]
pub struct MotionFilter<K> {
    core: Mutex<FilterCore<K>>,
}

impl<K: KeySink> MotionFilter<K> {
    pub fn new(sink: K, tunables: Tunables) -> Self {
        Self {
            core: Mutex::new(FilterCore {
                state: FilterState::new(Instant::now()),
                tunables: tunables.sanitized(),
                keys: KeyActuator::new(sink),
            }),
        }
    }

    // Every critical section leaves the core consistent, so a panic on
    // another thread does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, FilterCore<K>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin processing samples. Returns `false` if already active.
    pub fn start(&self, now: Instant) -> bool {
        let mut core = self.lock();
        if core.state.active {
            return false;
        }
        let suppress_until = now + core.tunables.sprint_suppress();
        core.state.activate(now, suppress_until);
        core.keys.clear_fault();
        info!(
            "Filter started, sprint suppressed for {} ms",
            core.tunables.sprint_suppress_ms()
        );
        true
    }

    /// Stop processing and release both outputs before returning
    pub fn stop(&self) {
        let mut core = self.lock();
        if core.state.active {
            info!("Filter stopped");
        }
        core.state.active = false;
        core.keys.release_all();
    }

    /// Feed one pointer-moved event
    pub fn on_sample(&self, y: f64, now: Instant) {
        self.lock().on_sample(y, now);
    }

    /// Run one watchdog check
    pub fn watchdog_tick(&self, now: Instant) {
        self.lock().watchdog_tick(now);
    }

    pub fn is_active(&self) -> bool {
        self.lock().state.active
    }

    pub fn displayed_speed(&self) -> f64 {
        self.lock().state.displayed_speed
    }

    pub fn forward_held(&self) -> bool {
        self.lock().keys.is_held(VirtualKey::Forward)
    }

    pub fn sprint_held(&self) -> bool {
        self.lock().keys.is_held(VirtualKey::Sprint)
    }

    /// Smoothed speed driving the hysteresis decision
    pub fn smoothed_speed(&self) -> f64 {
        self.lock().state.smoothed_speed
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        let core = self.lock();
        FilterSnapshot {
            active: core.state.active,
            displayed_speed: core.state.displayed_speed,
            forward_held: core.keys.is_held(VirtualKey::Forward),
            sprint_held: core.keys.is_held(VirtualKey::Sprint),
            fault: core.keys.fault().map(|e| e.to_string()),
        }
    }

    pub fn tunables(&self) -> Tunables {
        self.lock().tunables.clone()
    }

    /// Replace all tunables at once
    pub fn set_tunables(&self, tunables: Tunables) {
        self.lock().tunables = tunables.sanitized();
    }

    /// Apply an edit to the tunables under the lock
    fn update_tunables(&self, edit: impl FnOnce(&mut Tunables)) {
        edit(&mut self.lock().tunables);
    }

    pub fn set_timeout_ms(&self, value: u64) {
        self.update_tunables(|t| t.set_timeout_ms(value));
    }

    pub fn set_jitter_px(&self, value: f64) {
        self.update_tunables(|t| t.set_jitter_px(value));
    }

    pub fn set_sprint_engage(&self, value: f64) {
        self.update_tunables(|t| t.set_sprint_engage(value));
    }

    pub fn set_sprint_disengage(&self, value: f64) {
        self.update_tunables(|t| t.set_sprint_disengage(value));
    }

    pub fn set_smoothing_alpha(&self, value: f64) {
        self.update_tunables(|t| t.set_smoothing_alpha(value));
    }

    pub fn set_max_dy_per_event(&self, value: f64) {
        self.update_tunables(|t| t.set_max_dy_per_event(value));
    }

    pub fn set_min_dt_ms(&self, value: u64) {
        self.update_tunables(|t| t.set_min_dt_ms(value));
    }

    pub fn set_sprint_suppress_ms(&self, value: u64) {
        self.update_tunables(|t| t.set_sprint_suppress_ms(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::RecordingSink;
    use std::time::Duration;

    fn filter() -> (MotionFilter<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::new();
        (MotionFilter::new(sink.clone(), Tunables::default()), sink)
    }

    #[test]
    fn new_filter_is_inactive() {
        let (filter, _) = filter();
        let snap = filter.snapshot();
        assert!(!snap.active);
        assert!(!snap.forward_held);
        assert!(!snap.sprint_held);
        assert_eq!(snap.displayed_speed, 0.0);
        assert!(snap.fault.is_none());
    }

    #[test]
    fn start_twice_is_noop() {
        let (filter, _) = filter();
        let t0 = Instant::now();
        assert!(filter.start(t0));
        assert!(!filter.start(t0 + Duration::from_millis(5)));
        assert!(filter.is_active());
    }

    #[test]
    fn stop_releases_before_returning() {
        let (filter, sink) = filter();
        filter.set_sprint_suppress_ms(0);
        let t0 = Instant::now();
        filter.start(t0);
        filter.on_sample(500.0, t0);
        // 40 px in 10 ms -> 4000 px/s instant, far above engage
        filter.on_sample(460.0, t0 + Duration::from_millis(10));
        assert!(filter.forward_held());
        assert!(filter.sprint_held());

        filter.stop();

        assert!(!filter.is_active());
        assert!(!filter.forward_held());
        assert!(!filter.sprint_held());
        assert_eq!(sink.release_count(VirtualKey::Sprint), 1);
        assert_eq!(sink.release_count(VirtualKey::Forward), 1);
    }

    #[test]
    fn setters_clamp_under_lock() {
        let (filter, _) = filter();
        filter.set_sprint_engage(70.0);
        filter.set_sprint_disengage(80.0);
        let t = filter.tunables();
        assert_eq!(t.sprint_engage(), 70.0);
        assert_eq!(t.sprint_disengage(), 65.0);

        filter.set_timeout_ms(1);
        assert_eq!(filter.tunables().timeout_ms(), 50);
    }

    #[test]
    fn set_tunables_sanitizes() {
        let (filter, _) = filter();
        let mut t = Tunables::default();
        t.set_smoothing_alpha(0.5);
        filter.set_tunables(t.clone());
        assert_eq!(filter.tunables(), t);
    }

    #[test]
    fn start_clears_fault() {
        let (filter, sink) = filter();
        let t0 = Instant::now();
        filter.start(t0);
        sink.set_failing(true);
        filter.on_sample(500.0, t0);
        filter.on_sample(480.0, t0 + Duration::from_millis(20));
        assert!(filter.snapshot().fault.is_some());

        filter.stop();
        sink.set_failing(false);
        filter.start(t0 + Duration::from_secs(1));
        assert!(filter.snapshot().fault.is_none());
    }
}
