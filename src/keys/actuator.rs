//! Idempotent press/release of the two virtual outputs

use super::{ActuatorError, KeySink};
use log::{error, info};
use std::fmt;

/// The two outputs driven by the motion filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    /// Walk forward, held while qualifying motion continues
    Forward,
    /// Sprint modifier, held above the engage speed
    Sprint,
}

impl VirtualKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Sprint => "sprint",
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks which outputs are held and only calls the sink on transitions
///
/// Not synchronized on its own: it lives inside the filter's locked core so a
/// held flag and the injection behind it always change together.
#[derive(Debug)]
pub struct KeyActuator<K> {
    sink: K,
    forward_held: bool,
    sprint_held: bool,
    fault: Option<ActuatorError>,
}

impl<K: KeySink> KeyActuator<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            forward_held: false,
            sprint_held: false,
            fault: None,
        }
    }

    /// Press `key` unless it is already held.
    ///
    /// Returns whether the key is held afterwards. A rejected press leaves
    /// the key released and records the fault.
    pub fn engage(&mut self, key: VirtualKey) -> bool {
        if self.is_held(key) {
            return true;
        }
        match self.sink.press(key) {
            Ok(()) => {
                info!("Pressing {}", key);
                *self.flag_mut(key) = true;
                true
            }
            Err(e) => {
                error!("Press of {} failed: {}", key, e);
                self.fault = Some(e);
                false
            }
        }
    }

    /// Release `key` if it is held.
    ///
    /// The held flag is cleared even when the sink rejects the release.
    pub fn release(&mut self, key: VirtualKey) {
        if !self.is_held(key) {
            return;
        }
        match self.sink.release(key) {
            Ok(()) => info!("Releasing {}", key),
            Err(e) => {
                error!("Release of {} failed: {}", key, e);
                self.fault = Some(e);
            }
        }
        *self.flag_mut(key) = false;
    }

    /// Release sprint, then forward
    pub fn release_all(&mut self) {
        self.release(VirtualKey::Sprint);
        self.release(VirtualKey::Forward);
    }

    pub fn is_held(&self, key: VirtualKey) -> bool {
        match key {
            VirtualKey::Forward => self.forward_held,
            VirtualKey::Sprint => self.sprint_held,
        }
    }

    /// Last injection failure, if any
    pub fn fault(&self) -> Option<&ActuatorError> {
        self.fault.as_ref()
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    fn flag_mut(&mut self, key: VirtualKey) -> &mut bool {
        match key {
            VirtualKey::Forward => &mut self.forward_held,
            VirtualKey::Sprint => &mut self.sprint_held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyAction, RecordingSink};

    fn actuator() -> (KeyActuator<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::new();
        (KeyActuator::new(sink.clone()), sink)
    }

    #[test]
    fn engage_twice_injects_once() {
        let (mut keys, sink) = actuator();

        assert!(keys.engage(VirtualKey::Forward));
        assert!(keys.engage(VirtualKey::Forward));

        assert_eq!(sink.press_count(VirtualKey::Forward), 1);
        assert!(keys.is_held(VirtualKey::Forward));
    }

    #[test]
    fn release_when_released_injects_nothing() {
        let (mut keys, sink) = actuator();
        keys.release(VirtualKey::Sprint);
        keys.release(VirtualKey::Forward);
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn release_all_goes_sprint_first() {
        let (mut keys, sink) = actuator();
        keys.engage(VirtualKey::Forward);
        keys.engage(VirtualKey::Sprint);
        sink.clear();

        keys.release_all();

        assert_eq!(
            sink.actions(),
            vec![
                KeyAction::Release(VirtualKey::Sprint),
                KeyAction::Release(VirtualKey::Forward)
            ]
        );
        assert!(!keys.is_held(VirtualKey::Forward));
        assert!(!keys.is_held(VirtualKey::Sprint));
    }

    #[test]
    fn failed_press_stays_released_and_records_fault() {
        let (mut keys, sink) = actuator();
        sink.set_failing(true);

        assert!(!keys.engage(VirtualKey::Forward));
        assert!(!keys.is_held(VirtualKey::Forward));
        assert!(keys.fault().is_some());

        keys.clear_fault();
        assert!(keys.fault().is_none());
    }

    #[test]
    fn failed_release_still_clears_flag() {
        let (mut keys, sink) = actuator();
        keys.engage(VirtualKey::Forward);
        sink.set_failing(true);

        keys.release(VirtualKey::Forward);

        assert!(!keys.is_held(VirtualKey::Forward));
        assert!(matches!(
            keys.fault(),
            Some(ActuatorError::Rejected { key: VirtualKey::Forward, .. })
        ));
    }

    #[test]
    fn virtual_key_names() {
        assert_eq!(VirtualKey::Forward.to_string(), "forward");
        assert_eq!(VirtualKey::Sprint.as_str(), "sprint");
    }
}
