//! Key injection sinks
//!
//! A [`KeySink`] is the outbound platform capability: it presses and releases
//! the platform key behind a [`VirtualKey`]. The real sink is backed by
//! `enigo` and only compiled with the `virtual-send` feature, since it needs
//! system libraries (libxdo / X11 on Linux).

use super::VirtualKey;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[cfg(feature = "virtual-send")]
use super::KeyBindings;

/// Error type for key injection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// The platform injection backend could not be opened
    #[error("key injection unavailable: {0}")]
    Unavailable(String),
    /// The injector stopped after an earlier failure
    #[error("key injection stopped working")]
    Disconnected,
    /// The platform refused a single press or release
    #[error("{key} key rejected: {reason}")]
    Rejected { key: VirtualKey, reason: String },
}

/// A single injected transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(VirtualKey),
    Release(VirtualKey),
}

/// Outbound key-injection capability
///
/// Calls must not block; the filter invokes them while holding its lock.
pub trait KeySink: Send {
    fn press(&mut self, key: VirtualKey) -> Result<(), ActuatorError>;

    fn release(&mut self, key: VirtualKey) -> Result<(), ActuatorError>;
}

impl KeySink for Box<dyn KeySink> {
    fn press(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        (**self).press(key)
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        (**self).release(key)
    }
}

/// Sink that only logs, used when injection is not available
#[derive(Debug, Default)]
pub struct DryRunSink;

impl KeySink for DryRunSink {
    fn press(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        info!("(dry run) press {}", key);
        Ok(())
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        info!("(dry run) release {}", key);
        Ok(())
    }
}

/// Sink that records every transition into a shared log
///
/// Clones share the same log, so a test can keep one handle while the filter
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    actions: Arc<Mutex<Vec<KeyAction>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with [`ActuatorError::Rejected`]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded transitions, oldest first
    pub fn actions(&self) -> Vec<KeyAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn press_count(&self, key: VirtualKey) -> usize {
        self.count(KeyAction::Press(key))
    }

    pub fn release_count(&self, key: VirtualKey) -> usize {
        self.count(KeyAction::Release(key))
    }

    pub fn clear(&self) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn count(&self, action: KeyAction) -> usize {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|a| **a == action)
            .count()
    }

    fn record(&self, action: KeyAction) -> Result<(), ActuatorError> {
        if self.failing.load(Ordering::SeqCst) {
            let key = match action {
                KeyAction::Press(k) | KeyAction::Release(k) => k,
            };
            return Err(ActuatorError::Rejected {
                key,
                reason: "recording sink set to fail".to_string(),
            });
        }
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
        Ok(())
    }
}

impl KeySink for RecordingSink {
    fn press(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        self.record(KeyAction::Press(key))
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        self.record(KeyAction::Release(key))
    }
}

/// Real key injection through `enigo`
///
/// The `Enigo` handle lives on a dedicated injector thread and transitions
/// are handed over through a channel, so press/release never block the
/// caller. The injector exits on the first platform error; every call after
/// that returns [`ActuatorError::Disconnected`].
#[cfg(feature = "virtual-send")]
pub struct EnigoSink {
    tx: std::sync::mpsc::Sender<KeyAction>,
}

#[cfg(feature = "virtual-send")]
impl EnigoSink {
    pub fn new(bindings: KeyBindings) -> Result<Self, ActuatorError> {
        use std::sync::mpsc;
        use std::thread;

        let (tx, rx) = mpsc::channel::<KeyAction>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        thread::Builder::new()
            .name("key-injector".to_string())
            .spawn(move || {
                use enigo::{Direction, Enigo, Keyboard, Settings};

                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                for action in rx {
                    let (key, direction) = match action {
                        KeyAction::Press(key) => (key, Direction::Press),
                        KeyAction::Release(key) => (key, Direction::Release),
                    };
                    if let Err(e) = enigo.key(bindings.key_for(key).to_enigo(), direction) {
                        log::error!("Injecting {:?} failed: {}", action, e);
                        return;
                    }
                }
            })
            .map_err(|e| ActuatorError::Unavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx }),
            Ok(Err(reason)) => Err(ActuatorError::Unavailable(reason)),
            Err(_) => Err(ActuatorError::Unavailable(
                "injector thread exited during start-up".to_string(),
            )),
        }
    }

    fn send(&self, action: KeyAction) -> Result<(), ActuatorError> {
        self.tx.send(action).map_err(|_| ActuatorError::Disconnected)
    }
}

#[cfg(feature = "virtual-send")]
impl KeySink for EnigoSink {
    fn press(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        self.send(KeyAction::Press(key))
    }

    fn release(&mut self, key: VirtualKey) -> Result<(), ActuatorError> {
        self.send(KeyAction::Release(key))
    }
}
