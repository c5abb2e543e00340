//! Inactivity watchdog
//!
//! The sampler only reacts to new events, so something has to end a walk
//! when the pointer simply stops. The watchdog polls on a fixed tick and
//! re-reads the timeout every time, which lets the timeout be tuned live.

use super::{FilterCore, MotionFilter};
use crate::keys::{KeySink, VirtualKey};
use log::{debug, info};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default tick interval
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

impl<K: KeySink> FilterCore<K> {
    pub(crate) fn watchdog_tick(&mut self, now: Instant) {
        if !self.state.active {
            // no-op unless something is still held
            self.keys.release_all();
            return;
        }

        let idle = now.saturating_duration_since(self.state.last_forward_time);
        if self.keys.is_held(VirtualKey::Forward) && idle > self.tunables.timeout() {
            info!("Timeout after {} ms -> releasing keys", idle.as_millis());
            self.keys.release_all();
        }
    }
}

/// Handle to the background watchdog thread
///
/// Dropping the handle stops and joins the thread.
pub struct Watchdog {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Spawn a thread that ticks `filter` every `tick`
    pub fn spawn<K>(filter: Arc<MotionFilter<K>>, tick: Duration) -> io::Result<Self>
    where
        K: KeySink + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("watchdog".to_string())
            .spawn(move || {
                debug!("Watchdog running every {} ms", tick.as_millis());
                while !flag.load(Ordering::Relaxed) {
                    filter.watchdog_tick(Instant::now());
                    thread::sleep(tick);
                }
                debug!("Watchdog exiting");
            })?;

        Ok(Self {
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the thread and wait for it
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
