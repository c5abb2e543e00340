//! Polling pointer listener

use crate::filter::MotionFilter;
use crate::keys::KeySink;
use device_query::{DeviceQuery, DeviceState};
use log::{debug, warn};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default interval between cursor reads
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Something that reports the absolute cursor position
pub trait PointerSource {
    /// Current `(x, y)` position, `None` if it cannot be read right now
    fn position(&mut self) -> Option<(i32, i32)>;
}

impl PointerSource for DeviceState {
    fn position(&mut self) -> Option<(i32, i32)> {
        Some(self.get_mouse().coords)
    }
}

/// Listener that turns position changes into filter samples
pub struct PointerListener<S> {
    source: S,
    last_position: Option<(i32, i32)>,
    samples: u64,
}

impl<S: PointerSource> PointerListener<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_position: None,
            samples: 0,
        }
    }

    /// Read the source once and forward a sample if the pointer moved.
    ///
    /// The first successful read only records a baseline.
    /// Returns whether a sample was forwarded.
    pub fn poll<K: KeySink>(&mut self, filter: &MotionFilter<K>, now: Instant) -> bool {
        let Some(position) = self.source.position() else {
            return false;
        };

        let previous = self.last_position.replace(position);
        match previous {
            Some(previous) if previous != position => {
                filter.on_sample(f64::from(position.1), now);
                self.samples += 1;
                true
            }
            _ => false,
        }
    }

    /// Number of samples forwarded so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Run the listener on its own thread.
    ///
    /// The source is built inside the thread by `factory`, since platform
    /// handles are often not `Send`. If the source panics the thread ends and
    /// [`ListenerHandle::is_running`] turns false.
    pub fn spawn<K, F>(
        filter: Arc<MotionFilter<K>>,
        factory: F,
        interval: Duration,
    ) -> io::Result<ListenerHandle>
    where
        K: KeySink + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("pointer-listener".to_string())
            .spawn(move || {
                let mut listener = PointerListener::new(factory());
                debug!("Pointer listener polling every {} us", interval.as_micros());
                while !flag.load(Ordering::Relaxed) {
                    listener.poll(&filter, Instant::now());
                    thread::sleep(interval);
                }
                debug!("Pointer listener exiting after {} samples", listener.samples());
            })?;

        Ok(ListenerHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

impl PointerListener<DeviceState> {
    /// Spawn a listener on the system cursor via `device_query`
    pub fn spawn_system<K: KeySink + 'static>(
        filter: Arc<MotionFilter<K>>,
        interval: Duration,
    ) -> io::Result<ListenerHandle> {
        Self::spawn(filter, DeviceState::new, interval)
    }
}

/// Handle to a running listener thread
pub struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Whether the listener thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the thread
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Pointer listener thread had panicked");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Tunables;
    use crate::keys::{RecordingSink, VirtualKey};
    use std::collections::VecDeque;

    /// Plays back a fixed list of positions, then repeats the last one
    struct ScriptedSource {
        positions: VecDeque<Option<(i32, i32)>>,
        last: Option<(i32, i32)>,
    }

    impl ScriptedSource {
        fn new(positions: &[Option<(i32, i32)>]) -> Self {
            Self {
                positions: positions.iter().copied().collect(),
                last: None,
            }
        }
    }

    impl PointerSource for ScriptedSource {
        fn position(&mut self) -> Option<(i32, i32)> {
            if let Some(next) = self.positions.pop_front() {
                if next.is_some() {
                    self.last = next;
                }
                return next;
            }
            self.last
        }
    }

    fn started_filter() -> (MotionFilter<RecordingSink>, RecordingSink, Instant) {
        let sink = RecordingSink::new();
        let filter = MotionFilter::new(sink.clone(), Tunables::default());
        let t0 = Instant::now();
        filter.start(t0);
        (filter, sink, t0)
    }

    #[test]
    fn first_read_is_baseline_only() {
        let (filter, _, t0) = started_filter();
        let mut listener = PointerListener::new(ScriptedSource::new(&[Some((10, 500))]));
        assert!(!listener.poll(&filter, t0));
        assert_eq!(listener.samples(), 0);
    }

    #[test]
    fn unchanged_position_is_not_forwarded() {
        let (filter, _, t0) = started_filter();
        let mut listener = PointerListener::new(ScriptedSource::new(&[
            Some((10, 500)),
            Some((10, 500)),
            Some((12, 500)),
        ]));
        assert!(!listener.poll(&filter, t0));
        assert!(!listener.poll(&filter, t0 + Duration::from_millis(1)));
        // horizontal motion is still a pointer-moved event
        assert!(listener.poll(&filter, t0 + Duration::from_millis(2)));
        assert_eq!(listener.samples(), 1);
    }

    #[test]
    fn unreadable_source_skips_poll() {
        let (filter, _, t0) = started_filter();
        let mut listener = PointerListener::new(ScriptedSource::new(&[None]));
        assert!(!listener.poll(&filter, t0));
    }

    #[test]
    fn upward_moves_drive_forward_key() {
        let (filter, sink, t0) = started_filter();
        let mut listener = PointerListener::new(ScriptedSource::new(&[
            Some((0, 600)),
            Some((0, 590)),
            Some((0, 570)),
        ]));
        let step = Duration::from_millis(20);
        listener.poll(&filter, t0);
        listener.poll(&filter, t0 + step);
        listener.poll(&filter, t0 + step * 2);

        assert!(filter.forward_held());
        assert_eq!(sink.press_count(VirtualKey::Forward), 1);
    }

    #[test]
    fn spawned_listener_feeds_filter() {
        let sink = RecordingSink::new();
        let filter = Arc::new(MotionFilter::new(sink.clone(), Tunables::default()));
        filter.start(Instant::now());

        let positions: Vec<Option<(i32, i32)>> =
            (0..20).map(|i| Some((0, 800 - i * 20))).collect();
        let handle = PointerListener::spawn(
            Arc::clone(&filter),
            move || ScriptedSource::new(&positions),
            Duration::from_millis(2),
        )
        .expect("spawn listener");

        thread::sleep(Duration::from_millis(200));
        assert!(handle.is_running());
        handle.shutdown();

        assert_eq!(sink.press_count(VirtualKey::Forward), 1);
    }

    #[test]
    fn panicking_source_stops_listener() {
        struct Broken;
        impl PointerSource for Broken {
            fn position(&mut self) -> Option<(i32, i32)> {
                panic!("display connection lost");
            }
        }

        let filter = Arc::new(MotionFilter::new(RecordingSink::new(), Tunables::default()));
        let handle =
            PointerListener::spawn(filter, || Broken, Duration::from_millis(1)).expect("spawn");
        thread::sleep(Duration::from_millis(100));
        assert!(!handle.is_running());
    }
}
