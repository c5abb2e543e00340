//! Pointer input: turns raw cursor positions into filter samples

mod listener;

pub use listener::{ListenerHandle, PointerListener, PointerSource, DEFAULT_POLL_INTERVAL};
