//! Virtual key output: bindings, injection sinks and the idempotent actuator

mod actuator;
pub mod binding;
mod sink;

pub use actuator::{KeyActuator, VirtualKey};
pub use binding::{BoundKey, KeyBindings};
pub use sink::{ActuatorError, DryRunSink, KeyAction, KeySink, RecordingSink};

#[cfg(feature = "virtual-send")]
pub use sink::EnigoSink;
