//! VR Walker - vertical mouse motion to held walk/sprint keys
//!
//! Smooths the vertical pointer speed, holds a forward key while the pointer
//! keeps moving up, adds a sprint key above a speed threshold (with
//! hysteresis), and lets go after a short period without forward motion.

pub mod config;
pub mod filter;
pub mod keys;
pub mod pointer;
pub mod ui;

pub use config::Config;
pub use filter::{FilterSnapshot, MotionFilter, Tunables};
