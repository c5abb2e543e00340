//! Terminal tuning surface

mod app;
mod indicators;
pub mod theme;
mod widgets;

pub use app::{App, AppState, TunableField, TunableRow};
pub use indicators::KeyIndicators;
pub use theme::ThemeColors;
pub use widgets::*;
