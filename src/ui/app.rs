//! Tuning surface state and logic

use crate::config::{Config, ConfigError};
use crate::filter::{FilterSnapshot, MotionFilter, Tunables};
use crate::keys::KeySink;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// How long a status message stays visible
const STATUS_SECS: u64 = 3;

/// A tunable that can be selected and adjusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunableField {
    Timeout,
    Jitter,
    Smoothing,
    SprintEngage,
    SprintDisengage,
    MaxDy,
    MinDt,
    SprintSuppress,
}

impl TunableField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::Jitter => "Pixel Threshold",
            Self::Smoothing => "Smoothing α",
            Self::SprintEngage => "Sprint ON",
            Self::SprintDisengage => "Sprint OFF",
            Self::MaxDy => "Max Δy / Event",
            Self::MinDt => "Min Δt",
            Self::SprintSuppress => "Sprint Delay",
        }
    }

    pub fn all() -> &'static [TunableField] {
        &[
            Self::Timeout,
            Self::Jitter,
            Self::Smoothing,
            Self::SprintEngage,
            Self::SprintDisengage,
            Self::MaxDy,
            Self::MinDt,
            Self::SprintSuppress,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Timeout => 0,
            Self::Jitter => 1,
            Self::Smoothing => 2,
            Self::SprintEngage => 3,
            Self::SprintDisengage => 4,
            Self::MaxDy => 5,
            Self::MinDt => 6,
            Self::SprintSuppress => 7,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Timeout,
            1 => Self::Jitter,
            2 => Self::Smoothing,
            3 => Self::SprintEngage,
            4 => Self::SprintDisengage,
            5 => Self::MaxDy,
            6 => Self::MinDt,
            _ => Self::SprintSuppress,
        }
    }

    /// Amount added per adjustment step
    pub fn step(&self) -> f64 {
        match self {
            Self::Timeout => 10.0,
            Self::Jitter => 1.0,
            Self::Smoothing => 0.01,
            Self::SprintEngage | Self::SprintDisengage => 10.0,
            Self::MaxDy => 5.0,
            Self::MinDt => 1.0,
            Self::SprintSuppress => 10.0,
        }
    }

    pub fn value(&self, t: &Tunables) -> f64 {
        match self {
            Self::Timeout => t.timeout_ms() as f64,
            Self::Jitter => t.jitter_px(),
            Self::Smoothing => t.smoothing_alpha(),
            Self::SprintEngage => t.sprint_engage(),
            Self::SprintDisengage => t.sprint_disengage(),
            Self::MaxDy => t.max_dy_per_event(),
            Self::MinDt => t.min_dt_ms() as f64,
            Self::SprintSuppress => t.sprint_suppress_ms() as f64,
        }
    }

    pub fn format(&self, t: &Tunables) -> String {
        let value = self.value(t);
        match self {
            Self::Timeout => format!("{:.2} s", value / 1000.0),
            Self::Jitter | Self::MaxDy => format!("{:.0} px", value),
            Self::Smoothing => format!("{:.2}", value),
            Self::SprintEngage | Self::SprintDisengage => format!("{:.0} px/s", value),
            Self::MinDt | Self::SprintSuppress => format!("{:.0} ms", value),
        }
    }

    /// Write `value` through the filter's clamping setter
    pub fn apply<K: KeySink>(&self, filter: &MotionFilter<K>, value: f64) {
        let millis = value.round().max(0.0) as u64;
        match self {
            Self::Timeout => filter.set_timeout_ms(millis),
            Self::Jitter => filter.set_jitter_px(value),
            Self::Smoothing => filter.set_smoothing_alpha(value),
            Self::SprintEngage => filter.set_sprint_engage(value),
            Self::SprintDisengage => filter.set_sprint_disengage(value),
            Self::MaxDy => filter.set_max_dy_per_event(value),
            Self::MinDt => filter.set_min_dt_ms(millis),
            Self::SprintSuppress => filter.set_sprint_suppress_ms(millis),
        }
    }
}

/// One line of the tunables table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunableRow {
    pub label: &'static str,
    pub value: String,
    pub selected: bool,
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Main application
pub struct App<K> {
    /// Shared motion filter
    pub filter: Arc<MotionFilter<K>>,
    /// Configuration, kept in sync with the filter tunables
    pub config: Config,
    /// Tunable under the cursor
    pub selected: TunableField,
    /// Application state
    pub state: AppState,
    /// Show the help panel instead of the tunables
    pub show_help: bool,
    /// Set once the pointer listener has died
    pub listener_lost: bool,
    /// Application start time
    pub start_time: Instant,
    status_message: Option<String>,
    status_time: Option<Instant>,
}

impl<K: KeySink> App<K> {
    pub fn new(filter: Arc<MotionFilter<K>>, config: Config) -> Self {
        Self {
            filter,
            config,
            selected: TunableField::Timeout,
            state: AppState::Running,
            show_help: false,
            listener_lost: false,
            start_time: Instant::now(),
            status_message: None,
            status_time: None,
        }
    }

    /// Start when stopped, stop when active
    pub fn toggle_active(&mut self, now: Instant) {
        if self.filter.is_active() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.filter.start(now) {
            self.set_status("Started".to_string());
        }
    }

    pub fn stop(&mut self) {
        self.filter.stop();
        self.set_status("Stopped".to_string());
    }

    pub fn select_next(&mut self) {
        let next = (self.selected.index() + 1) % TunableField::all().len();
        self.selected = TunableField::from_index(next);
    }

    pub fn select_prev(&mut self) {
        let current = self.selected.index();
        let prev = if current == 0 {
            TunableField::all().len() - 1
        } else {
            current - 1
        };
        self.selected = TunableField::from_index(prev);
    }

    /// Move the selected tunable by `steps` steps (negative lowers it)
    pub fn adjust(&mut self, steps: i32) {
        let field = self.selected;
        let current = field.value(&self.filter.tunables());
        field.apply(&self.filter, current + f64::from(steps) * field.step());

        let tunables = self.filter.tunables();
        let shown = field.format(&tunables);
        self.config.filter = tunables;
        self.set_status(format!("{}: {}", field.name(), shown));
    }

    /// Save the current settings to the default config file
    pub fn save_config(&mut self) -> Result<PathBuf, ConfigError> {
        self.config.filter = self.filter.tunables();
        let result = self.config.save();
        self.report_save(&result);
        result
    }

    /// Save the current settings to a specific file
    pub fn save_config_to(&mut self, path: &Path) -> Result<PathBuf, ConfigError> {
        self.config.filter = self.filter.tunables();
        let result = self.config.save_to(path).map(|()| path.to_path_buf());
        self.report_save(&result);
        result
    }

    fn report_save(&mut self, result: &Result<PathBuf, ConfigError>) {
        match result {
            Ok(path) => {
                info!("Config saved to {}", path.display());
                self.set_status("Settings saved".to_string());
            }
            Err(e) => self.set_status(format!("Save failed: {}", e)),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Record that the pointer listener is gone
    pub fn mark_listener_lost(&mut self) {
        if !self.listener_lost {
            self.listener_lost = true;
            self.set_status("Pointer listener stopped".to_string());
        }
    }

    /// Stop the filter, then request quit
    pub fn quit(&mut self) {
        self.filter.stop();
        self.state = AppState::Quitting;
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < STATUS_SECS => Some(msg),
            _ => None,
        }
    }

    /// Persistent problem to show in the status bar, if any
    pub fn alert(&self, snapshot: &FilterSnapshot) -> Option<String> {
        if self.listener_lost {
            return Some("Pointer input lost".to_string());
        }
        snapshot.fault.as_ref().map(|f| format!("Key output: {}", f))
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        self.filter.snapshot()
    }

    pub fn tunable_rows(&self) -> Vec<TunableRow> {
        let tunables = self.filter.tunables();
        TunableField::all()
            .iter()
            .map(|field| TunableRow {
                label: field.name(),
                value: field.format(&tunables),
                selected: *field == self.selected,
            })
            .collect()
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::RecordingSink;

    fn app() -> App<RecordingSink> {
        let filter = Arc::new(MotionFilter::new(RecordingSink::new(), Tunables::default()));
        App::new(filter, Config::default())
    }

    #[test]
    fn field_index_roundtrip() {
        for field in TunableField::all() {
            assert_eq!(TunableField::from_index(field.index()), *field);
        }
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut app = app();
        app.select_prev();
        assert_eq!(app.selected, TunableField::SprintSuppress);
        app.select_next();
        assert_eq!(app.selected, TunableField::Timeout);
    }

    #[test]
    fn adjust_goes_through_clamping() {
        let mut app = app();
        app.selected = TunableField::SprintDisengage;
        app.adjust(5);
        // 60 + 50 = 110 >= 90, pulled back under engage
        assert_eq!(app.filter.tunables().sprint_disengage(), 85.0);
        assert_eq!(app.config.filter.sprint_disengage(), 85.0);
        assert_eq!(app.get_status(), Some("Sprint OFF: 85 px/s"));
    }

    #[test]
    fn adjust_millisecond_fields() {
        let mut app = app();
        app.selected = TunableField::Timeout;
        app.adjust(-3);
        assert_eq!(app.filter.tunables().timeout_ms(), 270);

        app.selected = TunableField::MinDt;
        app.adjust(-100);
        assert_eq!(app.filter.tunables().min_dt_ms(), 1);
    }

    #[test]
    fn toggle_starts_and_stops() {
        let mut app = app();
        app.toggle_active(Instant::now());
        assert!(app.filter.is_active());
        app.toggle_active(Instant::now());
        assert!(!app.filter.is_active());
    }

    #[test]
    fn rows_mark_selection() {
        let mut app = app();
        app.selected = TunableField::Smoothing;
        let rows = app.tunable_rows();
        assert_eq!(rows.len(), TunableField::all().len());
        assert_eq!(rows[0].value, "0.30 s");
        assert!(rows[2].selected);
        assert_eq!(rows.iter().filter(|r| r.selected).count(), 1);
    }

    #[test]
    fn alert_prefers_listener_loss() {
        let mut app = app();
        let mut snap = app.snapshot();
        assert_eq!(app.alert(&snap), None);

        snap.fault = Some("boom".to_string());
        assert_eq!(app.alert(&snap).as_deref(), Some("Key output: boom"));

        app.mark_listener_lost();
        assert_eq!(app.alert(&snap).as_deref(), Some("Pointer input lost"));
    }

    #[test]
    fn failed_save_is_returned_and_shown() {
        let mut app = app();
        let path = Path::new("/nonexistent/vr-walker/config.toml");
        let result = app.save_config_to(path);
        assert!(matches!(result, Err(ConfigError::Io(_))));
        assert!(app.get_status().is_some_and(|s| s.starts_with("Save failed:")));
    }

    #[test]
    fn quit_stops_filter() {
        let mut app = app();
        app.start(Instant::now());
        app.quit();
        assert_eq!(app.state, AppState::Quitting);
        assert!(!app.filter.is_active());
    }
}
