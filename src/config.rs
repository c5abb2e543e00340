//! Configuration management for VR Walker
//!
//! Provides persistent configuration that is loaded from and saved to a
//! platform-specific config file.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/vr-walker/config.toml` |
//! | macOS | `~/Library/Application Support/vr-walker/config.toml` |
//! | Windows | `%APPDATA%\vr-walker\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use vr_walker::Config;
//!
//! // Load existing config or use defaults
//! let mut config = Config::load().unwrap_or_default();
//!
//! // Modify settings
//! config.filter.set_sprint_engage(120.0);
//!
//! // Save to disk
//! config.save().expect("Failed to save config");
//! ```

use crate::filter::watchdog::DEFAULT_TICK;
use crate::filter::Tunables;
use crate::keys::KeyBindings;
use crate::pointer::DEFAULT_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "vr-walker";

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the application config directory, creating it if needed.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let app_dir = dirs::config_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(APP_DIR);

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir)
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns the path of the log file next to the config file.
pub fn log_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("vr-walker.log"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Motion filter tunables
    #[serde(default)]
    pub filter: Tunables,
    /// Input and watchdog timing
    #[serde(default)]
    pub input: InputConfig,
    /// Platform keys for the two outputs
    #[serde(default)]
    pub keys: KeyBindings,
    /// UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Input and watchdog timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Cursor polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Watchdog tick in milliseconds
    pub watchdog_tick_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            watchdog_tick_ms: DEFAULT_TICK.as_millis() as u64,
        }
    }
}

impl InputConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn watchdog_tick(&self) -> Duration {
        Duration::from_millis(self.watchdog_tick_ms.max(1))
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// Color theme (dark/light)
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 20,
            theme: Theme::Dark,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Tunables are re-clamped, so a hand-edited file cannot invert the
    /// sprint thresholds.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.filter = config.filter.sanitized();
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ui.refresh_rate_hz.max(1) as u64)
    }
}
