//! Tunable client configuration.
//!
//! Every timing constant of the client (scheduler defer, throttle windows,
//! visibility re-scan interval, ...) lives here rather than being hard-coded,
//! because sensible values depend on the host and the producer.
//!
//! # File format
//!
//! Configuration is stored as TOML with durations in integer milliseconds:
//!
//! ```toml
//! [timing]
//! frame_defer_ms = 5
//! visibility_scan_interval_ms = 5000
//! pointer_move_throttle_ms = 20
//! resize_throttle_ms = 200
//!
//! [display]
//! css_width = "640px"
//! resizable = false
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` fall back to the
//! value of `some_fn()` when absent, so a partial (or empty) file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RfbConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub display: DisplayDefaults,
}

/// Scheduler, throttle and re-scan timings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Delay before each scheduling opportunity is requested.
    #[serde(default = "default_frame_defer_ms")]
    pub frame_defer_ms: u64,
    /// Period of the visibility re-scan backstop.
    #[serde(default = "default_visibility_scan_interval_ms")]
    pub visibility_scan_interval_ms: u64,
    /// Delay between a surface detach and the re-scan it triggers.
    #[serde(default = "default_detach_rescan_delay_ms")]
    pub detach_rescan_delay_ms: u64,
    /// Throttle window for `pointer_move`.
    #[serde(default = "default_pointer_move_throttle_ms")]
    pub pointer_move_throttle_ms: u64,
    /// Throttle window for `resize`.
    #[serde(default = "default_resize_throttle_ms")]
    pub resize_throttle_ms: u64,
    /// Cadence at which accumulated wheel deltas are flushed.
    #[serde(default = "default_wheel_flush_interval_ms")]
    pub wheel_flush_interval_ms: u64,
    /// Throttle window for any other throttled event type.
    #[serde(default = "default_throttle_ms")]
    pub default_throttle_ms: u64,
}

/// Initial values of the display properties and sizing limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayDefaults {
    #[serde(default = "default_css_width")]
    pub css_width: String,
    #[serde(default = "default_css_height")]
    pub css_height: String,
    #[serde(default = "default_true")]
    pub resizable: bool,
    #[serde(default = "default_cursor")]
    pub cursor: String,
    /// Lower bound of the auto-growth cap, in pixels; the cap is the larger
    /// of this and the viewport size.
    #[serde(default = "default_min_size_cap")]
    pub min_size_cap: u32,
}

// ── Default value functions ───────────────────────────────────────────────────

fn default_frame_defer_ms() -> u64 {
    5
}
fn default_visibility_scan_interval_ms() -> u64 {
    5_000
}
fn default_detach_rescan_delay_ms() -> u64 {
    10
}
fn default_pointer_move_throttle_ms() -> u64 {
    20
}
fn default_resize_throttle_ms() -> u64 {
    200
}
fn default_wheel_flush_interval_ms() -> u64 {
    20
}
fn default_throttle_ms() -> u64 {
    50
}
fn default_css_width() -> String {
    "500px".to_string()
}
fn default_css_height() -> String {
    "300px".to_string()
}
fn default_true() -> bool {
    true
}
fn default_cursor() -> String {
    "default".to_string()
}
fn default_min_size_cap() -> u32 {
    1024
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_defer_ms: default_frame_defer_ms(),
            visibility_scan_interval_ms: default_visibility_scan_interval_ms(),
            detach_rescan_delay_ms: default_detach_rescan_delay_ms(),
            pointer_move_throttle_ms: default_pointer_move_throttle_ms(),
            resize_throttle_ms: default_resize_throttle_ms(),
            wheel_flush_interval_ms: default_wheel_flush_interval_ms(),
            default_throttle_ms: default_throttle_ms(),
        }
    }
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            css_width: default_css_width(),
            css_height: default_css_height(),
            resizable: default_true(),
            cursor: default_cursor(),
            min_size_cap: default_min_size_cap(),
        }
    }
}

impl TimingConfig {
    pub fn frame_defer(&self) -> Duration {
        Duration::from_millis(self.frame_defer_ms)
    }

    pub fn visibility_scan_interval(&self) -> Duration {
        Duration::from_millis(self.visibility_scan_interval_ms)
    }

    pub fn detach_rescan_delay(&self) -> Duration {
        Duration::from_millis(self.detach_rescan_delay_ms)
    }

    pub fn wheel_flush_interval(&self) -> Duration {
        Duration::from_millis(self.wheel_flush_interval_ms)
    }

    /// Throttle window for the given `event_type`.
    pub fn throttle_window(&self, event_type: &str) -> Duration {
        let ms = match event_type {
            "pointer_move" => self.pointer_move_throttle_ms,
            "resize" => self.resize_throttle_ms,
            _ => self.default_throttle_ms,
        };
        Duration::from_millis(ms)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl RfbConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Serializes this configuration to TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
