//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for monkey runs, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults
//! - Builder pattern for programmatic configuration (see `EngineConfig`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `MONKEY_RESULT_DIR` | Base directory for run results | `./results` |
//! | `MONKEY_HISTORY_CAPACITY` | Number of steps kept in memory | `10` |
//! | `MONKEY_MAX_SCREENSHOTS` | Number of rotated screenshot names | `10` |
//! | `MONKEY_SWIPE_PERCENT` | Default swipe percent (2-10) | `5` |
//! | `MONKEY_SWIPE_PAUSE_MS` | Pause between press and move (ms) | `100` |
//! | `MONKEY_ADB_PATH` | adb executable | `adb` |
//! | `MONKEY_DEVICE_SERIAL` | Device serial for `adb -s` | unset |
//!
//! Values that fail to parse fall back to the default. Values that parse but
//! are out of range (a zero capacity, a percent of 1) are kept as-is and
//! rejected when the engine is built.

use std::env;
use std::sync::OnceLock;

// ============================================================================
// Default Values
// ============================================================================

/// Default base directory for run results
pub const DEFAULT_RESULT_DIR: &str = "./results";

/// Default number of steps kept in the history buffer
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Default number of rotated screenshot names
pub const DEFAULT_MAX_SCREENSHOTS: usize = 10;

/// Default swipe percent
pub const DEFAULT_SWIPE_PERCENT: u32 = 5;

/// Default pause between press and move in a swipe (milliseconds)
pub const DEFAULT_SWIPE_PAUSE_MS: u64 = 100;

/// Default adb executable
pub const DEFAULT_ADB_PATH: &str = "adb";

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_RESULT_DIR: &str = "MONKEY_RESULT_DIR";
pub const ENV_HISTORY_CAPACITY: &str = "MONKEY_HISTORY_CAPACITY";
pub const ENV_MAX_SCREENSHOTS: &str = "MONKEY_MAX_SCREENSHOTS";
pub const ENV_SWIPE_PERCENT: &str = "MONKEY_SWIPE_PERCENT";
pub const ENV_SWIPE_PAUSE_MS: &str = "MONKEY_SWIPE_PAUSE_MS";
pub const ENV_ADB_PATH: &str = "MONKEY_ADB_PATH";
pub const ENV_DEVICE_SERIAL: &str = "MONKEY_DEVICE_SERIAL";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineSettings,
    pub storage: StorageSettings,
    pub device: DeviceSettings,
}

/// Settings for the gesture engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub history_capacity: usize,
    pub max_screenshots: usize,
    pub swipe_percent: u32,
    pub swipe_pause_ms: u64,
}

/// Settings for screenshot storage
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub result_dir: String,
}

/// Settings for the adb driver
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    pub adb_path: String,
    pub serial: Option<String>,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            engine: EngineSettings {
                history_capacity: parse_or(&lookup, ENV_HISTORY_CAPACITY, DEFAULT_HISTORY_CAPACITY),
                max_screenshots: parse_or(&lookup, ENV_MAX_SCREENSHOTS, DEFAULT_MAX_SCREENSHOTS),
                swipe_percent: parse_or(&lookup, ENV_SWIPE_PERCENT, DEFAULT_SWIPE_PERCENT),
                swipe_pause_ms: parse_or(&lookup, ENV_SWIPE_PAUSE_MS, DEFAULT_SWIPE_PAUSE_MS),
            },
            storage: StorageSettings {
                result_dir: lookup(ENV_RESULT_DIR).unwrap_or_else(|| DEFAULT_RESULT_DIR.to_string()),
            },
            device: DeviceSettings {
                adb_path: lookup(ENV_ADB_PATH).unwrap_or_else(|| DEFAULT_ADB_PATH.to_string()),
                serial: lookup(ENV_DEVICE_SERIAL).filter(|s| !s.trim().is_empty()),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Get result base directory (convenience function)
pub fn result_dir() -> String {
    get().storage.result_dir.clone()
}
