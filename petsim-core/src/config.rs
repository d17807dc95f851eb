//! Configuration for the pet engine.
//!
//! Maps directly to `petsim.toml`. Every field has a default, so a partial
//! file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Timer periods.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Parental controls.
    #[serde(default)]
    pub parental: ParentalConfig,
}

impl PetConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PetError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PetError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level for the embedding application: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Periods of the engine's background timers, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Decay tick period.
    #[serde(default = "default_5000")]
    pub decay_tick_ms: u64,
    /// Delay before the first decay tick.
    #[serde(default = "default_3000")]
    pub decay_initial_delay_ms: u64,
    /// Attribute drift period.
    #[serde(default = "default_60000")]
    pub drift_interval_ms: u64,
    /// Idle time required before a decay tick wakes the drift routine.
    #[serde(default = "default_1000")]
    pub interaction_debounce_ms: u64,
    /// Length of one nap.
    #[serde(default = "default_10000")]
    pub nap_ms: u64,
    /// Item generator period.
    #[serde(default = "default_15000")]
    pub item_interval_ms: u64,
    /// Seed for the item generator and score drift. Random when absent.
    #[serde(default)]
    pub item_seed: Option<u64>,
}

impl TimingConfig {
    /// Decay tick period.
    #[must_use]
    pub fn decay_tick(&self) -> Duration {
        Duration::from_millis(self.decay_tick_ms.max(1))
    }

    /// Delay before the first decay tick.
    #[must_use]
    pub fn decay_initial_delay(&self) -> Duration {
        Duration::from_millis(self.decay_initial_delay_ms)
    }

    /// Attribute drift period.
    #[must_use]
    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval_ms.max(1))
    }

    /// Idle debounce window.
    #[must_use]
    pub fn interaction_debounce(&self) -> Duration {
        Duration::from_millis(self.interaction_debounce_ms)
    }

    /// Nap length.
    #[must_use]
    pub fn nap(&self) -> Duration {
        Duration::from_millis(self.nap_ms)
    }

    /// Item generator period.
    #[must_use]
    pub fn item_interval(&self) -> Duration {
        Duration::from_millis(self.item_interval_ms.max(1))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            decay_tick_ms: 5000,
            decay_initial_delay_ms: 3000,
            drift_interval_ms: 60_000,
            interaction_debounce_ms: 1000,
            nap_ms: 10_000,
            item_interval_ms: 15_000,
            item_seed: None,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Use WAL mode for the save database.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
    /// Auto-save interval in seconds.
    #[serde(default = "default_60")]
    pub autosave_interval_seconds: u64,
}

impl PersistenceConfig {
    /// Auto-save interval.
    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_seconds.max(1))
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            checksum_enabled: true,
            autosave_interval_seconds: 60,
        }
    }
}

/// Parental controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentalConfig {
    /// Password guarding revive and the parental settings.
    #[serde(default = "default_password")]
    pub password: String,
    /// Where play-time limits and totals are stored.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

impl Default for ParentalConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
            settings_path: default_settings_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_password() -> String { "CS2212A".to_string() }
fn default_settings_path() -> String { "settings.toml".to_string() }
fn default_60() -> u64 { 60 }
fn default_1000() -> u64 { 1000 }
fn default_3000() -> u64 { 3000 }
fn default_5000() -> u64 { 5000 }
fn default_10000() -> u64 { 10_000 }
fn default_15000() -> u64 { 15_000 }
fn default_60000() -> u64 { 60_000 }
