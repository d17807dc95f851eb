//! Parental controls: the revive password and play-time accounting.
//!
//! The limit and the running total live in a small TOML file so they
//! survive between sessions:
//!
//! ```toml
//! play_time_limit_minutes = 90
//! total_play_time_minutes = 42
//! ```
//!
//! A missing file means "no limit, nothing played yet".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use petsim_core::config::ParentalConfig;

use crate::error::{Result, SessionError};

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySettings {
    /// Maximum total play time. `None` is unlimited.
    #[serde(default)]
    pub play_time_limit_minutes: Option<u64>,
    /// Play time accumulated over all finished sessions.
    #[serde(default)]
    pub total_play_time_minutes: u64,
}

/// Password check plus the persisted [`PlaySettings`].
#[derive(Debug)]
pub struct ParentalControls {
    password: String,
    path: PathBuf,
    settings: PlaySettings,
}

impl ParentalControls {
    /// Load from `config.settings_path`, or start from defaults when the
    /// file does not exist yet.
    ///
    /// # Errors
    ///
    /// [`SessionError::Settings`] if the file exists but is not valid TOML,
    /// [`SessionError::Io`] if it cannot be read.
    pub fn load(config: &ParentalConfig) -> Result<Self> {
        let path = PathBuf::from(&config.settings_path);
        let settings = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text).map_err(|e| SessionError::Settings(e.to_string()))?
        } else {
            debug!(path = %path.display(), "No settings file; using defaults");
            PlaySettings::default()
        };
        Ok(Self {
            password: config.password.clone(),
            path,
            settings,
        })
    }

    /// Whether `attempt` is the parental password.
    #[must_use]
    pub fn check_password(&self, attempt: &str) -> bool {
        attempt == self.password
    }

    /// Fail with [`SessionError::WrongPassword`] unless `attempt` matches.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPassword`].
    pub fn authorize(&self, attempt: &str) -> Result<()> {
        if self.check_password(attempt) {
            Ok(())
        } else {
            info!("Parental password rejected");
            Err(SessionError::WrongPassword)
        }
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &PlaySettings {
        &self.settings
    }

    /// Play-time limit in minutes, if any.
    #[must_use]
    pub fn play_time_limit(&self) -> Option<u64> {
        self.settings.play_time_limit_minutes
    }

    /// Minutes played over all finished sessions.
    #[must_use]
    pub fn total_play_time(&self) -> u64 {
        self.settings.total_play_time_minutes
    }

    /// Whether `session_minutes` on top of the total reaches the limit.
    #[must_use]
    pub fn limit_reached(&self, session_minutes: u64) -> bool {
        self.play_time_limit()
            .is_some_and(|limit| self.total_play_time().saturating_add(session_minutes) >= limit)
    }

    /// Change the limit after checking the password, and persist it.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPassword`], or a write failure.
    pub fn set_play_time_limit(&mut self, password: &str, limit: Option<u64>) -> Result<()> {
        self.authorize(password)?;
        self.settings.play_time_limit_minutes = limit;
        info!(limit = ?limit, "Play-time limit changed");
        self.save()
    }

    /// Add a finished session's minutes to the total and persist it.
    ///
    /// # Errors
    ///
    /// A write failure.
    pub fn add_play_time(&mut self, minutes: u64) -> Result<u64> {
        self.settings.total_play_time_minutes =
            self.settings.total_play_time_minutes.saturating_add(minutes);
        self.save()?;
        Ok(self.settings.total_play_time_minutes)
    }

    /// Where the settings are stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let text = toml::to_string_pretty(&self.settings)
            .map_err(|e| SessionError::Settings(e.to_string()))?;
        std::fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "Settings written");
        Ok(())
    }
}
