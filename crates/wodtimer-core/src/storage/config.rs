//! TOML-based timer preferences.
//!
//! Stores the session-level user preferences the orchestrator consumes:
//! sound cues on/off, cue volume, and the pre-start countdown length.
//!
//! Stored at `~/.config/wodtimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::timer::DEFAULT_COUNTDOWN_SECS;

use super::data_dir;

/// Sound cue preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
        }
    }
}

/// User preferences consumed by the session orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub sound: SoundConfig,
    /// Seconds counted down before the clock starts; 0 skips the phase.
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound: SoundConfig::default(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    50
}
fn default_countdown_secs() -> u32 {
    DEFAULT_COUNTDOWN_SECS
}

impl Preferences {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load preferences, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| {
            ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| {
            ConfigError::SaveFailed {
                path,
                message: e.to_string(),
            }
            .into()
        })
    }
}
