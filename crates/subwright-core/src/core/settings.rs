//! Settings Persistence
//!
//! Persistent application settings with atomic file writes (temp file +
//! rename), defaults for missing fields, and a normalize pass so a
//! corrupted or outdated config never bricks the app.
//!
//! Storage location: `{data_dir}/subwright/settings.json`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{CoreError, CoreResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

// =============================================================================
// Settings Schema
// =============================================================================

/// Application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// AI service settings
    #[serde(default)]
    pub ai: AiSettings,

    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackSettings,

    /// Account bootstrap settings
    #[serde(default)]
    pub auth: AuthSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            ai: AiSettings::default(),
            playback: PlaybackSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

/// Generative AI service settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    /// API key (also overridable via environment in the CLI)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model override
    #[serde(default)]
    pub model: Option<String>,
    /// Voice used for dubbing
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Default translation target
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_target_language() -> String {
    "English".to_string()
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            voice: default_voice(),
            target_language: default_target_language(),
        }
    }
}

/// Playback settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSettings {
    /// Initial volume in [0, 1]
    #[serde(default = "default_volume")]
    pub default_volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
        }
    }
}

/// Bootstrap account configuration. The admin credential pair lives here
/// (not in code) and is hashed the moment the store opens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

// =============================================================================
// Load / Save
// =============================================================================

impl AppSettings {
    /// Default settings directory under the platform data dir
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("subwright")
    }

    /// Loads settings from `dir`, falling back to defaults when the file
    /// is missing or unreadable (tolerant by design).
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        let mut settings = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AppSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("settings file corrupted ({}), using defaults", e);
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        };
        settings.normalize();
        settings
    }

    /// Saves settings atomically (temp file + rename)
    pub fn save(&self, dir: &Path) -> CoreResult<()> {
        fs::create_dir_all(dir)?;
        let path = dir.join(SETTINGS_FILE);
        let temp = dir.join(format!("{}.tmp", SETTINGS_FILE));

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp, json)?;
        fs::rename(&temp, &path)
            .map_err(|e| CoreError::PersistenceFailed(format!("settings rename: {}", e)))?;
        Ok(())
    }

    /// Normalizes and clamps values so persisted state is always valid
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;
        self.playback.default_volume = self.playback.default_volume.clamp(0.0, 1.0);
        if self.ai.voice.trim().is_empty() {
            self.ai.voice = default_voice();
        }
        if self.ai.target_language.trim().is_empty() {
            self.ai.target_language = default_target_language();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.ai.voice, "Kore");
        assert_eq!(settings.playback.default_volume, 1.0);
        assert!(settings.auth.bootstrap_admin_email.is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut settings = AppSettings::default();
        settings.ai.api_key = Some("key-123".to_string());
        settings.auth.bootstrap_admin_email = Some("admin@example.com".to_string());

        settings.save(dir.path()).unwrap();
        let loaded = AppSettings::load(dir.path());
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());
    }

    #[test]
    fn test_load_corrupted_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"ai": {"apiKey": "abc"}}"#,
        )
        .unwrap();

        let loaded = AppSettings::load(dir.path());
        assert_eq!(loaded.ai.api_key, Some("abc".to_string()));
        assert_eq!(loaded.ai.voice, "Kore");
        assert_eq!(loaded.version, SETTINGS_VERSION);
    }

    #[test]
    fn test_normalize_clamps_volume() {
        let mut settings = AppSettings::default();
        settings.playback.default_volume = 3.5;
        settings.ai.voice = "  ".to_string();
        settings.normalize();

        assert_eq!(settings.playback.default_volume, 1.0);
        assert_eq!(settings.ai.voice, "Kore");
    }
}
