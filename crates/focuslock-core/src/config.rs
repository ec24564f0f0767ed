//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - default session duration and the preset chips
//! - default visibility switches
//! - restricted-mode default
//! - enforcement tuning (warning auto-dismiss, blocked keys)
//! - widget injection tuning (retry delay, retry bound)
//!
//! Configuration is stored at `~/.config/focuslock/config.toml`. Session
//! state itself is never persisted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::{
    ControllerOptions, EnforcementTuning, InjectionTuning, VisibilityFlags, MAX_SESSION_MINUTES,
    MIN_SESSION_MINUTES,
};

/// Session defaults seeded into the popup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    /// Whether sessions run in restricted (enforced) mode.
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub flags: VisibilityFlags,
}

fn default_minutes() -> u32 {
    5
}

fn default_presets() -> Vec<u32> {
    vec![5, 10, 30]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            presets: default_presets(),
            restricted: false,
            flags: VisibilityFlags::default(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focuslock/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub enforcement: EnforcementTuning,
    #[serde(default)]
    pub injection: InjectionTuning,
}

impl Config {
    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        match Self::load_from(&Self::config_path()) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(error = %err, "using default configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focuslock")
            .join("config.toml")
    }

    /// Controller options derived from this configuration.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            restricted: self.session.restricted,
            injection: self.injection.clone(),
            enforcement: self.enforcement.clone(),
        }
    }

    // ── Key-based access for the CLI ─────────────────────────────────

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "session.default_minutes" => Some(self.session.default_minutes.to_string()),
            "session.restricted" => Some(self.session.restricted.to_string()),
            "enforcement.warning_dismiss_ms" => {
                Some(self.enforcement.warning_dismiss_ms.to_string())
            }
            "injection.retry_delay_ms" => Some(self.injection.retry_delay_ms.to_string()),
            "injection.max_attempts" => Some(self.injection.max_attempts.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "session.default_minutes" => {
                let minutes: u32 = value.parse().map_err(|_| invalid("expected an integer"))?;
                if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&minutes) {
                    return Err(invalid("expected 1-60"));
                }
                self.session.default_minutes = minutes;
            }
            "session.restricted" => {
                self.session.restricted =
                    value.parse().map_err(|_| invalid("expected true or false"))?;
            }
            "enforcement.warning_dismiss_ms" => {
                self.enforcement.warning_dismiss_ms =
                    value.parse().map_err(|_| invalid("expected an integer"))?;
            }
            "injection.retry_delay_ms" => {
                self.injection.retry_delay_ms =
                    value.parse().map_err(|_| invalid("expected an integer"))?;
            }
            "injection.max_attempts" => {
                self.injection.max_attempts =
                    value.parse().map_err(|_| invalid("expected an integer"))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::KeyCombo;

    #[test]
    fn defaults_match_the_popup() {
        let config = Config::default();
        assert_eq!(config.session.default_minutes, 5);
        assert_eq!(config.session.presets, vec![5, 10, 30]);
        assert!(!config.session.restricted);
        assert_eq!(config.session.flags, VisibilityFlags::default());
        assert_eq!(config.enforcement.warning_dismiss_ms, 1000);
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut config = Config::default();
        config.set("session.default_minutes", "25").unwrap();
        assert_eq!(config.get("session.default_minutes").unwrap(), "25");
        config.set("session.restricted", "true").unwrap();
        assert_eq!(config.get("session.restricted").unwrap(), "true");
        assert!(config.set("session.default_minutes", "0").is_err());
        assert!(config.set("session.default_minutes", "banana").is_err());
        assert!(config.set("no.such.key", "1").is_err());
        assert!(config.get("no.such.key").is_none());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.session.default_minutes = 45;
        config.session.restricted = true;
        config.session.flags.solutions = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session.default_minutes, 45);
        assert!(loaded.session.restricted);
        assert!(!loaded.session.flags.solutions);
    }

    #[test]
    fn blocked_keys_serialize_as_strings() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("\"ctrl+w\""));

        let mut config = Config::default();
        config.enforcement.blocked_keys = vec!["ctrl+shift+tab".parse::<KeyCombo>().unwrap()];
        let toml = toml::to_string_pretty(&config).unwrap();
        let loaded: Config = toml::from_str(&toml).unwrap();
        assert_eq!(loaded.enforcement.blocked_keys.len(), 1);
        assert_eq!(loaded.enforcement.blocked_keys[0].key, "tab");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(Config::load_from(&path).is_err());
    }
}
