//! Lectern configuration.
//!
//! Settings are read from a small JSON file in the standard configuration
//! directory (`~/.config/lectern/config.json` on most platforms), then
//! overridden by environment variables. Command line flags are applied on
//! top by the binary. A missing file yields defaults; a malformed one is
//! reported and ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "LECTERN_CONFIG_PATH";
/// Environment variable overriding [`LecternConfig::api_url`].
pub const API_URL_ENV: &str = "LECTERN_API_URL";
/// Environment variable overriding [`LecternConfig::user_id`].
pub const USER_ID_ENV: &str = "LECTERN_USER_ID";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "lectern.log";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_USER_ID: &str = "guest";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error surfaced when the configuration file cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LecternConfig {
    /// Base URL of the course content API.
    pub api_url: String,
    /// User whose unlock progress and grades are shown.
    pub user_id: String,
    /// Course opened when none is given on the command line.
    pub default_course: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            default_course: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl LecternConfig {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&default_config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse config file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(api_url) = non_empty_env(API_URL_ENV) {
            self.api_url = api_url;
        }
        if let Some(user_id) = non_empty_env(USER_ID_ENV) {
            self.user_id = user_id;
        }
    }

    /// Per-request timeout for the HTTP client. Zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn lectern_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("lectern")
}

/// Config file location, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }
    lectern_dir().join(CONFIG_FILE_NAME)
}

/// File the terminal UI logs to, next to the config file.
pub fn log_file_path() -> PathBuf {
    lectern_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = LecternConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, LecternConfig::default());
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.user_id, "guest");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_course": "CS101", "request_timeout_secs": 5}"#).unwrap();

        let config = LecternConfig::load_from(&path).unwrap();
        assert_eq!(config.default_course.as_deref(), Some("CS101"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.user_id, "guest");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(LecternConfig::load_from(&path).unwrap(), LecternConfig::default());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(matches!(LecternConfig::load_from(dir.path()), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = LecternConfig {
            request_timeout_secs: 0,
            ..LecternConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_url": "https://lms.example.edu", "user_id": "file-user"}"#).unwrap();

        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.to_str().unwrap())),
                (API_URL_ENV, None),
                (USER_ID_ENV, Some("env-user")),
            ],
            || {
                let config = LecternConfig::load().unwrap();
                assert_eq!(config.api_url, "https://lms.example.edu");
                assert_eq!(config.user_id, "env-user");
            },
        );
    }

    #[test]
    fn blank_env_values_are_ignored() {
        temp_env::with_vars([(API_URL_ENV, Some("  ")), (USER_ID_ENV, Some(""))], || {
            let mut config = LecternConfig::default();
            config.apply_env_overrides();
            assert_eq!(config, LecternConfig::default());
        });
    }

    #[test]
    fn config_path_honors_env_override() {
        let override_path = "~/custom/lectern.json";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            assert_eq!(default_config_path(), expand_tilde(override_path));
        });
    }

    #[test]
    fn log_file_lives_in_lectern_dir() {
        let path = log_file_path();
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("lectern.log"));
        assert_eq!(
            path.parent().and_then(|parent| parent.file_name()).and_then(|name| name.to_str()),
            Some("lectern")
        );
    }
}
