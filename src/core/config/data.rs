use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const BASE_URL_ENV: &str = "SOUS_BASE_URL";

/// Keys accepted by `sous set` / `sous unset`.
pub const SETTING_KEYS: [&str; 4] = ["base-url", "default-user", "request-timeout", "log-file"];

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root URL of the assistant server, e.g. "http://localhost:8000"
    pub base_url: Option<String>,
    /// User id pre-filled in the Name field
    pub default_user: Option<String>,
    /// Per-request timeout; 0 disables it
    pub request_timeout_secs: Option<u64>,
    /// Where to write tracing output while the chat UI is running
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(
                f,
                "Unknown config key '{key}'. Available keys: {}",
                SETTING_KEYS.join(", ")
            ),
            SettingError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

fn canonical_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

impl Config {
    /// Base URL by precedence: flag, then environment, then config file,
    /// then the built-in default.
    pub fn resolve_base_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, env, self.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    /// [`Config::resolve_base_url`] reading `SOUS_BASE_URL` from the process
    /// environment.
    pub fn base_url_from_env(&self, flag: Option<&str>) -> String {
        let env = std::env::var(BASE_URL_ENV).ok();
        self.resolve_base_url(flag, env.as_deref())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SettingError> {
        let value = value.trim();
        let key = canonical_key(key);
        if value.is_empty() {
            return Err(SettingError::InvalidValue {
                key,
                reason: "value must not be empty".to_string(),
            });
        }

        match key.as_str() {
            "base-url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(SettingError::InvalidValue {
                        key,
                        reason: "expected an http:// or https:// URL".to_string(),
                    });
                }
                self.base_url = Some(value.to_string());
            }
            "default-user" => self.default_user = Some(value.to_string()),
            "request-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|err| SettingError::InvalidValue {
                        key: key.clone(),
                        reason: err.to_string(),
                    })?;
                self.request_timeout_secs = Some(secs);
            }
            "log-file" => self.log_file = Some(PathBuf::from(value)),
            _ => return Err(SettingError::UnknownKey(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), SettingError> {
        match canonical_key(key).as_str() {
            "base-url" => self.base_url = None,
            "default-user" => self.default_user = None,
            "request-timeout" => self.request_timeout_secs = None,
            "log-file" => self.log_file = None,
            other => return Err(SettingError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
