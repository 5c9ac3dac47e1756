/// Application settings
///
/// Read from `<config dir>/dm-display/config.json`. Every field has a
/// default, so a missing file or a partial one both work. The backend
/// URLs can also be overridden from the environment.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::sync::popup::{PopupSpec, DEFAULT_POLL_INTERVAL, PLAYER_WINDOW_NAME};

pub const API_URL_ENV: &str = "DMD_API_URL";
pub const WS_URL_ENV: &str = "DMD_WS_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Size and title of the player window
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerWindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

impl Default for PlayerWindowConfig {
    fn default() -> Self {
        let spec = PopupSpec::default();
        Self {
            width: spec.width,
            height: spec.height,
            title: spec.title,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// REST API root, e.g. http://localhost:8080/api/v1
    pub api_base_url: String,
    /// Push notification endpoint
    pub ws_url: String,
    /// Name of the bus shared by the DM and player windows
    pub channel_name: String,
    pub player_window: PlayerWindowConfig,
    pub popup_poll_interval_ms: u64,
    pub notification_timeout_ms: u64,
    /// Image the player window shows while nothing is published
    pub default_player_image: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".to_string(),
            ws_url: "ws://localhost:8080/api/v1/ws".to_string(),
            channel_name: "dmd-channel".to_string(),
            player_window: PlayerWindowConfig::default(),
            popup_poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            notification_timeout_ms: 2500,
            default_player_image: None,
        }
    }
}

impl AppConfig {
    /// Load the user's config, falling back to defaults on any problem
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => {
                    info!("⚙️  Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("⚠️  {}, using defaults", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Where the config file lives
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("dm-display");
        path.push("config.json");
        Some(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Apply environment overrides; `lookup` returns a variable's value
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(WS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.ws_url = url;
        }
    }

    pub fn popup_spec(&self) -> PopupSpec {
        PopupSpec {
            name: PLAYER_WINDOW_NAME.to_string(),
            title: self.player_window.title.clone(),
            width: self.player_window.width,
            height: self.player_window.height,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.popup_poll_interval_ms.max(100))
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.channel_name, "dmd-channel");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.notification_timeout(), Duration::from_millis(2500));

        let spec = config.popup_spec();
        assert_eq!(spec.name, "dmdPlayerWindow");
        assert_eq!((spec.width, spec.height), (1280.0, 720.0));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"api_base_url": "http://table:9000/api/v1", "player_window": {"width": 1920}}"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://table:9000/api/v1");
        assert_eq!(config.ws_url, "ws://localhost:8080/api/v1/ws");
        assert_eq!(config.player_window.width, 1920.0);
        assert_eq!(config.player_window.height, 720.0);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            API_URL_ENV => Some("http://other/api/v1".to_string()),
            WS_URL_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://other/api/v1");
        assert_eq!(config.ws_url, AppConfig::default().ws_url);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("dm-display-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse(..))));
        let _ = std::fs::remove_file(&path);
    }
}
