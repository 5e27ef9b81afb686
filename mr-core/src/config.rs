//! Application configuration management.
//!
//! Handles loading, saving, and accessing configuration: where the recorder
//! backend lives, how the event client reconnects, logging, and the default
//! recording options. Configuration is persisted as TOML on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::constants;
use crate::error::{MrError, MrResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Event client settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for `start` when no flags are given.
    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Origin the front end is served from (scheme + host + port).
    /// Used to derive the REST and socket targets when no explicit base is set.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Explicit REST base URL. Empty means "same as origin".
    #[serde(default)]
    pub api_base_url: String,

    /// Explicit socket URL. Empty means "origin with ws scheme + /ws".
    #[serde(default)]
    pub ws_base_url: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,
}

/// Event client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Delay between a close and the next connection attempt.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Maximum consecutive reconnection attempts (0 = unlimited).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// Recording defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// `recording_and_transcription` or `transcription_only`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Record audio only (recording mode only).
    #[serde(default)]
    pub audio_only: bool,

    /// Stop automatically when the meeting ends.
    #[serde(default = "default_true")]
    pub auto_stop: bool,
}

// Default value functions for serde

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_reconnect_delay() -> u64 {
    constants::DEFAULT_RECONNECT_DELAY_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mode() -> String {
    constants::modes::RECORDING_AND_TRANSCRIPTION.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            api_base_url: String::new(),
            ws_base_url: String::new(),
            api_timeout_ms: default_api_timeout(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay(),
            max_reconnect_attempts: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            audio_only: false,
            auto_stop: true,
        }
    }
}

impl EventsConfig {
    /// The reconnect delay as a `Duration`.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// The attempt cap, `None` when unlimited.
    pub fn max_attempts(&self) -> Option<u32> {
        (self.max_reconnect_attempts > 0).then_some(self.max_reconnect_attempts)
    }
}

impl AppConfig {
    /// Load `path`, or the defaults when no file exists there yet.
    pub fn load_or_default(path: &Path) -> MrResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> MrResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> MrResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MrError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> MrResult<PathBuf> {
        Ok(Platform::config_dir()?.join(constants::CONFIG_FILE_NAME))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> MrResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Apply `MEETREC_API_BASE_URL` / `MEETREC_WS_BASE_URL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply base URL overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(constants::ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.server.api_base_url = v.trim().to_string();
        }
        if let Some(v) = lookup(constants::ENV_WS_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.server.ws_base_url = v.trim().to_string();
        }
    }

    /// Sanitize and normalize an origin or base URL typed by a user.
    ///
    /// Strips quotes and trailing slashes, and adds `http://` when no scheme is given.
    pub fn sanitize_address(address: &str) -> String {
        let trimmed = address.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across tasks.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.api_timeout_ms, 30_000);
        assert_eq!(config.events.reconnect_delay_ms, 3_000);
        assert_eq!(config.events.max_attempts(), None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.recording.mode, "recording_and_transcription");
        assert!(config.recording.auto_stop);
    }

    #[test]
    fn test_sanitize_address() {
        assert_eq!(
            AppConfig::sanitize_address("recorder.example.com/"),
            "http://recorder.example.com"
        );
        assert_eq!(
            AppConfig::sanitize_address("  \"https://example.com/\"  "),
            "https://example.com"
        );
        assert_eq!(
            AppConfig::sanitize_address("wss://example.com/ws"),
            "wss://example.com/ws"
        );
        assert_eq!(AppConfig::sanitize_address("   "), "");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MEETREC_API_BASE_URL", "https://api.example.com"),
            ("MEETREC_WS_BASE_URL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.server.ws_base_url = "ws://kept".into();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.api_base_url, "https://api.example.com");
        assert_eq!(config.server.ws_base_url, "ws://kept");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            origin = "https://rec.example.com"

            [events]
            max_reconnect_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.origin, "https://rec.example.com");
        assert_eq!(config.server.api_timeout_ms, 30_000);
        assert_eq!(config.events.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(config.events.max_attempts(), Some(5));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.server.ws_base_url = "wss://events.example.com/ws".into();
        config.recording.mode = "transcription_only".into();
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.ws_base_url, "wss://events.example.com/ws");
        assert_eq!(loaded.recording.mode, "transcription_only");
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let missing = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(missing.events.reconnect_delay_ms, 3_000);

        std::fs::write(&path, "[events]\nreconnect_delay_ms = 500\n").unwrap();
        let loaded = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.events.reconnect_delay_ms, 500);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = toml::from_str::<AppConfig>("[server\norigin = 1").unwrap_err();
        assert!(matches!(MrError::from(err), MrError::Config(_)));
    }
}
