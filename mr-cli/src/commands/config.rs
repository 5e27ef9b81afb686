//! Config commands - the local configuration file.

use std::path::Path;

use clap::Subcommand;
use console::style;

use mr_core::config::{AppConfig, ConfigHandle};
use mr_core::constants::modes;
use mr_core::error::{MrError, MrResult};

use super::print_json;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show all values.
    Show,
    /// Get a value by key path.
    Get {
        /// Key path (e.g. "server.origin", "events.reconnect_delay_ms").
        key: String,
    },
    /// Set a value by key path and save the file.
    Set {
        /// Key path (e.g. "server.origin", "events.reconnect_delay_ms").
        key: String,
        /// New value.
        value: String,
    },
    /// Print the config file location.
    Path,
}

/// Resolve a dot-separated key path to a value from the config.
fn get_value(cfg: &AppConfig, key: &str) -> Option<String> {
    match key {
        "server.origin" => Some(cfg.server.origin.clone()),
        "server.api_base_url" => Some(cfg.server.api_base_url.clone()),
        "server.ws_base_url" => Some(cfg.server.ws_base_url.clone()),
        "server.api_timeout_ms" => Some(cfg.server.api_timeout_ms.to_string()),
        "events.reconnect_delay_ms" => Some(cfg.events.reconnect_delay_ms.to_string()),
        "events.max_reconnect_attempts" => Some(cfg.events.max_reconnect_attempts.to_string()),
        "logging.level" => Some(cfg.logging.level.clone()),
        "logging.directory" => Some(cfg.logging.directory.clone()),
        "logging.json_output" => Some(cfg.logging.json_output.to_string()),
        "recording.mode" => Some(cfg.recording.mode.clone()),
        "recording.audio_only" => Some(cfg.recording.audio_only.to_string()),
        "recording.auto_stop" => Some(cfg.recording.auto_stop.to_string()),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    value.parse().map_err(|_| "expected true/false".to_string())
}

/// Apply a value to a dot-separated key path on the config.
fn set_value(cfg: &mut AppConfig, key: &str, value: &str) -> Result<(), String> {
    match key {
        "server.origin" => cfg.server.origin = AppConfig::sanitize_address(value),
        "server.api_base_url" => cfg.server.api_base_url = value.trim().to_string(),
        "server.ws_base_url" => cfg.server.ws_base_url = value.trim().to_string(),
        "server.api_timeout_ms" => {
            cfg.server.api_timeout_ms = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "events.reconnect_delay_ms" => {
            cfg.events.reconnect_delay_ms =
                value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "events.max_reconnect_attempts" => {
            cfg.events.max_reconnect_attempts = value
                .parse()
                .map_err(|_| "invalid integer (0 = unlimited)".to_string())?;
        }
        "logging.level" => {
            let v = value.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&v.as_str()) {
                return Err("expected one of: trace, debug, info, warn, error".to_string());
            }
            cfg.logging.level = v;
        }
        "logging.directory" => cfg.logging.directory = value.to_string(),
        "logging.json_output" => cfg.logging.json_output = parse_bool(value)?,
        "recording.mode" => {
            if !modes::ALL.contains(&value) {
                return Err(format!("expected one of: {}", modes::ALL.join(", ")));
            }
            cfg.recording.mode = value.to_string();
        }
        "recording.audio_only" => cfg.recording.audio_only = parse_bool(value)?,
        "recording.auto_stop" => cfg.recording.auto_stop = parse_bool(value)?,
        _ => return Err(format!("unknown config key: {key}")),
    }
    Ok(())
}

fn print_config_text(cfg: &AppConfig) {
    let show = |key: &str| {
        let value = get_value(cfg, key).unwrap_or_default();
        let value = if value.is_empty() {
            style("(unset)".to_string()).dim()
        } else {
            style(value)
        };
        println!("  {key:<32} {value}");
    };

    println!("{}", style("Server").bold().underlined());
    show("server.origin");
    show("server.api_base_url");
    show("server.ws_base_url");
    show("server.api_timeout_ms");

    println!();
    println!("{}", style("Events").bold().underlined());
    show("events.reconnect_delay_ms");
    show("events.max_reconnect_attempts");

    println!();
    println!("{}", style("Logging").bold().underlined());
    show("logging.level");
    show("logging.directory");
    show("logging.json_output");

    println!();
    println!("{}", style("Recording").bold().underlined());
    show("recording.mode");
    show("recording.audio_only");
    show("recording.auto_stop");
}

pub async fn run(
    config: ConfigHandle,
    path: &Path,
    action: ConfigAction,
    format: OutputFormat,
) -> MrResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => print_json(&serde_json::to_value(&*cfg)?),
                OutputFormat::Text => print_config_text(&cfg),
            }
        }
        ConfigAction::Get { key } => {
            let cfg = config.read().await;
            let value = get_value(&cfg, &key)
                .ok_or_else(|| MrError::Config(format!("unknown config key: {key}")))?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "key": key, "value": value })),
                OutputFormat::Text => println!("{key} = {value}"),
            }
        }
        ConfigAction::Set { key, value } => {
            // environment overrides are runtime only; save what is on disk
            let mut on_disk = AppConfig::load_or_default(path)?;
            set_value(&mut on_disk, &key, &value)
                .map_err(|e| MrError::Config(format!("failed to set {key}: {e}")))?;
            on_disk.save_to_file(path)?;

            let saved = get_value(&on_disk, &key).unwrap_or_default();
            *config.write().await = on_disk;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "key": key,
                    "value": saved,
                    "saved": path.display().to_string(),
                })),
                OutputFormat::Text => {
                    println!("{} {key} = {saved}", style("SET").green().bold());
                }
            }
        }
        ConfigAction::Path => match format {
            OutputFormat::Json => print_json(&serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
            })),
            OutputFormat::Text => println!("{}", path.display()),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shown_key_is_settable() {
        let mut cfg = AppConfig::default();
        for key in [
            "server.origin",
            "server.api_timeout_ms",
            "events.reconnect_delay_ms",
            "events.max_reconnect_attempts",
            "logging.level",
            "recording.mode",
            "recording.auto_stop",
        ] {
            let current = get_value(&cfg, key).unwrap();
            set_value(&mut cfg, key, &current).unwrap();
            assert_eq!(get_value(&cfg, key).unwrap(), current, "{key}");
        }
    }

    #[test]
    fn test_set_sanitizes_origin() {
        let mut cfg = AppConfig::default();
        set_value(&mut cfg, "server.origin", " recorder.local:8000/ ").unwrap();
        assert_eq!(cfg.server.origin, "http://recorder.local:8000");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        assert!(set_value(&mut cfg, "events.reconnect_delay_ms", "soon").is_err());
        assert!(set_value(&mut cfg, "recording.mode", "video_only").is_err());
        assert!(set_value(&mut cfg, "logging.level", "loud").is_err());
        assert!(set_value(&mut cfg, "no.such.key", "1").is_err());
        assert_eq!(cfg.events.reconnect_delay_ms, 3000);
    }

    #[test]
    fn test_unknown_key_has_no_value() {
        assert_eq!(get_value(&AppConfig::default(), "server.password"), None);
    }
}
