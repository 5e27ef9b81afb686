//! Watch command - follow the live event stream.

use std::sync::Arc;

use chrono::Local;
use console::style;
use tracing::debug;

use mr_core::config::ConfigHandle;
use mr_core::error::{MrError, MrResult};
use mr_events::{
    resolve_ws_url, ConnectionState, EventClient, EventHandler, LogLevel, ReconnectPolicy,
    StatusSnapshot, ZoomState,
};

use crate::OutputFormat;

/// Prints every event as a timestamped line (or a JSON object per line).
struct ConsoleHandler {
    format: OutputFormat,
}

impl ConsoleHandler {
    fn emit(&self, level: LogLevel, event: &str, message: &str, extra: serde_json::Value) {
        let now = Local::now();
        match self.format {
            OutputFormat::Json => {
                let mut line = serde_json::json!({
                    "time": now.to_rfc3339(),
                    "level": level.to_string(),
                    "event": event,
                    "message": message,
                });
                if let (Some(line), serde_json::Value::Object(extra)) = (line.as_object_mut(), extra) {
                    line.extend(extra);
                }
                println!("{line}");
            }
            OutputFormat::Text => {
                let tag = match level {
                    LogLevel::Info => style(" INFO").cyan(),
                    LogLevel::Success => style("   OK").green().bold(),
                    LogLevel::Warning => style(" WARN").yellow().bold(),
                    LogLevel::Error => style("ERROR").red().bold(),
                };
                println!(
                    "{} {tag} {message}",
                    style(now.format("[%H:%M:%S]")).dim()
                );
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.emit(level, "log", message, serde_json::Value::Null);
    }
}

/// One-line description of a status snapshot.
fn describe_status(status: &StatusSnapshot) -> String {
    let zoom = status.zoom_status.as_deref().unwrap_or("-");
    let meeting = if status.meeting_active {
        "meeting active"
    } else {
        "no meeting"
    };
    let mut line = format!("zoom {zoom}, {meeting}");
    if status.recording == Some(true) {
        line.push_str(", recording");
    } else if status.can_record() {
        // updates omit `recording`; the meeting alone enables the action
        line.push_str(", ready to record");
    }
    line
}

impl EventHandler for ConsoleHandler {
    fn on_open(&self) {
        self.emit(LogLevel::Info, "open", "connected", serde_json::Value::Null);
    }

    fn on_close(&self) {
        self.emit(LogLevel::Warning, "close", "disconnected", serde_json::Value::Null);
    }

    fn on_error(&self, error: &MrError) {
        self.emit(LogLevel::Error, "transport_error", &error.to_string(), serde_json::Value::Null);
    }

    fn on_log(&self, level: LogLevel, message: &str) {
        self.log(level, message);
    }

    fn on_status(&self, status: &StatusSnapshot) {
        let level = match status.zoom_state() {
            ZoomState::InMeeting => LogLevel::Success,
            _ => LogLevel::Info,
        };
        self.emit(
            level,
            "status",
            &describe_status(status),
            serde_json::to_value(status).unwrap_or_default(),
        );
    }

    fn on_recording_started(&self, meeting_title: &str, mode: Option<&str>) {
        let message = match mode {
            Some(mode) => format!("recording started: {meeting_title} ({mode})"),
            None => format!("recording started: {meeting_title}"),
        };
        self.emit(
            LogLevel::Success,
            "recording_started",
            &message,
            serde_json::json!({ "meeting_title": meeting_title, "mode": mode }),
        );
    }

    fn on_summary(&self, summary: &str) {
        match self.format {
            OutputFormat::Json => self.emit(
                LogLevel::Success,
                "summary",
                "summary ready",
                serde_json::json!({ "summary": summary }),
            ),
            OutputFormat::Text => {
                self.log(LogLevel::Success, "summary ready");
                println!();
                println!("{}", style("Summary").bold().underlined());
                for line in summary.lines() {
                    println!("  {line}");
                }
                println!();
            }
        }
    }

    fn on_document_link(&self, url: &str, title: Option<&str>) {
        let message = match title {
            Some(title) => format!("Google Docs created: {title} {url}"),
            None => format!("Google Docs created: {url}"),
        };
        self.emit(
            LogLevel::Success,
            "google_docs_created",
            &message,
            serde_json::json!({ "url": url }),
        );
    }

    fn on_unknown(&self, kind: &str, _payload: &serde_json::Value) {
        debug!("ignoring event {kind}");
    }
}

/// Run the watch command.
pub async fn run(config: ConfigHandle, url: Option<String>, format: OutputFormat) -> MrResult<()> {
    let cfg = config.read().await.clone();

    let explicit = url.as_deref().unwrap_or(&cfg.server.ws_base_url);
    let ws_url = resolve_ws_url(Some(explicit), &cfg.server.origin)?;
    let policy = ReconnectPolicy::from_config(&cfg.events);

    if format == OutputFormat::Text {
        println!(
            "Watching {} {}",
            style(&ws_url).bold(),
            style("(Ctrl+C to stop)").dim()
        );
    }

    let handler = Arc::new(ConsoleHandler { format });
    let client = EventClient::connect_ws(ws_url, handler, policy);
    let mut state = client.state_receiver();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if format == OutputFormat::Text {
                println!("\n  Disconnecting...");
            }
        }
        _ = state.wait_for(|s| s.is_terminal()) => {}
    }

    client.close().await;
    finish(client.url(), client.state())
}

/// Exit status of a watch: an error when the reconnect policy gave up.
fn finish(url: &str, state: ConnectionState) -> MrResult<()> {
    if state == ConnectionState::Failed {
        return Err(MrError::WebSocket(format!("gave up reconnecting to {url}")));
    }
    Ok(())
}
