//! Callback table invoked by the event client.
//!
//! Each decoded message is routed to exactly one `EventHandler` method.
//! Every method defaults to a no-op, so implementors only override what
//! they display.

use mr_core::error::MrError;

use crate::events::{ServerMessage, StatusSnapshot};

/// Severity of a log line produced from an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Receiver of connection lifecycle callbacks and decoded messages.
///
/// Methods are called from the client's task, one at a time and in arrival
/// order. They must return quickly.
pub trait EventHandler: Send + Sync + 'static {
    /// A connection was established.
    fn on_open(&self) {}

    /// The connection ended, for any reason. A reconnect follows unless the
    /// client was closed or ran out of attempts.
    fn on_close(&self) {}

    /// The transport failed to open or broke while reading.
    fn on_error(&self, _error: &MrError) {}

    /// A line for the activity log.
    fn on_log(&self, _level: LogLevel, _message: &str) {}

    /// `status` / `status_update`.
    fn on_status(&self, _status: &StatusSnapshot) {}

    /// `recording_started`.
    fn on_recording_started(&self, _meeting_title: &str, _mode: Option<&str>) {}

    /// `summary_complete`.
    fn on_summary(&self, _summary: &str) {}

    /// `google_docs_created`.
    fn on_document_link(&self, _url: &str, _title: Option<&str>) {}

    /// Any tag not listed above.
    fn on_unknown(&self, _kind: &str, _payload: &serde_json::Value) {}
}

/// Route a decoded message to its handler method.
pub fn dispatch(handler: &dyn EventHandler, message: &ServerMessage) {
    match message {
        ServerMessage::Status(status) | ServerMessage::StatusUpdate(status) => {
            handler.on_status(status)
        }
        ServerMessage::RecordingStarted(started) => {
            handler.on_recording_started(&started.meeting_title, started.mode.as_deref())
        }
        ServerMessage::RecordingStopped(notice) => handler.on_log(LogLevel::Info, &notice.message),
        ServerMessage::AutoStopped(notice) => handler.on_log(LogLevel::Success, &notice.message),
        ServerMessage::TranscriptionComplete(done) => handler.on_log(
            LogLevel::Success,
            &format!("transcription complete ({}s)", done.duration.round()),
        ),
        ServerMessage::SummaryComplete(done) => handler.on_summary(&done.summary),
        ServerMessage::DocumentSaved(doc) => {
            handler.on_log(LogLevel::Success, &format!("document saved: {}", doc.title))
        }
        ServerMessage::GoogleDocsCreated(doc) => {
            handler.on_document_link(&doc.url, doc.title.as_deref())
        }
        ServerMessage::ProcessingComplete(done) => {
            handler.on_log(LogLevel::Success, &done.message)
        }
        ServerMessage::Error(notice) => handler.on_log(LogLevel::Error, &notice.message),
        ServerMessage::Unknown { kind, payload } => handler.on_unknown(kind, payload),
    }
}
