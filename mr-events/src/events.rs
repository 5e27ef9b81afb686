//! Event types pushed by the recorder backend.
//!
//! Every frame on the socket is a JSON object tagged by a `type` string.
//! `ServerMessage::decode` validates the payload of each known tag into a
//! typed variant; unknown tags are kept as `ServerMessage::Unknown`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mr_core::constants::zoom_status;
use mr_core::error::MrError;

/// All event tags emitted by the recorder backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Initial status sent right after the socket opens (`status`).
    Status,
    /// Zoom/meeting state changed (`status_update`).
    StatusUpdate,
    /// A recording began (`recording_started`).
    RecordingStarted,
    /// A recording was stopped by the user (`recording_stopped`).
    RecordingStopped,
    /// The meeting ended and the recording stopped itself (`auto_stopped`).
    AutoStopped,
    /// Speech-to-text finished (`transcription_complete`).
    TranscriptionComplete,
    /// Minutes were generated (`summary_complete`).
    SummaryComplete,
    /// The minutes document was written to disk (`document_saved`).
    DocumentSaved,
    /// A Google Docs copy was created (`google_docs_created`).
    GoogleDocsCreated,
    /// The post-processing pipeline finished (`processing_complete`).
    ProcessingComplete,
    /// The backend reported a failure (`error`).
    Error,
    /// Unknown/unhandled tag.
    Unknown(String),
}

impl EventKind {
    /// Parse a `type` tag from the server.
    pub fn from_tag(s: &str) -> Self {
        match s {
            "status" => Self::Status,
            "status_update" => Self::StatusUpdate,
            "recording_started" => Self::RecordingStarted,
            "recording_stopped" => Self::RecordingStopped,
            "auto_stopped" => Self::AutoStopped,
            "transcription_complete" => Self::TranscriptionComplete,
            "summary_complete" => Self::SummaryComplete,
            "document_saved" => Self::DocumentSaved,
            "google_docs_created" => Self::GoogleDocsCreated,
            "processing_complete" => Self::ProcessingComplete,
            "error" => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Convert to the server tag string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::StatusUpdate => "status_update",
            Self::RecordingStarted => "recording_started",
            Self::RecordingStopped => "recording_stopped",
            Self::AutoStopped => "auto_stopped",
            Self::TranscriptionComplete => "transcription_complete",
            Self::SummaryComplete => "summary_complete",
            Self::DocumentSaved => "document_saved",
            Self::GoogleDocsCreated => "google_docs_created",
            Self::ProcessingComplete => "processing_complete",
            Self::Error => "error",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zoom state as reported in `zoom_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomState {
    InMeeting,
    Running,
    NotDetected,
    /// A label this client does not recognise.
    Other,
}

impl ZoomState {
    /// Map a `zoom_status` label to a state.
    pub fn from_label(label: &str) -> Self {
        match label {
            zoom_status::IN_MEETING => Self::InMeeting,
            zoom_status::RUNNING => Self::Running,
            zoom_status::NOT_DETECTED => Self::NotDetected,
            _ => Self::Other,
        }
    }
}

/// Status blob carried by `status` and `status_update`.
///
/// The initial `status` includes `recording`; updates only carry the Zoom fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub recording: Option<bool>,
    #[serde(default)]
    pub zoom_status: Option<String>,
    #[serde(default)]
    pub meeting_active: bool,
}

impl StatusSnapshot {
    /// Parsed `zoom_status`, `NotDetected` when absent.
    pub fn zoom_state(&self) -> ZoomState {
        self.zoom_status
            .as_deref()
            .map(ZoomState::from_label)
            .unwrap_or(ZoomState::NotDetected)
    }

    /// Recording can only be started while a meeting is active.
    pub fn can_record(&self) -> bool {
        self.meeting_active
    }
}

#[derive(Deserialize)]
struct StatusEnvelope {
    data: StatusSnapshot,
}

/// Payload of `recording_started`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingStarted {
    pub meeting_title: String,
    /// `recording_and_transcription` or `transcription_only`.
    #[serde(default)]
    pub mode: Option<String>,
}

/// Payload of the text-only events: `recording_stopped`, `auto_stopped`, `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
}

/// Payload of `transcription_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionComplete {
    /// Audio length in seconds.
    pub duration: f64,
}

/// Payload of `summary_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryComplete {
    pub summary: String,
}

/// Payload of `document_saved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSaved {
    pub title: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Payload of `google_docs_created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleDocsCreated {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Payload of `processing_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingComplete {
    pub message: String,
    /// Transcription cost in USD.
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub document_path: Option<String>,
}

/// A decoded server message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Status(StatusSnapshot),
    StatusUpdate(StatusSnapshot),
    RecordingStarted(RecordingStarted),
    RecordingStopped(Notice),
    AutoStopped(Notice),
    TranscriptionComplete(TranscriptionComplete),
    SummaryComplete(SummaryComplete),
    DocumentSaved(DocumentSaved),
    GoogleDocsCreated(GoogleDocsCreated),
    ProcessingComplete(ProcessingComplete),
    Error(Notice),
    /// A tag this client does not handle, with the full payload.
    Unknown {
        kind: String,
        payload: serde_json::Value,
    },
}

/// Why an inbound frame could not be turned into a `ServerMessage`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not valid JSON.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON has no string `type` field.
    #[error("message has no type tag")]
    MissingTag,

    /// A known tag whose fields do not match its schema.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        source: serde_json::Error,
    },
}

impl From<DecodeError> for MrError {
    fn from(e: DecodeError) -> Self {
        MrError::Decode(e.to_string())
    }
}

impl ServerMessage {
    /// Decode a raw text frame.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .map(EventKind::from_tag)
            .ok_or(DecodeError::MissingTag)?;

        let message = match kind {
            EventKind::Status => Self::Status(payload::<StatusEnvelope>(&kind, value)?.data),
            EventKind::StatusUpdate => {
                Self::StatusUpdate(payload::<StatusEnvelope>(&kind, value)?.data)
            }
            EventKind::RecordingStarted => Self::RecordingStarted(payload(&kind, value)?),
            EventKind::RecordingStopped => Self::RecordingStopped(payload(&kind, value)?),
            EventKind::AutoStopped => Self::AutoStopped(payload(&kind, value)?),
            EventKind::TranscriptionComplete => {
                Self::TranscriptionComplete(payload(&kind, value)?)
            }
            EventKind::SummaryComplete => Self::SummaryComplete(payload(&kind, value)?),
            EventKind::DocumentSaved => Self::DocumentSaved(payload(&kind, value)?),
            EventKind::GoogleDocsCreated => Self::GoogleDocsCreated(payload(&kind, value)?),
            EventKind::ProcessingComplete => Self::ProcessingComplete(payload(&kind, value)?),
            EventKind::Error => Self::Error(payload(&kind, value)?),
            EventKind::Unknown(kind) => Self::Unknown {
                kind,
                payload: value,
            },
        };
        Ok(message)
    }

    /// The tag this message was decoded from.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Status(_) => EventKind::Status,
            Self::StatusUpdate(_) => EventKind::StatusUpdate,
            Self::RecordingStarted(_) => EventKind::RecordingStarted,
            Self::RecordingStopped(_) => EventKind::RecordingStopped,
            Self::AutoStopped(_) => EventKind::AutoStopped,
            Self::TranscriptionComplete(_) => EventKind::TranscriptionComplete,
            Self::SummaryComplete(_) => EventKind::SummaryComplete,
            Self::DocumentSaved(_) => EventKind::DocumentSaved,
            Self::GoogleDocsCreated(_) => EventKind::GoogleDocsCreated,
            Self::ProcessingComplete(_) => EventKind::ProcessingComplete,
            Self::Error(_) => EventKind::Error,
            Self::Unknown { kind, .. } => EventKind::Unknown(kind.clone()),
        }
    }
}

fn payload<T: DeserializeOwned>(
    kind: &EventKind,
    value: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload {
        kind: kind.as_str().to_string(),
        source,
    })
}
