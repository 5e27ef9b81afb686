//! Recorder status and recording control endpoints.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use mr_core::constants::modes;
use mr_core::error::{MrError, MrResult};

use crate::client::ApiClient;
use crate::response::ActionResponse;

/// Recorder state returned by `/api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderStatus {
    #[serde(default)]
    pub recording: bool,
    #[serde(default)]
    pub zoom_status: String,
    #[serde(default)]
    pub meeting_active: bool,
    #[serde(default)]
    pub meeting_title: Option<String>,
    /// Local time the recording started, ISO 8601 without offset.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Seconds since `start_time`, 0 when idle.
    #[serde(default)]
    pub duration: f64,
}

impl RecorderStatus {
    /// A recording can be started: a meeting is active and nothing is recording.
    pub fn can_start(&self) -> bool {
        self.meeting_active && !self.recording
    }

    /// Parsed `start_time`.
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        let raw = self.start_time.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    /// Recording length so far.
    pub fn elapsed(&self) -> Duration {
        // negative or out-of-range values read as zero
        Duration::try_from_secs_f64(self.duration).unwrap_or_default()
    }

    /// Recording length as `HH:MM:SS`.
    pub fn elapsed_hms(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Body of `/api/recording/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRecordingRequest {
    /// Server picks `Meeting_<timestamp>` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_title: Option<String>,
    pub audio_only: bool,
    pub auto_stop: bool,
    pub mode: String,
}

impl StartRecordingRequest {
    /// Request for `mode` with auto-stop on and audio-only off.
    pub fn new(mode: &str) -> MrResult<Self> {
        if !modes::ALL.contains(&mode) {
            return Err(MrError::Config(format!(
                "unknown recording mode {mode:?} (expected one of {})",
                modes::ALL.join(", ")
            )));
        }
        Ok(Self {
            meeting_title: None,
            audio_only: false,
            auto_stop: true,
            mode: mode.to_string(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.meeting_title = (!title.trim().is_empty()).then_some(title);
        self
    }

    pub fn with_audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }

    pub fn with_auto_stop(mut self, auto_stop: bool) -> Self {
        self.auto_stop = auto_stop;
        self
    }

    /// The body actually sent: audio-only only applies when recording video.
    pub fn normalized(&self) -> Self {
        let mut req = self.clone();
        req.audio_only = self.audio_only && self.mode == modes::RECORDING_AND_TRANSCRIPTION;
        req
    }
}

impl ApiClient {
    /// Get the recorder state. No authentication required.
    pub async fn status(&self) -> MrResult<RecorderStatus> {
        self.get_json("/api/status").await
    }

    /// Start recording the active meeting.
    pub async fn start_recording(
        &self,
        request: &StartRecordingRequest,
    ) -> MrResult<ActionResponse> {
        let body = request.normalized();
        let resp: ActionResponse = self.post_json("/api/recording/start", &body).await?;
        info!("recording started (mode {})", body.mode);
        Ok(resp)
    }

    /// Stop the current recording; processing continues on the server.
    pub async fn stop_recording(&self) -> MrResult<ActionResponse> {
        let resp: ActionResponse = self
            .post_json("/api/recording/stop", &serde_json::json!({}))
            .await?;
        info!("recording stopped");
        Ok(resp)
    }
}
