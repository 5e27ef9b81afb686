//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "meetrec";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default REST request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Fixed delay between a socket close and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;

/// Path of the event stream endpoint, appended to the page origin.
pub const WS_PATH: &str = "/ws";

/// Environment variable overriding `server.api_base_url`.
pub const ENV_API_BASE_URL: &str = "MEETREC_API_BASE_URL";

/// Environment variable overriding `server.ws_base_url`.
pub const ENV_WS_BASE_URL: &str = "MEETREC_WS_BASE_URL";

/// Rotated log file name.
pub const LOG_FILE_NAME: &str = "meetrec.log";

/// Persisted login session file name.
pub const SESSION_FILE_NAME: &str = "session.toml";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Recording modes accepted by `/api/recording/start`.
pub mod modes {
    /// Screen recording followed by transcription.
    pub const RECORDING_AND_TRANSCRIPTION: &str = "recording_and_transcription";
    /// Audio capture for transcription only; nothing is kept on disk.
    pub const TRANSCRIPTION_ONLY: &str = "transcription_only";

    /// All valid modes.
    pub const ALL: &[&str] = &[RECORDING_AND_TRANSCRIPTION, TRANSCRIPTION_ONLY];
}

/// Values of `zoom_status` reported by the recorder backend.
pub mod zoom_status {
    /// A meeting is in progress.
    pub const IN_MEETING: &str = "会議中";
    /// The Zoom app is running but no meeting is active.
    pub const RUNNING: &str = "起動中";
    /// Zoom was not found.
    pub const NOT_DETECTED: &str = "未検出";
}
