//! Server-side settings endpoints.

use serde::{Deserialize, Serialize};

use mr_core::error::MrResult;

use crate::client::ApiClient;
use crate::response::ActionResponse;

/// Folders and integrations configured on the recorder host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub recording_folder: String,
    pub document_folder: String,
    #[serde(default)]
    pub google_docs_enabled: bool,
}

impl ApiClient {
    /// Get the current settings.
    pub async fn settings(&self) -> MrResult<Settings> {
        self.get_json("/api/settings").await
    }

    /// Save settings. The server creates missing folders.
    pub async fn save_settings(&self, settings: &Settings) -> MrResult<ActionResponse> {
        self.post_json("/api/settings", settings).await
    }
}
