//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod recording;
pub mod settings;
pub mod status;
pub mod watch;

use console::style;
use tracing::{debug, warn};

use mr_api::{ApiClient, Session};
use mr_core::config::ConfigHandle;
use mr_core::error::{MrError, MrResult};

/// Helper to create an API client from config, carrying the stored token if any.
pub async fn create_api_client(config: &ConfigHandle) -> MrResult<ApiClient> {
    let server_config = config.read().await.server.clone();
    let client = ApiClient::new(&server_config)?;
    match Session::load_default()? {
        Some(session) => {
            debug!("using stored session for {}", session.username);
            Ok(client.with_token(session.access_token))
        }
        None => Ok(client),
    }
}

/// Like `create_api_client`, but fails with `NotLoggedIn` when there is no session.
pub async fn authenticated_client(config: &ConfigHandle) -> MrResult<ApiClient> {
    let client = create_api_client(config).await?;
    if !client.has_token().await {
        return Err(MrError::NotLoggedIn);
    }
    Ok(client)
}

/// Whether a failed command means the stored session must go.
///
/// A rejected login says nothing about the session already on disk.
pub fn should_forget_session(error: &MrError, is_login: bool) -> bool {
    error.is_auth() && !is_login
}

/// Drop the stored session after the server rejected it.
pub fn forget_session() {
    match Session::clear_default() {
        Ok(true) => eprintln!(
            "{} Session expired or invalid; run `meetrec login` again.",
            style("AUTH").yellow().bold()
        ),
        Ok(false) => eprintln!(
            "{} Not logged in; run `meetrec login` first.",
            style("AUTH").yellow().bold()
        ),
        Err(e) => warn!("could not remove session file: {e}"),
    }
}

/// Map a dialoguer prompt failure into the workspace error.
pub fn prompt_error(e: dialoguer::Error) -> MrError {
    MrError::Internal(format!("prompt failed: {e}"))
}

/// Print a value as pretty JSON.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}
