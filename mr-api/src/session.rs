//! Persisted login session.
//!
//! The bearer token and username from the last successful login are kept
//! in `session.toml` under the platform data directory, so later commands
//! can reuse them. Logging out deletes the file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mr_core::constants::SESSION_FILE_NAME;
use mr_core::error::{MrError, MrResult};
use mr_core::platform::Platform;

use crate::endpoints::auth::LoginResponse;

/// A stored login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub username: String,
    #[serde(default)]
    pub logged_in_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Session for a fresh login.
    pub fn from_login(resp: &LoginResponse) -> Self {
        Self {
            access_token: resp.access_token.clone(),
            token_type: resp.token_type.clone(),
            username: resp.username.clone(),
            logged_in_at: Some(Utc::now()),
        }
    }

    /// Default session file location.
    pub fn default_path() -> MrResult<PathBuf> {
        Ok(Platform::data_dir()?.join(SESSION_FILE_NAME))
    }

    /// Load the session at `path`. `Ok(None)` when nobody is logged in.
    pub fn load(path: &Path) -> MrResult<Option<Self>> {
        if !path.exists() {
            debug!("no session at {}", path.display());
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let session: Session = toml::from_str(&contents)
            .map_err(|e| MrError::Config(format!("corrupt session file {}: {e}", path.display())))?;
        Ok(Some(session))
    }

    /// Load the session from the default location.
    pub fn load_default() -> MrResult<Option<Self>> {
        Self::load(&Self::default_path()?)
    }

    /// Save to `path`, readable by the current user only.
    pub fn save(&self, path: &Path) -> MrResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MrError::Serialization(e.to_string()))?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;

        // `mode` only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents.as_bytes())?;

        info!("session for {} saved to {}", self.username, path.display());
        Ok(())
    }

    /// Delete the session at `path`. Returns whether there was one.
    pub fn clear(path: &Path) -> MrResult<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("session at {} removed", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the session at the default location.
    pub fn clear_default() -> MrResult<bool> {
        Self::clear(&Self::default_path()?)
    }
}
