//! Where meetrec keeps its files on each OS.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{MrError, MrResult};

/// Operating system the binary was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Session and log files: `~/.local/share/meetrec` on Linux,
    /// `~/Library/Application Support/meetrec` on macOS, `%APPDATA%\meetrec` on Windows.
    pub fn data_dir() -> MrResult<PathBuf> {
        app_dir(dirs::data_dir(), "data")
    }

    /// `config.toml`: `~/.config/meetrec` on Linux; same as `data_dir` elsewhere.
    pub fn config_dir() -> MrResult<PathBuf> {
        app_dir(dirs::config_dir(), "config")
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
        }
    }
}

fn app_dir(base: Option<PathBuf>, kind: &str) -> MrResult<PathBuf> {
    base.map(|dir| dir.join(APP_NAME))
        .ok_or_else(|| MrError::Config(format!("no {kind} directory for this user")))
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_dir_appends_name() {
        let dir = app_dir(Some(PathBuf::from("/home/u/.config")), "config").unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.config/meetrec"));
    }

    #[test]
    fn test_missing_home_is_config_error() {
        let err = app_dir(None, "data").unwrap_err();
        assert!(matches!(err, MrError::Config(_)));
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::MacOs.to_string(), "macOS");
        assert_eq!(Platform::current().to_string(), Platform::current().name());
    }
}
