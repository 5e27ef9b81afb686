//! meetrec core - foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other meetrec crates:
//! - Application configuration (server URLs, event client tuning, recording defaults)
//! - Global error type covering all error categories
//! - Structured logging with tracing
//! - Platform data/config directories
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{MrError, MrResult};
pub use logging::init_logging;
pub use platform::Platform;
