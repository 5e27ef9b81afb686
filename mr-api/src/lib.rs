//! meetrec API - HTTP client for the meeting recorder REST API.
//!
//! This crate provides a typed client for the backend's auth, status,
//! recording and settings endpoints. It handles bearer authentication,
//! mapping of `detail` error bodies, retry with exponential backoff for
//! idempotent requests, and persistence of the login session.

pub mod client;
pub mod endpoints;
pub mod response;
pub mod session;

// Re-export key types
pub use client::{resolve_api_base, ApiClient, RetryConfig};
pub use endpoints::auth::{LoginResponse, UserInfo};
pub use endpoints::recording::{RecorderStatus, StartRecordingRequest};
pub use endpoints::settings::Settings;
pub use response::ActionResponse;
pub use session::Session;
