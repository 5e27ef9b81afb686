//! API endpoint modules organized by category.
//!
//! Each module adds typed methods to `ApiClient` for a group of related
//! backend endpoints.

pub mod auth;
pub mod recording;
pub mod settings;
