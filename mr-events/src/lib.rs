//! meetrec events - reconnecting client for the recorder's event stream.
//!
//! This crate provides the WebSocket event client that handles:
//! - Decoding `type`-tagged JSON messages into a typed `ServerMessage`
//! - Dispatching each message to an `EventHandler` callback
//! - Automatic reconnection after every close, with a fixed delay
//! - Explicit shutdown that cancels any pending reconnect
//! - Resolving the socket URL from an explicit base or the page origin

pub mod address;
pub mod client;
pub mod events;
pub mod handler;
pub mod policy;
pub mod transport;

// Re-export key types
pub use address::resolve_ws_url;
pub use client::{ConnectionState, EventClient};
pub use events::{
    DecodeError, DocumentSaved, EventKind, GoogleDocsCreated, Notice, ProcessingComplete,
    RecordingStarted, ServerMessage, StatusSnapshot, SummaryComplete, TranscriptionComplete,
    ZoomState,
};
pub use handler::{dispatch, EventHandler, LogLevel};
pub use policy::ReconnectPolicy;
pub use transport::{Connection, Transport, WsTransport};
