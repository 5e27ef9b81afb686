//! Reconnecting event client.
//!
//! `EventClient` owns one background task. The task holds the only
//! connection, feeds every text frame through decode + dispatch, and after
//! the connection ends waits out the reconnect delay before opening the
//! next one. Closing the client stops the task, including a pending
//! reconnect.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use mr_core::error::MrResult;

use crate::events::{EventKind, ServerMessage};
use crate::handler::{dispatch, EventHandler, LogLevel};
use crate::policy::ReconnectPolicy;
use crate::transport::{Connection, Transport, WsTransport};

/// Connection state of an `EventClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected yet.
    Disconnected,
    /// Opening a connection.
    Connecting,
    /// Connected and receiving events.
    Connected,
    /// Connection lost, waiting for the reconnect delay.
    Reconnecting,
    /// Gave up after the attempt cap; will not reconnect.
    Failed,
    /// Closed by the owner; will not reconnect.
    Closed,
}

impl ConnectionState {
    /// Whether the client task has stopped for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Failed => write!(f, "failed"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Client for the recorder's event stream.
///
/// The connection is opened eagerly by `connect`; there is never more than
/// one open connection, and a reconnect is only scheduled once the previous
/// connection has fully ended. Dropping the client has the same effect as
/// `close` without waiting for the task.
pub struct EventClient {
    url: String,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventClient {
    /// Start a client against `url`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(
        url: impl Into<String>,
        transport: Arc<dyn Transport>,
        handler: Arc<dyn EventHandler>,
        policy: ReconnectPolicy,
    ) -> Self {
        let url = url.into();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = Worker {
            url: url.clone(),
            transport,
            handler,
            policy,
            state_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(worker.run());

        Self {
            url,
            state_rx,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Start a client over the default WebSocket transport.
    pub fn connect_ws(
        url: impl Into<String>,
        handler: Arc<dyn EventHandler>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self::connect(url, Arc::new(WsTransport::default()), handler, policy)
    }

    /// The URL this client connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Stop the client: close the open connection or cancel the pending
    /// reconnect, and wait for the background task to finish.
    ///
    /// Calling this more than once is harmless.
    pub async fn close(&self) {
        self.shutdown_tx.send_replace(true);

        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("event client task ended abnormally: {e}");
            }
            info!("event client closed");
        }
    }
}

impl Drop for EventClient {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}

/// Decode one raw frame and hand it to `handler`.
///
/// Decode failures are logged and reported through `on_log`; they never
/// propagate. Returns the tag of the dispatched message.
pub fn handle_frame(handler: &dyn EventHandler, raw: &str) -> Option<EventKind> {
    match ServerMessage::decode(raw) {
        Ok(message) => {
            let kind = message.kind();
            if let EventKind::Unknown(tag) = &kind {
                debug!("ignoring unknown event type {tag}");
            } else {
                debug!("event: {kind}");
            }
            dispatch(handler, &message);
            Some(kind)
        }
        Err(e) => {
            warn!("dropping undecodable event: {e}");
            handler.on_log(LogLevel::Error, &format!("could not decode event: {e}"));
            None
        }
    }
}

struct Worker {
    url: String,
    transport: Arc<dyn Transport>,
    handler: Arc<dyn EventHandler>,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
}

/// Why `pump` returned.
enum PumpExit {
    PeerClosed,
    Shutdown,
}

impl Worker {
    fn set_state(&self, new_state: ConnectionState) {
        self.state_tx.send_if_modified(|state| {
            if *state == new_state {
                return false;
            }
            debug!("event client state: {} -> {}", *state, new_state);
            *state = new_state;
            true
        });
    }

    async fn run(mut self) {
        // consecutive attempts since the last successful open
        let mut attempt: u32 = 0;

        loop {
            self.set_state(ConnectionState::Connecting);

            let opened = tokio::select! {
                result = self.transport.connect(&self.url) => Some(result),
                _ = shutdown_requested(&mut self.shutdown) => None,
            };
            let Some(result) = opened else { break };

            if let Some(exit) = self.serve(result).await {
                match exit {
                    PumpExit::Shutdown => break,
                    PumpExit::PeerClosed => attempt = 0,
                }
            }

            self.handler.on_close();

            attempt += 1;
            let Some(delay) = self.policy.delay_for(attempt) else {
                error!(
                    "giving up on {} after {} reconnection attempt(s)",
                    self.url,
                    attempt - 1
                );
                self.set_state(ConnectionState::Failed);
                return;
            };

            self.set_state(ConnectionState::Reconnecting);
            warn!(
                "event stream disconnected, reconnecting in {:.1}s (attempt {attempt})",
                delay.as_secs_f64()
            );

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown_requested(&mut self.shutdown) => {
                    info!("reconnection cancelled by close request");
                    break;
                }
            }
        }

        self.set_state(ConnectionState::Closed);
    }

    /// Run one connection to its end. Returns `None` when it never opened.
    async fn serve(&mut self, result: MrResult<Box<dyn Connection>>) -> Option<PumpExit> {
        let mut conn = match result {
            Ok(conn) => conn,
            Err(e) => {
                warn!("could not open event stream {}: {e}", self.url);
                self.handler.on_error(&e);
                return None;
            }
        };

        self.set_state(ConnectionState::Connected);
        info!("connected to event stream {}", self.url);
        self.handler.on_open();

        let exit = self.pump(conn.as_mut()).await;
        if let PumpExit::Shutdown = exit {
            conn.close().await;
        }
        Some(exit)
    }

    async fn pump(&mut self, conn: &mut dyn Connection) -> PumpExit {
        loop {
            tokio::select! {
                frame = conn.next_text() => match frame {
                    Some(Ok(text)) => {
                        handle_frame(self.handler.as_ref(), &text);
                    }
                    Some(Err(e)) => {
                        warn!("event stream error: {e}");
                        self.handler.on_error(&e);
                        return PumpExit::PeerClosed;
                    }
                    None => {
                        debug!("event stream ended");
                        return PumpExit::PeerClosed;
                    }
                },
                _ = shutdown_requested(&mut self.shutdown) => return PumpExit::Shutdown,
            }
        }
    }
}

/// Resolves once a close was requested or the client was dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    // an Err means the sender is gone, which only happens when the client was dropped
    let _ = shutdown.wait_for(|stop| *stop).await;
}
