//! Transport seam between the event client and the network.
//!
//! The client only needs two things from a transport: open a connection to
//! a URL, and read text frames from it until it ends. `WsTransport` does
//! this over `tokio-tungstenite`; tests plug in scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use mr_core::error::{MrError, MrResult};

const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Opens connections to the event stream.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> MrResult<Box<dyn Connection>>;
}

/// One open connection.
#[async_trait]
pub trait Connection: Send {
    /// Next text frame.
    ///
    /// `None` means the connection ended. `Some(Err(_))` is a transport
    /// failure; the connection is unusable afterwards.
    async fn next_text(&mut self) -> Option<MrResult<String>>;

    /// Close the connection from our side.
    async fn close(&mut self);
}

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsTransport {
    /// Create a transport with a custom handshake timeout.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> MrResult<Box<dyn Connection>> {
        debug!("opening websocket {url}");
        let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| {
                MrError::Timeout(format!(
                    "websocket handshake with {url} took longer than {:?}",
                    self.connect_timeout
                ))
            })?
            .map_err(|e| MrError::WebSocket(format!("failed to connect to {url}: {e}")))?;
        debug!("websocket handshake complete (status {})", response.status());

        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn next_text(&mut self) -> Option<MrResult<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    debug!("server closed websocket: {frame:?}");
                    return None;
                }
                Ok(other) => {
                    // ping/pong are answered by tungstenite; binary frames carry nothing for us
                    trace!("ignoring non-text frame ({} bytes)", other.len());
                }
                Err(e) => return Some(Err(MrError::WebSocket(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("websocket close failed: {e}");
        }
        // drain until the peer acknowledges the close
        let drain = async { while let Some(Ok(_)) = self.stream.next().await {} };
        if tokio::time::timeout(CLOSE_DRAIN_TIMEOUT, drain).await.is_err() {
            debug!("peer did not acknowledge close within {CLOSE_DRAIN_TIMEOUT:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_refused_is_websocket_error() {
        // Bind and drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = WsTransport::with_connect_timeout(Duration::from_secs(2));
        let err = match transport.connect(&format!("ws://127.0.0.1:{port}/ws")).await {
            Ok(_) => panic!("expected connection failure"),
            Err(e) => e,
        };
        assert!(matches!(err, MrError::WebSocket(_) | MrError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_error() {
        let transport = WsTransport::default();
        assert!(transport.connect("not a url").await.is_err());
    }
}
