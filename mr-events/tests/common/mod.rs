//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;

use mr_core::error::{MrError, MrResult};
use mr_events::{Connection, EventHandler, LogLevel, StatusSnapshot, Transport};

/// Everything the client did to a `RecordingHandler`, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open,
    Close,
    Error(String),
    Log(LogLevel, String),
    Status(StatusSnapshot),
    RecordingStarted(String),
    Summary(String),
    DocumentLink(String),
    Unknown(String),
}

/// Handler that records every callback.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Call>>,
    changed: Notify,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        self.changed.notify_one();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `n` calls were recorded.
    pub async fn wait_for_calls(&self, n: usize) -> Vec<Call> {
        let wait = async {
            loop {
                let calls = self.calls();
                if calls.len() >= n {
                    return calls;
                }
                self.changed.notified().await;
            }
        };
        tokio::time::timeout(Duration::from_secs(60), wait)
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {n} calls, got {:?}", self.calls()))
    }
}

impl EventHandler for RecordingHandler {
    fn on_open(&self) {
        self.push(Call::Open);
    }
    fn on_close(&self) {
        self.push(Call::Close);
    }
    fn on_error(&self, error: &MrError) {
        self.push(Call::Error(error.to_string()));
    }
    fn on_log(&self, level: LogLevel, message: &str) {
        self.push(Call::Log(level, message.to_string()));
    }
    fn on_status(&self, status: &StatusSnapshot) {
        self.push(Call::Status(status.clone()));
    }
    fn on_recording_started(&self, meeting_title: &str, _mode: Option<&str>) {
        self.push(Call::RecordingStarted(meeting_title.to_string()));
    }
    fn on_summary(&self, summary: &str) {
        self.push(Call::Summary(summary.to_string()));
    }
    fn on_document_link(&self, url: &str, _title: Option<&str>) {
        self.push(Call::DocumentLink(url.to_string()));
    }
    fn on_unknown(&self, kind: &str, _payload: &serde_json::Value) {
        self.push(Call::Unknown(kind.to_string()));
    }
}

/// A connection attempt observed by `ScriptedTransport`.
pub enum Attempt {
    Opened(ServerEnd),
    Refused { at: Instant },
}

impl Attempt {
    pub fn at(&self) -> Instant {
        match self {
            Attempt::Opened(end) => end.at,
            Attempt::Refused { at } => *at,
        }
    }

    pub fn opened(self) -> ServerEnd {
        match self {
            Attempt::Opened(end) => end,
            Attempt::Refused { .. } => panic!("expected an opened connection, got a refusal"),
        }
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, Attempt::Refused { .. })
    }
}

enum Frame {
    Text(String),
    Fail(String),
}

/// Server side of a scripted connection. Dropping it ends the connection.
pub struct ServerEnd {
    pub at: Instant,
    tx: mpsc::UnboundedSender<Frame>,
    closed_by_client: Arc<AtomicBool>,
}

impl ServerEnd {
    pub fn send(&self, text: &str) {
        let _ = self.tx.send(Frame::Text(text.to_string()));
    }

    /// Break the connection with a transport error.
    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Frame::Fail(reason.to_string()));
    }

    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

/// In-memory transport that reports every connect to the test.
pub struct ScriptedTransport {
    attempts_tx: mpsc::UnboundedSender<Attempt>,
    refuse: AtomicU32,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Attempt>) {
        let (attempts_tx, attempts_rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            attempts_tx,
            refuse: AtomicU32::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
        });
        (transport, attempts_rx)
    }

    /// Refuse the next `n` connects.
    pub fn refuse_next(&self, n: u32) {
        self.refuse.store(n, Ordering::SeqCst);
    }

    /// Connections currently open.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open connections seen.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, _url: &str) -> MrResult<Box<dyn Connection>> {
        let at = Instant::now();

        let refused = self
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            let _ = self.attempts_tx.send(Attempt::Refused { at });
            return Err(MrError::WebSocket("connection refused".into()));
        }

        let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(now_live, Ordering::SeqCst);

        let (tx, rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));
        let _ = self.attempts_tx.send(Attempt::Opened(ServerEnd {
            at,
            tx,
            closed_by_client: closed_by_client.clone(),
        }));

        Ok(Box::new(ScriptedConnection {
            rx,
            live: self.live.clone(),
            closed_by_client,
        }))
    }
}

struct ScriptedConnection {
    rx: mpsc::UnboundedReceiver<Frame>,
    live: Arc<AtomicUsize>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn next_text(&mut self) -> Option<MrResult<String>> {
        match self.rx.recv().await? {
            Frame::Text(text) => Some(Ok(text)),
            Frame::Fail(reason) => Some(Err(MrError::WebSocket(reason))),
        }
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Receive the next attempt, failing the test if none arrives.
pub async fn next_attempt(rx: &mut mpsc::UnboundedReceiver<Attempt>) -> Attempt {
    tokio::time::timeout(Duration::from_secs(60), rx.recv())
        .await
        .expect("timed out waiting for a connection attempt")
        .expect("transport dropped")
}

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
