//! End-to-end event delivery through the client and a scripted transport.

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{next_attempt, Call, RecordingHandler, ScriptedTransport};
use mr_events::{ConnectionState, EventClient, LogLevel, ReconnectPolicy, ZoomState};

fn start() -> (
    EventClient,
    std::sync::Arc<RecordingHandler>,
    tokio::sync::mpsc::UnboundedReceiver<common::Attempt>,
) {
    let (transport, attempts) = ScriptedTransport::new();
    let handler = RecordingHandler::new();
    let client = EventClient::connect(
        "ws://recorder.test/ws",
        transport,
        handler.clone(),
        ReconnectPolicy::default(),
    );
    (client, handler, attempts)
}

#[tokio::test(start_paused = true)]
async fn test_status_update_then_server_drop() {
    let (client, handler, mut attempts) = start();
    let server = next_attempt(&mut attempts).await.opened();

    server.send(
        r#"{"type":"status_update","data":{"recording":false,"zoom_status":"会議中","meeting_active":true}}"#,
    );
    let calls = handler.wait_for_calls(2).await;
    let Call::Status(status) = &calls[1] else {
        panic!("expected a status call, got {calls:?}");
    };
    assert_eq!(status.recording, Some(false));
    assert!(status.meeting_active);
    assert_eq!(status.zoom_state(), ZoomState::InMeeting);
    assert!(status.can_record());

    let dropped_at = Instant::now();
    drop(server);
    let next = next_attempt(&mut attempts).await;
    assert_eq!(next.at() - dropped_at, Duration::from_millis(3000));

    client.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_summary_complete_only_shows_summary() {
    let (client, handler, mut attempts) = start();
    let server = next_attempt(&mut attempts).await.opened();

    server.send(r#"{"type":"summary_complete","summary":"S"}"#);
    let calls = handler.wait_for_calls(2).await;
    assert_eq!(calls, vec![Call::Open, Call::Summary("S".into())]);

    client.close().await;
    assert_eq!(handler.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_type_changes_nothing_else() {
    let (client, handler, mut attempts) = start();
    let server = next_attempt(&mut attempts).await.opened();

    server.send(r#"{"type":"unknown_x","foo":1}"#);
    server.send(r#"{"type":"recording_stopped","message":"done"}"#);
    let calls = handler.wait_for_calls(3).await;
    assert_eq!(
        calls,
        vec![
            Call::Open,
            Call::Unknown("unknown_x".into()),
            Call::Log(LogLevel::Info, "done".into()),
        ]
    );
    assert_eq!(client.state(), ConnectionState::Connected);

    client.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_keeps_connection_alive() {
    let (client, handler, mut attempts) = start();
    let server = next_attempt(&mut attempts).await.opened();

    server.send("this is not json");
    server.send(r#"{"message":"no type"}"#);
    server.send(r#"{"type":"summary_complete","summary":"after garbage"}"#);

    let calls = handler.wait_for_calls(4).await;
    assert_eq!(calls[0], Call::Open);
    assert!(matches!(&calls[1], Call::Log(LogLevel::Error, msg) if msg.starts_with("could not decode event")));
    assert!(matches!(&calls[2], Call::Log(LogLevel::Error, _)));
    assert_eq!(calls[3], Call::Summary("after garbage".into()));
    assert_eq!(client.state(), ConnectionState::Connected);

    // still the first connection
    assert!(attempts.try_recv().is_err());

    client.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_events_in_order() {
    let (client, handler, mut attempts) = start();
    let server = next_attempt(&mut attempts).await.opened();

    for frame in [
        r#"{"type":"recording_started","meeting_title":"Weekly sync","mode":"transcription_only"}"#,
        r#"{"type":"auto_stopped","message":"meeting ended"}"#,
        r#"{"type":"transcription_complete","duration":12.6}"#,
        r#"{"type":"summary_complete","summary":"notes"}"#,
        r#"{"type":"document_saved","title":"Weekly sync","path":"/docs/weekly.md"}"#,
        r#"{"type":"google_docs_created","url":"https://docs.example.com/d/1"}"#,
        r#"{"type":"processing_complete","message":"all done"}"#,
        r#"{"type":"error","message":"quota exceeded"}"#,
    ] {
        server.send(frame);
    }

    let calls = handler.wait_for_calls(9).await;
    assert_eq!(
        calls,
        vec![
            Call::Open,
            Call::RecordingStarted("Weekly sync".into()),
            Call::Log(LogLevel::Success, "meeting ended".into()),
            Call::Log(LogLevel::Success, "transcription complete (13s)".into()),
            Call::Summary("notes".into()),
            Call::Log(LogLevel::Success, "document saved: Weekly sync".into()),
            Call::DocumentLink("https://docs.example.com/d/1".into()),
            Call::Log(LogLevel::Success, "all done".into()),
            Call::Log(LogLevel::Error, "quota exceeded".into()),
        ]
    );

    client.close().await;
}
