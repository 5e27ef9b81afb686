//! Start and stop commands.

use console::style;

use mr_api::{ActionResponse, StartRecordingRequest};
use mr_core::config::ConfigHandle;
use mr_core::constants::modes;
use mr_core::error::MrResult;

use super::{authenticated_client, print_json};
use crate::OutputFormat;

/// Recording mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Record the screen, then transcribe and summarize.
    Record,
    /// Capture audio for transcription only.
    Transcribe,
}

impl ModeArg {
    pub fn as_mode(&self) -> &'static str {
        match self {
            ModeArg::Record => modes::RECORDING_AND_TRANSCRIPTION,
            ModeArg::Transcribe => modes::TRANSCRIPTION_ONLY,
        }
    }
}

/// Flags of the start command; unset ones fall back to `[recording]` in the config.
pub struct StartOptions {
    pub title: Option<String>,
    pub mode: Option<ModeArg>,
    pub audio_only: bool,
    pub no_auto_stop: bool,
}

/// Build the start request from flags and configured defaults.
async fn build_request(
    config: &ConfigHandle,
    options: StartOptions,
) -> MrResult<StartRecordingRequest> {
    let defaults = config.read().await.recording.clone();
    let mode = match options.mode {
        Some(m) => m.as_mode().to_string(),
        None => defaults.mode,
    };

    let mut request = StartRecordingRequest::new(&mode)?
        .with_audio_only(options.audio_only || defaults.audio_only)
        .with_auto_stop(defaults.auto_stop && !options.no_auto_stop);
    if let Some(title) = options.title {
        request = request.with_title(title);
    }
    Ok(request)
}

fn outcome_tag(resp: &ActionResponse) -> console::StyledObject<&'static str> {
    if resp.is_success() {
        style("OK").green().bold()
    } else {
        style("WARN").yellow().bold()
    }
}

/// Run the start command.
pub async fn start(
    config: ConfigHandle,
    options: StartOptions,
    format: OutputFormat,
) -> MrResult<()> {
    let api = authenticated_client(&config).await?;
    let request = build_request(&config, options).await?.normalized();

    let status = api.status().await?;
    if !status.can_start() {
        // the server refuses too; say why before it does
        let reason = if status.recording {
            "A recording is already running.".to_string()
        } else {
            format!("No active Zoom meeting detected ({}).", status.zoom_status)
        };
        println!("{} {reason}", style("WARN").yellow().bold());
    }

    let resp = api.start_recording(&request).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": resp.status,
            "message": resp.message,
            "request": request,
        })),
        OutputFormat::Text => {
            let what = if request.mode == modes::TRANSCRIPTION_ONLY {
                "Transcription"
            } else {
                "Recording"
            };
            println!("{} {what} started. {}", outcome_tag(&resp), resp.message);
            if request.audio_only {
                println!("  Audio only.");
            }
            if request.auto_stop {
                println!("  Stops automatically when the meeting ends.");
            }
            println!("  Follow progress with `meetrec watch`.");
        }
    }
    Ok(())
}

/// Run the stop command.
pub async fn stop(config: ConfigHandle, format: OutputFormat) -> MrResult<()> {
    let api = authenticated_client(&config).await?;
    let resp = api.stop_recording().await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": resp.status,
            "message": resp.message,
        })),
        OutputFormat::Text => {
            println!("{} {}", outcome_tag(&resp), resp.message);
            println!("  Processing continues on the server; `meetrec watch` shows the results.");
        }
    }
    Ok(())
}
