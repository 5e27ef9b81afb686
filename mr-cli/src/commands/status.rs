//! Status command - show the recorder state and the logged-in user.

use console::style;

use mr_api::RecorderStatus;
use mr_core::config::ConfigHandle;
use mr_core::error::MrResult;
use mr_events::ZoomState;

use super::{create_api_client, print_json};
use crate::OutputFormat;

/// Run the status command.
pub async fn run(config: ConfigHandle, format: OutputFormat) -> MrResult<()> {
    let api = create_api_client(&config).await?;

    let start = std::time::Instant::now();
    let status = api.status().await?;
    let latency_ms = start.elapsed().as_millis();

    // `/api/status` is public, so a bad token only shows up here
    let user = if api.has_token().await {
        Some(api.me().await?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_value(&status)?;
            json["server"] = serde_json::json!(api.base_url());
            json["latency_ms"] = serde_json::json!(latency_ms);
            json["user"] = serde_json::to_value(&user)?;
            print_json(&json);
        }
        OutputFormat::Text => {
            println!("{}", style("Server").bold().underlined());
            println!("  Address:   {}", api.base_url());
            println!("  Latency:   {latency_ms}ms");
            match &user {
                Some(u) if u.email.is_empty() => println!("  User:      {}", u.username),
                Some(u) => println!("  User:      {} <{}>", u.username, u.email),
                None => println!("  User:      {}", style("not logged in").yellow()),
            }

            println!();
            print_recorder(&status);
        }
    }

    Ok(())
}

fn print_recorder(status: &RecorderStatus) {
    println!("{}", style("Recorder").bold().underlined());

    let zoom = match ZoomState::from_label(&status.zoom_status) {
        ZoomState::InMeeting => style(status.zoom_status.as_str()).green(),
        ZoomState::Running => style(status.zoom_status.as_str()).yellow(),
        _ => style(status.zoom_status.as_str()).dim(),
    };
    println!("  Zoom:      {zoom}");
    println!(
        "  Meeting:   {}",
        if status.meeting_active {
            style("active").green()
        } else {
            style("inactive").dim()
        }
    );

    if status.recording {
        println!("  State:     {}", style("recording").red().bold());
        if let Some(title) = &status.meeting_title {
            println!("  Title:     {title}");
        }
        if let Some(started) = status.started_at() {
            println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("  Elapsed:   {}", status.elapsed_hms());
    } else {
        println!("  State:     {}", style("idle").cyan());
        if !status.meeting_active {
            println!(
                "  {}",
                style("Recording can start once a Zoom meeting is detected.").dim()
            );
        }
    }
}
