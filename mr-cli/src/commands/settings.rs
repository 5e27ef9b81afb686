//! Settings commands - the recorder's server-side folders and integrations.

use clap::Subcommand;
use console::style;

use mr_api::Settings;
use mr_core::config::ConfigHandle;
use mr_core::error::MrResult;

use super::{authenticated_client, print_json};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current settings.
    Show,
    /// Change one or more settings; the rest keep their current value.
    Set {
        /// Folder recordings are written to.
        #[arg(long)]
        recording_folder: Option<String>,
        /// Folder minutes documents are written to.
        #[arg(long)]
        document_folder: Option<String>,
        /// Also create a Google Docs copy of each document.
        #[arg(long)]
        google_docs: Option<bool>,
    },
}

/// Apply the given changes. Returns whether anything changed.
fn apply_changes(
    settings: &mut Settings,
    recording_folder: Option<String>,
    document_folder: Option<String>,
    google_docs: Option<bool>,
) -> bool {
    let before = settings.clone();
    if let Some(folder) = recording_folder {
        settings.recording_folder = folder;
    }
    if let Some(folder) = document_folder {
        settings.document_folder = folder;
    }
    if let Some(enabled) = google_docs {
        settings.google_docs_enabled = enabled;
    }
    *settings != before
}

fn print_settings_text(settings: &Settings) {
    println!("{}", style("Recorder settings").bold().underlined());
    println!("  recording_folder     {}", settings.recording_folder);
    println!("  document_folder      {}", settings.document_folder);
    println!(
        "  google_docs_enabled  {}",
        if settings.google_docs_enabled {
            style("yes").green()
        } else {
            style("no").dim()
        }
    );
}

pub async fn run(config: ConfigHandle, action: SettingsAction, format: OutputFormat) -> MrResult<()> {
    let api = authenticated_client(&config).await?;

    match action {
        SettingsAction::Show => {
            let settings = api.settings().await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::to_value(&settings)?),
                OutputFormat::Text => print_settings_text(&settings),
            }
        }
        SettingsAction::Set {
            recording_folder,
            document_folder,
            google_docs,
        } => {
            let mut settings = api.settings().await?;
            if !apply_changes(&mut settings, recording_folder, document_folder, google_docs) {
                println!("Nothing to change.");
                return Ok(());
            }

            let resp = api.save_settings(&settings).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "settings": settings,
                    "message": resp.message,
                })),
                OutputFormat::Text => {
                    println!("{} {}", style("SET").green().bold(), resp.message);
                    print_settings_text(&settings);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Settings {
        Settings {
            recording_folder: "/rec".into(),
            document_folder: "/docs".into(),
            google_docs_enabled: false,
        }
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut settings = current();
        assert!(apply_changes(&mut settings, None, Some("/minutes".into()), None));
        assert_eq!(settings.recording_folder, "/rec");
        assert_eq!(settings.document_folder, "/minutes");
        assert!(!settings.google_docs_enabled);
    }

    #[test]
    fn test_no_change_detected() {
        let mut settings = current();
        assert!(!apply_changes(&mut settings, None, None, None));
        assert!(!apply_changes(&mut settings, Some("/rec".into()), None, Some(false)));
    }
}
