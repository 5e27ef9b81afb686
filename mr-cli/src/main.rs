//! meetrec CLI - command-line front end for the meeting recorder.
//!
//! Logs in to the recorder backend, shows its status, starts and stops
//! recordings, edits server-side settings, and follows the live event
//! stream from the terminal.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use mr_core::config::{AppConfig, ConfigHandle};
use mr_core::error::MrResult;
use mr_core::logging;
use mr_core::Platform;

/// meetrec - control the meeting recorder from the terminal.
#[derive(Parser)]
#[command(
    name = "meetrec",
    version,
    about = "Meeting recorder CLI",
    long_about = "A command-line interface for the meeting recorder.\n\
                  Start and stop recordings of the active Zoom meeting and follow\n\
                  transcription and summary progress as it happens."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session.
    Login {
        /// Username (prompted when omitted).
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted when omitted).
        #[arg(short, long, env = "MEETREC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account on the recorder backend.
    Register {
        /// Username (prompted when omitted).
        #[arg(short, long)]
        username: Option<String>,
        /// Email address (prompted when omitted).
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the recorder status and the logged-in user.
    Status,
    /// Start recording the active meeting.
    Start {
        /// Meeting title (server picks one when omitted).
        #[arg(short, long)]
        title: Option<String>,
        /// Recording mode (defaults to `recording.mode` in the config).
        #[arg(short, long)]
        mode: Option<commands::recording::ModeArg>,
        /// Record audio only (recording_and_transcription mode only).
        #[arg(long)]
        audio_only: bool,
        /// Keep recording after the meeting ends.
        #[arg(long)]
        no_auto_stop: bool,
    },
    /// Stop the current recording.
    Stop,
    /// View and change the recorder's server-side settings.
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// View and change the local configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Follow the live event stream (Ctrl+C to stop).
    Watch {
        /// Event stream URL (overrides config and environment).
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> MrResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_config_path()?,
    };
    let mut config = AppConfig::load_or_default(&config_path)?;
    config.apply_env_overrides();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let _guard = match config
        .effective_log_dir()
        .and_then(|dir| logging::init_logging(&log_level, &dir, config.logging.json_output))
    {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging(&log_level);
            warn!("file logging disabled: {e}");
            None
        }
    };

    let config_handle = ConfigHandle::new(config);

    info!(
        "meetrec CLI v{} on {}",
        mr_core::constants::APP_VERSION,
        Platform::current()
    );

    let is_login = matches!(cli.command, Commands::Login { .. });

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(config_handle, username, password, cli.format).await
        }
        Commands::Register { username, email } => {
            commands::auth::register(config_handle, username, email, cli.format).await
        }
        Commands::Logout => commands::auth::logout(cli.format).await,
        Commands::Status => commands::status::run(config_handle, cli.format).await,
        Commands::Start {
            title,
            mode,
            audio_only,
            no_auto_stop,
        } => {
            let options = commands::recording::StartOptions {
                title,
                mode,
                audio_only,
                no_auto_stop,
            };
            commands::recording::start(config_handle, options, cli.format).await
        }
        Commands::Stop => commands::recording::stop(config_handle, cli.format).await,
        Commands::Settings { action } => {
            commands::settings::run(config_handle, action, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, &config_path, action, cli.format).await
        }
        Commands::Watch { url } => commands::watch::run(config_handle, url, cli.format).await,
    };

    if let Err(e) = &result {
        if commands::should_forget_session(e, is_login) {
            warn!("authentication rejected: {e}");
            commands::forget_session();
        }
    }
    result
}
