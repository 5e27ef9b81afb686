//! Login, registration and logout.

use console::style;
use dialoguer::{Input, Password};

use mr_api::Session;
use mr_core::config::ConfigHandle;
use mr_core::error::MrResult;

use super::{create_api_client, print_json, prompt_error};
use crate::OutputFormat;

fn prompt_username(username: Option<String>) -> MrResult<String> {
    match username {
        Some(u) => Ok(u),
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_error),
    }
}

/// Run the login command.
pub async fn login(
    config: ConfigHandle,
    username: Option<String>,
    password: Option<String>,
    format: OutputFormat,
) -> MrResult<()> {
    let username = prompt_username(username)?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_error)?,
    };

    let api = create_api_client(&config).await?;
    let resp = api.login(&username, &password).await?;

    let session = Session::from_login(&resp);
    let path = Session::default_path()?;
    session.save(&path)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "username": session.username,
            "session_file": path.display().to_string(),
        })),
        OutputFormat::Text => println!(
            "{} Logged in as {}",
            style("OK").green().bold(),
            style(&session.username).bold()
        ),
    }
    Ok(())
}

/// Run the register command.
pub async fn register(
    config: ConfigHandle,
    username: Option<String>,
    email: Option<String>,
    format: OutputFormat,
) -> MrResult<()> {
    let username = prompt_username(username)?;
    let email = match email {
        Some(e) => e,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_error)?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(prompt_error)?;

    let api = create_api_client(&config).await?;
    let resp = api.register(&username, &password, &email).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "username": username,
            "status": resp.status,
            "message": resp.message,
        })),
        OutputFormat::Text => {
            println!("{} {}", style("OK").green().bold(), resp.message);
            println!("  Run `meetrec login -u {username}` to log in.");
        }
    }
    Ok(())
}

/// Run the logout command.
pub async fn logout(format: OutputFormat) -> MrResult<()> {
    let removed = Session::clear_default()?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "logged_out": removed })),
        OutputFormat::Text => {
            if removed {
                println!("{} Logged out.", style("OK").green().bold());
            } else {
                println!("Not logged in.");
            }
        }
    }
    Ok(())
}
