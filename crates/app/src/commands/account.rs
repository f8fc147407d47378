//! Account and session commands

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ledger_core::{spawn_session_sweeper, ClientInfo, ProfileUpdate, SettingsUpdate};

use crate::cli::{ProfileCommand, SettingsCommand};
use crate::state::AppState;

fn client() -> ClientInfo {
    ClientInfo {
        user_agent: Some(concat!("ledger-cli/", env!("CARGO_PKG_VERSION")).to_string()),
        origin: None,
    }
}

fn prompt(label: &str) -> Result<String> {
    rpassword::prompt_password(label).context("Failed to read password")
}

pub fn register(state: &mut AppState, username: &str, name: &str) -> Result<()> {
    let password = prompt("Password: ")?;
    if prompt("Repeat password: ")? != password {
        bail!("Passwords do not match");
    }

    let (user, session) = state
        .ledger()
        .register(username, &password, name, client())?;
    state.replace_token(&session.token)?;
    println!("Welcome, {}! Signed in as {}.", user.full_name, user.username);
    Ok(())
}

pub fn login(state: &mut AppState, username: &str) -> Result<()> {
    let password = prompt("Password: ")?;
    let (user, session) = state.ledger().login(username, &password, client())?;
    state.replace_token(&session.token)?;
    println!(
        "Signed in as {} until {}.",
        user.username,
        session.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub fn logout(state: &AppState, all: bool) -> Result<()> {
    let token = match state.token() {
        Ok(token) => token,
        Err(_) => {
            println!("Not signed in.");
            return Ok(());
        }
    };

    if all {
        let ended = state.ledger().logout_all(&token)?;
        println!("Ended {} session(s).", ended);
    } else {
        state.ledger().logout(&token)?;
        println!("Signed out.");
    }
    state.clear_token()?;
    Ok(())
}

pub fn whoami(state: &AppState) -> Result<()> {
    let user = state.ledger().profile(&state.token()?)?;
    println!("{} ({})", user.username, user.full_name);
    println!("  id:          {}", user.id);
    println!("  member since {}", user.created_at.format("%Y-%m-%d"));
    if let Some(last) = user.last_login {
        println!("  last login   {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub fn passwd(state: &AppState) -> Result<()> {
    let token = state.token()?;
    let current = prompt("Current password: ")?;
    let new = prompt("New password: ")?;
    if prompt("Repeat new password: ")? != new {
        bail!("Passwords do not match");
    }
    state.ledger().change_password(&token, &current, &new)?;
    println!("Password changed.");
    Ok(())
}

pub fn profile(state: &AppState, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Set { name } => {
            let user = state
                .ledger()
                .update_profile(&state.token()?, ProfileUpdate { full_name: name })?;
            println!("Profile updated: {}", user.full_name);
        }
    }
    Ok(())
}

pub fn settings(state: &AppState, cmd: SettingsCommand) -> Result<()> {
    let token = state.token()?;
    let settings = match cmd {
        SettingsCommand::Show => state.ledger().settings(&token)?,
        SettingsCommand::Set {
            currency,
            theme,
            week_starts_on_monday,
        } => state.ledger().update_settings(
            &token,
            SettingsUpdate {
                currency,
                theme,
                week_starts_on_monday,
            },
        )?,
    };
    println!("currency               {}", settings.currency);
    println!("theme                  {}", settings.theme);
    println!("week starts on monday  {}", settings.week_starts_on_monday);
    Ok(())
}

pub fn delete_account(state: &AppState) -> Result<()> {
    let token = state.token()?;
    let password = prompt("Password to confirm deletion: ")?;
    state.ledger().delete_account(&token, &password)?;
    state.clear_token()?;
    println!("Account deleted.");
    Ok(())
}

pub fn sweep(state: &AppState, every: Option<u64>) -> Result<()> {
    let sessions = Arc::clone(state.ledger().sessions());
    let Some(secs) = every else {
        let removed = sessions.sweep_expired()?;
        println!("Removed {} expired session(s).", removed);
        return Ok(());
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async move {
        let handle = spawn_session_sweeper(sessions, Duration::from_secs(secs.max(1)));
        tokio::signal::ctrl_c().await?;
        handle.abort();
        Ok::<_, std::io::Error>(())
    })?;
    Ok(())
}
