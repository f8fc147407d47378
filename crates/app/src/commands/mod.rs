//! Command handlers

mod account;
mod finance;

use anyhow::Result;

use crate::cli::Command;
use crate::state::AppState;

pub fn run(command: Command, state: &mut AppState) -> Result<()> {
    let result = match command {
        Command::Register { username, name } => account::register(state, &username, &name),
        Command::Login { username } => account::login(state, &username),
        Command::Logout { all } => account::logout(state, all),
        Command::Whoami => account::whoami(state),
        Command::Passwd => account::passwd(state),
        Command::Profile(cmd) => account::profile(state, cmd),
        Command::Settings(cmd) => account::settings(state, cmd),
        Command::DeleteAccount => account::delete_account(state),
        Command::Sweep { every } => account::sweep(state, every),
        Command::Tx(cmd) => finance::tx(state, cmd),
        Command::Debt(cmd) => finance::debt(state, cmd),
        Command::Goal(cmd) => finance::goal(state, cmd),
        Command::Budget(cmd) => finance::budget(state, cmd),
        Command::Summary { period } => finance::summary(state, period),
    };
    state.process_events()?;
    result
}
