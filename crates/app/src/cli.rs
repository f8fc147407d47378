//! Command-line interface definition

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ledger_core::{Theme, TransactionKind, YearMonth};
use uuid::Uuid;

use crate::money::parse_cents;

#[derive(Parser)]
#[command(name = "ledger", author, version, about = "Personal finance ledger", long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long, env = "LEDGER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the database and session file
    #[arg(long, env = "LEDGER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Register {
        username: String,
        /// Display name
        #[arg(long)]
        name: String,
    },
    /// Sign in
    Login { username: String },
    /// Sign out
    Logout {
        /// End every session of this account
        #[arg(long)]
        all: bool,
    },
    /// Show the signed-in account
    Whoami,
    /// Change password
    Passwd,
    /// Edit the profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Income and expense records
    #[command(subcommand)]
    Tx(TxCommand),
    /// Money owed
    #[command(subcommand)]
    Debt(DebtCommand),
    /// Savings goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Monthly category budgets
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Income, spending and budgets for one month
    Summary {
        /// Month as YYYY-MM (defaults to the current month)
        period: Option<YearMonth>,
    },
    /// Permanently delete the account and all its data
    DeleteAccount,
    /// Remove expired sessions
    Sweep {
        /// Keep sweeping every N seconds until interrupted
        #[arg(long)]
        every: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Change profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,
        /// light, dark or system
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        week_starts_on_monday: Option<bool>,
    },
}

/// Fields shared by `tx add` and `tx edit`
#[derive(Args)]
pub struct TxFields {
    /// income or expense
    pub kind: TransactionKind,
    /// Amount, e.g. 12.50
    #[arg(value_parser = parse_cents)]
    pub amount: i64,
    pub category: String,
    #[arg(long)]
    pub note: Option<String>,
    /// Date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub on: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum TxCommand {
    Add(TxFields),
    List {
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    Edit {
        id: Uuid,
        #[command(flatten)]
        fields: TxFields,
    },
    Rm { id: Uuid },
}

#[derive(Subcommand)]
pub enum DebtCommand {
    Add {
        creditor: String,
        #[arg(value_parser = parse_cents)]
        principal: i64,
        /// Annual interest rate in percent, e.g. 19.99
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    List,
    /// Record a payment; it is also booked as an expense
    Pay {
        id: Uuid,
        #[arg(value_parser = parse_cents)]
        amount: i64,
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    Rm { id: Uuid },
}

#[derive(Subcommand)]
pub enum GoalCommand {
    Add {
        name: String,
        #[arg(value_parser = parse_cents)]
        target: i64,
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },
    List,
    /// Put money towards a goal
    Fund {
        id: Uuid,
        #[arg(value_parser = parse_cents)]
        amount: i64,
    },
    Rm { id: Uuid },
}

#[derive(Subcommand)]
pub enum BudgetCommand {
    Set {
        category: String,
        #[arg(value_parser = parse_cents)]
        limit: i64,
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        period: Option<YearMonth>,
    },
    List {
        #[arg(long)]
        period: Option<YearMonth>,
    },
    Rm { id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tx_add() {
        let cli = Cli::parse_from([
            "ledger", "tx", "add", "expense", "12.50", "food", "--on", "2026-10-18",
        ]);
        match cli.command {
            Command::Tx(TxCommand::Add(fields)) => {
                assert_eq!(fields.kind, TransactionKind::Expense);
                assert_eq!(fields.amount, 1_250);
                assert_eq!(fields.category, "food");
                assert_eq!(fields.on, NaiveDate::from_ymd_opt(2026, 10, 18));
            }
            _ => panic!("expected tx add"),
        }
    }

    #[test]
    fn test_parse_summary_period() {
        let cli = Cli::parse_from(["ledger", "summary", "2026-10"]);
        match cli.command {
            Command::Summary { period } => {
                assert_eq!(period, Some(YearMonth::new(2026, 10).unwrap()));
            }
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_rejects_bad_amount() {
        assert!(Cli::try_parse_from(["ledger", "goal", "add", "Car", "-5"]).is_err());
        assert!(Cli::try_parse_from(["ledger", "goal", "add", "Car", "1.234"]).is_err());
    }
}
