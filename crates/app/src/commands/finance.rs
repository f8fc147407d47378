//! Transactions, debts, savings goals, budgets and summaries

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use ledger_core::{
    BudgetInput, NewDebt, NewSavingsGoal, TransactionFilter, TransactionInput, YearMonth,
};

use crate::cli::{BudgetCommand, DebtCommand, GoalCommand, TxCommand, TxFields};
use crate::money::format_cents;
use crate::state::AppState;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn this_month() -> YearMonth {
    YearMonth::of(today())
}

fn tx_input(fields: TxFields) -> TransactionInput {
    TransactionInput {
        kind: fields.kind,
        amount_cents: fields.amount,
        category: fields.category,
        description: fields.note,
        occurred_on: fields.on.unwrap_or_else(today),
    }
}

/// Annual percentage to basis points
fn rate_to_bps(rate: f64) -> Result<u32> {
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        bail!("Interest rate must be between 0 and 100 percent");
    }
    Ok((rate * 100.0).round() as u32)
}

pub fn tx(state: &AppState, cmd: TxCommand) -> Result<()> {
    let token = state.token()?;
    let ledger = state.ledger();
    let currency = ledger.settings(&token)?.currency;

    match cmd {
        TxCommand::Add(fields) => {
            let tx = ledger.add_transaction(&token, tx_input(fields))?;
            println!("Added {} {}", tx.kind, tx.id);
        }
        TxCommand::List {
            kind,
            category,
            from,
            to,
        } => {
            let filter = TransactionFilter {
                kind,
                category,
                from,
                to,
            };
            let txs = ledger.transactions(&token, &filter)?;
            if txs.is_empty() {
                println!("No transactions.");
            }
            for tx in txs {
                println!(
                    "{}  {}  {:<7}  {:>16}  {:<12}  {}",
                    tx.id,
                    tx.occurred_on,
                    tx.kind.as_str(),
                    format_cents(tx.amount_cents, &currency),
                    tx.category,
                    tx.description.as_deref().unwrap_or("")
                );
            }
        }
        TxCommand::Edit { id, fields } => {
            ledger.update_transaction(&token, id, tx_input(fields))?;
            println!("Updated {}", id);
        }
        TxCommand::Rm { id } => {
            ledger.delete_transaction(&token, id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

pub fn debt(state: &AppState, cmd: DebtCommand) -> Result<()> {
    let token = state.token()?;
    let ledger = state.ledger();
    let currency = ledger.settings(&token)?.currency;

    match cmd {
        DebtCommand::Add {
            creditor,
            principal,
            rate,
            due,
        } => {
            let debt = ledger.add_debt(
                &token,
                NewDebt {
                    creditor,
                    principal_cents: principal,
                    interest_rate_bps: rate.map(rate_to_bps).transpose()?,
                    due_on: due,
                },
            )?;
            println!("Added debt {}", debt.id);
        }
        DebtCommand::List => {
            let debts = ledger.debts(&token)?;
            if debts.is_empty() {
                println!("No debts.");
            }
            for debt in debts {
                let due = debt
                    .due_on
                    .map(|d| format!("due {}", d))
                    .unwrap_or_default();
                println!(
                    "{}  {:<16}  {:>16} of {:>16}  {}",
                    debt.id,
                    debt.creditor,
                    format_cents(debt.remaining_cents, &currency),
                    format_cents(debt.principal_cents, &currency),
                    if debt.is_settled() { "settled".to_string() } else { due }
                );
            }
        }
        DebtCommand::Pay { id, amount, on } => {
            let debt = ledger.record_debt_payment(&token, id, amount, on.unwrap_or_else(today))?;
            println!(
                "Paid. Remaining {}",
                format_cents(debt.remaining_cents, &currency)
            );
        }
        DebtCommand::Rm { id } => {
            ledger.delete_debt(&token, id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

pub fn goal(state: &AppState, cmd: GoalCommand) -> Result<()> {
    let token = state.token()?;
    let ledger = state.ledger();
    let currency = ledger.settings(&token)?.currency;

    match cmd {
        GoalCommand::Add {
            name,
            target,
            deadline,
        } => {
            let goal = ledger.add_savings_goal(
                &token,
                NewSavingsGoal {
                    name,
                    target_cents: target,
                    deadline,
                },
            )?;
            println!("Added goal {}", goal.id);
        }
        GoalCommand::List => {
            let goals = ledger.savings_goals(&token)?;
            if goals.is_empty() {
                println!("No savings goals.");
            }
            for goal in goals {
                println!(
                    "{}  {:<16}  {:>16} of {:>16}  {:>3}%",
                    goal.id,
                    goal.name,
                    format_cents(goal.saved_cents, &currency),
                    format_cents(goal.target_cents, &currency),
                    goal.progress_percent()
                );
            }
        }
        GoalCommand::Fund { id, amount } => {
            let goal = ledger.contribute_to_goal(&token, id, amount)?;
            println!("{}% of {} reached", goal.progress_percent(), goal.name);
        }
        GoalCommand::Rm { id } => {
            ledger.delete_savings_goal(&token, id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

pub fn budget(state: &AppState, cmd: BudgetCommand) -> Result<()> {
    let token = state.token()?;
    let ledger = state.ledger();
    let currency = ledger.settings(&token)?.currency;

    match cmd {
        BudgetCommand::Set {
            category,
            limit,
            period,
        } => {
            let budget = ledger.set_budget(
                &token,
                BudgetInput {
                    category,
                    period: period.unwrap_or_else(this_month),
                    limit_cents: limit,
                },
            )?;
            println!(
                "Budget for {} in {}: {}",
                budget.category,
                budget.period,
                format_cents(budget.limit_cents, &currency)
            );
        }
        BudgetCommand::List { period } => {
            let period = period.unwrap_or_else(this_month);
            let budgets = ledger.budgets(&token, period)?;
            if budgets.is_empty() {
                println!("No budgets for {}.", period);
            }
            for budget in budgets {
                println!(
                    "{}  {:<16}  {:>16}",
                    budget.id,
                    budget.category,
                    format_cents(budget.limit_cents, &currency)
                );
            }
        }
        BudgetCommand::Rm { id } => {
            ledger.delete_budget(&token, id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

pub fn summary(state: &AppState, period: Option<YearMonth>) -> Result<()> {
    let token = state.token()?;
    let ledger = state.ledger();
    let currency = ledger.settings(&token)?.currency;
    let summary = ledger.monthly_summary(&token, period.unwrap_or_else(this_month))?;

    println!("Summary for {}", summary.period);
    println!("  income    {:>16}", format_cents(summary.income_cents, &currency));
    println!("  expenses  {:>16}", format_cents(summary.expense_cents, &currency));
    println!("  net       {:>16}", format_cents(summary.net_cents(), &currency));

    if !summary.expenses_by_category.is_empty() {
        println!();
        println!("Spending by category");
        for total in &summary.expenses_by_category {
            println!(
                "  {:<16}  {:>16}",
                total.category,
                format_cents(total.total_cents, &currency)
            );
        }
    }

    if !summary.budgets.is_empty() {
        println!();
        println!("Budgets");
        for status in &summary.budgets {
            let flag = if status.is_over() { "  OVER" } else { "" };
            println!(
                "  {:<16}  {:>16} left of {:>16}{}",
                status.category,
                format_cents(status.remaining_cents(), &currency),
                format_cents(status.limit_cents, &currency),
                flag
            );
        }
    }
    Ok(())
}
