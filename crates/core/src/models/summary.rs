//! Dashboard report for one month

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Budget, Transaction, TransactionKind, YearMonth};
use crate::error::{Error, Result};

fn add_cents(total: &mut i64, amount_cents: i64) -> Result<()> {
    *total = total
        .checked_add(amount_cents)
        .ok_or_else(|| Error::validation("amount", "monthly total is too large"))?;
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetStatus {
    pub category: String,
    pub limit_cents: i64,
    pub spent_cents: i64,
}

impl BudgetStatus {
    /// Negative once the budget is exceeded
    pub fn remaining_cents(&self) -> i64 {
        self.limit_cents - self.spent_cents
    }

    pub fn is_over(&self) -> bool {
        self.spent_cents > self.limit_cents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlySummary {
    pub period: YearMonth,
    pub income_cents: i64,
    pub expense_cents: i64,
    /// Expense totals per category, largest first
    pub expenses_by_category: Vec<CategoryTotal>,
    pub budgets: Vec<BudgetStatus>,
}

impl MonthlySummary {
    /// Build from the month's transactions and budgets. Transactions outside
    /// `period` are ignored; a total that overflows is a validation error.
    pub fn compute(
        period: YearMonth,
        transactions: &[Transaction],
        budgets: &[Budget],
    ) -> Result<Self> {
        let mut income_cents = 0;
        let mut expense_cents = 0;
        let mut by_category: BTreeMap<&str, i64> = BTreeMap::new();

        for tx in transactions.iter().filter(|t| period.contains(t.occurred_on)) {
            match tx.kind {
                TransactionKind::Income => add_cents(&mut income_cents, tx.amount_cents)?,
                TransactionKind::Expense => {
                    add_cents(&mut expense_cents, tx.amount_cents)?;
                    add_cents(
                        by_category.entry(tx.category.as_str()).or_insert(0),
                        tx.amount_cents,
                    )?;
                }
            }
        }

        let budgets = budgets
            .iter()
            .filter(|b| b.period == period)
            .map(|b| BudgetStatus {
                category: b.category.clone(),
                limit_cents: b.limit_cents,
                spent_cents: by_category.get(b.category.as_str()).copied().unwrap_or(0),
            })
            .collect();

        let mut expenses_by_category: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, total_cents)| CategoryTotal {
                category: category.to_string(),
                total_cents,
            })
            .collect();
        expenses_by_category.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));

        Ok(Self {
            period,
            income_cents,
            expense_cents,
            expenses_by_category,
            budgets,
        })
    }

    pub fn net_cents(&self) -> i64 {
        self.income_cents - self.expense_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetInput, TransactionInput};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn tx(kind: TransactionKind, cents: i64, category: &str, day: (i32, u32, u32)) -> Transaction {
        TransactionInput {
            kind,
            amount_cents: cents,
            category: category.into(),
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
        }
        .into_transaction(Uuid::nil(), Utc::now())
    }

    #[test]
    fn test_compute_totals_and_budgets() {
        let period: YearMonth = "2026-10".parse().unwrap();
        let txs = vec![
            tx(TransactionKind::Income, 300_000, "salary", (2026, 10, 1)),
            tx(TransactionKind::Expense, 4_000, "food", (2026, 10, 2)),
            tx(TransactionKind::Expense, 6_000, "food", (2026, 10, 9)),
            tx(TransactionKind::Expense, 120_000, "rent", (2026, 10, 3)),
            tx(TransactionKind::Expense, 9_999, "food", (2026, 9, 30)),
        ];
        let budgets = vec![BudgetInput {
            category: "food".into(),
            period,
            limit_cents: 8_000,
        }
        .into_budget(Uuid::nil(), Utc::now())];

        let summary = MonthlySummary::compute(period, &txs, &budgets).unwrap();

        assert_eq!(summary.income_cents, 300_000);
        assert_eq!(summary.expense_cents, 130_000);
        assert_eq!(summary.net_cents(), 170_000);
        assert_eq!(summary.expenses_by_category[0].category, "rent");
        assert_eq!(summary.expenses_by_category[1].total_cents, 10_000);

        let food = &summary.budgets[0];
        assert_eq!(food.spent_cents, 10_000);
        assert_eq!(food.remaining_cents(), -2_000);
        assert!(food.is_over());
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let period: YearMonth = "2026-10".parse().unwrap();
        let txs = vec![
            tx(TransactionKind::Expense, i64::MAX, "rent", (2026, 10, 1)),
            tx(TransactionKind::Expense, 1, "food", (2026, 10, 2)),
        ];

        assert!(matches!(
            MonthlySummary::compute(period, &txs, &[]),
            Err(Error::Validation { field: "amount", .. })
        ));
    }
}
