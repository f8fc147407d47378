//! Budget storage operations

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::parse::{fmt_datetime, parse_datetime, parse_text, parse_uuid};
use crate::error::{Error, Result};
use crate::models::{Budget, YearMonth};

const BUDGET_COLUMNS: &str =
    "id, user_id, category, period, limit_cents, created_at, updated_at";

pub struct BudgetStore<'a> {
    conn: &'a Connection,
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        category: row.get(2)?,
        period: parse_text(&row.get::<_, String>(3)?)?,
        limit_cents: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

impl<'a> BudgetStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or, on a (user, category, period) clash, replace the limit.
    /// Returns the stored row, which keeps the original id on replace.
    pub fn upsert(&self, budget: &Budget) -> Result<Budget> {
        self.conn
            .query_row(
                &format!(
                    "INSERT INTO budgets ({cols}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(user_id, category, period)
                     DO UPDATE SET limit_cents = excluded.limit_cents,
                                   updated_at = excluded.updated_at
                     RETURNING {cols}",
                    cols = BUDGET_COLUMNS
                ),
                params![
                    budget.id.to_string(),
                    budget.user_id.to_string(),
                    budget.category,
                    budget.period.to_string(),
                    budget.limit_cents,
                    fmt_datetime(budget.created_at),
                    fmt_datetime(budget.updated_at),
                ],
                budget_from_row,
            )
            .map_err(Error::from)
    }

    pub fn list(&self, user_id: Uuid, period: YearMonth) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ?1 AND period = ?2 ORDER BY category",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(
                params![user_id.to_string(), period.to_string()],
                budget_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    pub fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }
}
