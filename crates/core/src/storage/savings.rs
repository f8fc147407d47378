//! Savings goal storage operations

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::parse::{
    fmt_date, fmt_datetime, parse_date_opt, parse_datetime, parse_uuid, OptionalExt,
};
use crate::error::Result;
use crate::models::SavingsGoal;

const GOAL_COLUMNS: &str =
    "id, user_id, name, target_cents, saved_cents, deadline, created_at, updated_at";

pub struct SavingsStore<'a> {
    conn: &'a Connection,
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        name: row.get(2)?,
        target_cents: row.get(3)?,
        saved_cents: row.get(4)?,
        deadline: parse_date_opt(row.get::<_, Option<String>>(5)?)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

impl<'a> SavingsStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, goal: &SavingsGoal) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO savings_goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                GOAL_COLUMNS
            ),
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.name,
                goal.target_cents,
                goal.saved_cents,
                goal.deadline.map(fmt_date),
                fmt_datetime(goal.created_at),
                fmt_datetime(goal.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<SavingsGoal>> {
        let goal = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM savings_goals WHERE id = ?1 AND user_id = ?2",
                    GOAL_COLUMNS
                ),
                params![id.to_string(), user_id.to_string()],
                goal_from_row,
            )
            .optional()?;
        Ok(goal)
    }

    pub fn list(&self, user_id: Uuid) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM savings_goals WHERE user_id = ?1
             ORDER BY deadline IS NULL, deadline, name",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map(params![user_id.to_string()], goal_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    /// Store a new saved amount only while it still equals `expected_saved`
    pub fn replace_saved(&self, goal: &SavingsGoal, expected_saved: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE savings_goals SET saved_cents = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND saved_cents = ?5",
            params![
                goal.saved_cents,
                fmt_datetime(goal.updated_at),
                goal.id.to_string(),
                goal.user_id.to_string(),
                expected_saved,
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM savings_goals WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }
}
