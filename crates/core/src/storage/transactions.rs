//! Transaction storage operations

use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    fmt_date, fmt_datetime, parse_date, parse_datetime, parse_text, parse_uuid, OptionalExt,
};
use crate::error::Result;
use crate::models::{Transaction, TransactionFilter};

const TX_COLUMNS: &str = "id, user_id, kind, amount_cents, category, description, occurred_on, created_at, updated_at";

pub struct TransactionStore<'a> {
    conn: &'a Connection,
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        kind: parse_text(&row.get::<_, String>(2)?)?,
        amount_cents: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        occurred_on: parse_date(&row.get::<_, String>(6)?)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(8)?)?,
    })
}

impl<'a> TransactionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, tx), fields(user_id = %tx.user_id))]
    pub fn create(&self, tx: &Transaction) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO transactions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                TX_COLUMNS
            ),
            params![
                tx.id.to_string(),
                tx.user_id.to_string(),
                tx.kind.as_str(),
                tx.amount_cents,
                tx.category,
                tx.description,
                fmt_date(tx.occurred_on),
                fmt_datetime(tx.created_at),
                fmt_datetime(tx.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<Transaction>> {
        let tx = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM transactions WHERE id = ?1 AND user_id = ?2",
                    TX_COLUMNS
                ),
                params![id.to_string(), user_id.to_string()],
                transaction_from_row,
            )
            .optional()?;
        Ok(tx)
    }

    /// List a user's transactions matching `filter`, newest first
    #[instrument(skip(self))]
    pub fn list(&self, user_id: Uuid, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {} FROM transactions WHERE user_id = ?1", TX_COLUMNS);
        let mut args = vec![user_id.to_string()];

        if let Some(kind) = filter.kind {
            args.push(kind.as_str().to_string());
            sql.push_str(&format!(" AND kind = ?{}", args.len()));
        }
        if let Some(category) = &filter.category {
            args.push(category.clone());
            sql.push_str(&format!(" AND category = ?{}", args.len()));
        }
        if let Some(from) = filter.from {
            args.push(fmt_date(from));
            sql.push_str(&format!(" AND occurred_on >= ?{}", args.len()));
        }
        if let Some(to) = filter.to {
            args.push(fmt_date(to));
            sql.push_str(&format!(" AND occurred_on <= ?{}", args.len()));
        }
        sql.push_str(" ORDER BY occurred_on DESC, created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let txs = stmt
            .query_map(params_from_iter(args.iter()), transaction_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(txs)
    }

    #[instrument(skip(self, tx), fields(id = %tx.id))]
    pub fn update(&self, tx: &Transaction) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET kind = ?1, amount_cents = ?2, category = ?3, description = ?4,
                 occurred_on = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                tx.kind.as_str(),
                tx.amount_cents,
                tx.category,
                tx.description,
                fmt_date(tx.occurred_on),
                fmt_datetime(tx.updated_at),
                tx.id.to_string(),
                tx.user_id.to_string(),
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionInput, TransactionKind, User};
    use crate::storage::{Database, UserStore};
    use chrono::{NaiveDate, Utc};

    fn setup(db: &Database) -> Uuid {
        let conn = db.conn();
        let user = User::new(
            format!("u{}", Uuid::new_v4().simple()),
            "U".into(),
            "h".into(),
            Utc::now(),
        );
        UserStore::new(&conn).create(&user).unwrap();
        user.id
    }

    fn add(db: &Database, user_id: Uuid, kind: TransactionKind, category: &str, day: u32) -> Transaction {
        let tx = TransactionInput {
            kind,
            amount_cents: 1_000,
            category: category.into(),
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
        }
        .into_transaction(user_id, Utc::now());
        TransactionStore::new(&db.conn()).create(&tx).unwrap();
        tx
    }

    #[test]
    fn test_list_filters_and_orders() {
        let db = Database::open_in_memory().unwrap();
        let user_id = setup(&db);
        add(&db, user_id, TransactionKind::Expense, "food", 3);
        add(&db, user_id, TransactionKind::Income, "salary", 1);
        let late = add(&db, user_id, TransactionKind::Expense, "rent", 20);

        let conn = db.conn();
        let store = TransactionStore::new(&conn);

        let all = store.list(user_id, &TransactionFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, late.id);

        let expenses = store
            .list(
                user_id,
                &TransactionFilter {
                    kind: Some(TransactionKind::Expense),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(expenses.len(), 2);

        let window = TransactionFilter::between(
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
        );
        assert_eq!(store.list(user_id, &window).unwrap().len(), 2);
    }

    #[test]
    fn test_rows_are_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        let owner = setup(&db);
        let other = setup(&db);
        let tx = add(&db, owner, TransactionKind::Expense, "food", 5);

        let conn = db.conn();
        let store = TransactionStore::new(&conn);
        assert!(store.find(other, tx.id).unwrap().is_none());
        assert!(store.list(other, &TransactionFilter::default()).unwrap().is_empty());
        assert!(!store.delete(other, tx.id).unwrap());

        let mut hijack = tx.clone();
        hijack.user_id = other;
        assert!(!store.update(&hijack).unwrap());

        assert!(store.delete(owner, tx.id).unwrap());
    }
}
