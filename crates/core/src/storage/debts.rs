//! Debt storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    fmt_date, fmt_datetime, parse_date_opt, parse_datetime, parse_uuid, OptionalExt,
};
use super::TransactionStore;
use crate::error::Result;
use crate::models::{Debt, Transaction};

const DEBT_COLUMNS: &str = "id, user_id, creditor, principal_cents, remaining_cents, interest_rate_bps, due_on, created_at, updated_at";

pub struct DebtStore<'a> {
    conn: &'a Connection,
}

fn debt_from_row(row: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        creditor: row.get(2)?,
        principal_cents: row.get(3)?,
        remaining_cents: row.get(4)?,
        interest_rate_bps: row.get(5)?,
        due_on: parse_date_opt(row.get::<_, Option<String>>(6)?)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(8)?)?,
    })
}

impl<'a> DebtStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, debt), fields(user_id = %debt.user_id))]
    pub fn create(&self, debt: &Debt) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO debts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                DEBT_COLUMNS
            ),
            params![
                debt.id.to_string(),
                debt.user_id.to_string(),
                debt.creditor,
                debt.principal_cents,
                debt.remaining_cents,
                debt.interest_rate_bps,
                debt.due_on.map(fmt_date),
                fmt_datetime(debt.created_at),
                fmt_datetime(debt.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<Debt>> {
        let debt = self
            .conn
            .query_row(
                &format!("SELECT {} FROM debts WHERE id = ?1 AND user_id = ?2", DEBT_COLUMNS),
                params![id.to_string(), user_id.to_string()],
                debt_from_row,
            )
            .optional()?;
        Ok(debt)
    }

    /// Open debts first, then by due date
    #[instrument(skip(self))]
    pub fn list(&self, user_id: Uuid) -> Result<Vec<Debt>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM debts WHERE user_id = ?1
             ORDER BY remaining_cents = 0, due_on IS NULL, due_on, created_at",
            DEBT_COLUMNS
        ))?;

        let debts = stmt
            .query_map(params![user_id.to_string()], debt_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(debts)
    }

    /// Store the new balance and the payment transaction atomically.
    ///
    /// The balance is only replaced while it still equals `expected_remaining`;
    /// otherwise nothing is written and false is returned.
    #[instrument(skip(self, debt, payment), fields(id = %debt.id))]
    pub fn record_payment(
        &self,
        debt: &Debt,
        expected_remaining: i64,
        payment: &Transaction,
    ) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE debts SET remaining_cents = ?1, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4 AND remaining_cents = ?5",
            params![
                debt.remaining_cents,
                fmt_datetime(debt.updated_at),
                debt.id.to_string(),
                debt.user_id.to_string(),
                expected_remaining,
            ],
        )?;
        if changed != 1 {
            return Ok(false);
        }
        TransactionStore::new(&tx).create(payment)?;
        tx.commit()?;
        Ok(true)
    }

    pub fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM debts WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewDebt, TransactionFilter, TransactionInput, TransactionKind, User};
    use crate::storage::{Database, UserStore};
    use chrono::{NaiveDate, Utc};

    fn setup() -> (Database, Debt) {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("debtor".into(), "D".into(), "h".into(), Utc::now());
        let debt = NewDebt {
            creditor: "Card".into(),
            principal_cents: 50_000,
            interest_rate_bps: Some(1_999),
            due_on: NaiveDate::from_ymd_opt(2026, 12, 1),
        }
        .into_debt(user.id, Utc::now());
        {
            let conn = db.conn();
            UserStore::new(&conn).create(&user).unwrap();
            DebtStore::new(&conn).create(&debt).unwrap();
        }
        (db, debt)
    }

    fn payment(debt: &Debt, amount_cents: i64) -> Transaction {
        TransactionInput {
            kind: TransactionKind::Expense,
            amount_cents,
            category: "debt".into(),
            description: Some(debt.creditor.clone()),
            occurred_on: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        }
        .into_transaction(debt.user_id, Utc::now())
    }

    #[test]
    fn test_record_payment_writes_both_rows() {
        let (db, mut debt) = setup();
        debt.apply_payment(10_000, Utc::now()).unwrap();
        let payment = payment(&debt, 10_000);

        let conn = db.conn();
        assert!(DebtStore::new(&conn)
            .record_payment(&debt, 50_000, &payment)
            .unwrap());

        let stored = DebtStore::new(&conn).find(debt.user_id, debt.id).unwrap().unwrap();
        assert_eq!(stored.remaining_cents, 40_000);
        assert_eq!(stored.interest_rate_bps, Some(1_999));
        let txs = TransactionStore::new(&conn)
            .list(debt.user_id, &TransactionFilter::default())
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount_cents, 10_000);
    }

    #[test]
    fn test_record_payment_for_foreign_debt_writes_nothing() {
        let (db, mut debt) = setup();
        debt.user_id = Uuid::new_v4();
        debt.remaining_cents = 0;
        let payment = payment(&debt, 50_000);

        let conn = db.conn();
        assert!(!DebtStore::new(&conn)
            .record_payment(&debt, 50_000, &payment)
            .unwrap());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_payment_from_stale_read_is_rejected() {
        let (db, debt) = setup();
        let conn = db.conn();
        let store = DebtStore::new(&conn);

        // Two writers read the same balance before either pays
        let mut first = store.find(debt.user_id, debt.id).unwrap().unwrap();
        let mut second = store.find(debt.user_id, debt.id).unwrap().unwrap();
        first.apply_payment(20_000, Utc::now()).unwrap();
        second.apply_payment(20_000, Utc::now()).unwrap();

        assert!(store
            .record_payment(&first, 50_000, &payment(&first, 20_000))
            .unwrap());
        assert!(!store
            .record_payment(&second, 50_000, &payment(&second, 20_000))
            .unwrap());

        let stored = store.find(debt.user_id, debt.id).unwrap().unwrap();
        assert_eq!(stored.remaining_cents, 30_000);
        let paid: i64 = conn
            .query_row("SELECT SUM(amount_cents) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(paid, stored.paid_cents());
    }
}
