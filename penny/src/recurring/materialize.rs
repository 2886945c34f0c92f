//! The monthly job booking every active recurring payment

use crate::{
    essentials::*,
    recurring::RecurringTransaction,
    schema::recurring_transactions,
    transaction::new::{save_all, InsertableTransaction},
};

use diesel::prelude::*;

/// Guards the job behind a shared secret
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    secret: Option<String>,
}

impl Materializer {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Without a configured secret nobody is authorized
    pub fn authorize(&self, header: Option<&str>) -> Result<()> {
        match (&self.secret, header) {
            (Some(secret), Some(header))
                if header.strip_prefix("Bearer ") == Some(secret.as_str()) =>
            {
                Ok(())
            }
            _ => {
                log::warn!("Rejected materialization request");
                Err(Error::Unauthorized)
            }
        }
    }

    pub fn run(&self, conn: &mut Conn, header: Option<&str>, period: Period) -> Result<usize> {
        self.authorize(header)?;
        materialize(conn, period)
    }
}

/// Book one transaction in `period` for each active recurring payment of
/// every user, returning how many were booked
pub fn materialize(conn: &mut Conn, period: Period) -> Result<usize> {
    conn.immediate_transaction(|conn| {
        let active = recurring_transactions::table
            .filter(recurring_transactions::active.eq(true))
            .order(recurring_transactions::id)
            .select((
                recurring_transactions::user_id,
                RecurringTransaction::as_select(),
            ))
            .load::<(String, RecurringTransaction)>(conn)?;

        if active.is_empty() {
            log::info!("No active recurring transactions for {period}");
            return Ok(0);
        }

        let rows = active
            .iter()
            .map(|(user_id, recurring)| InsertableTransaction {
                user_id,
                name: &recurring.name,
                amount: recurring.amount,
                category_id: recurring.category_id,
                kind: recurring.kind,
                month: period.month,
                year: period.year,
            })
            .collect::<Vec<_>>();

        let count = save_all(conn, &rows)?;
        log::info!("Booked {count} recurring transaction(s) in {period}");
        Ok(count)
    })
}
