use crate::{essentials::*, schema::transactions, transaction::Transaction};

use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub name: String,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    pub period: Period,
}

impl NewTransaction {
    /// Insert without checking the category, callers are expected to have
    /// done so
    pub fn save(&self, conn: &mut Conn, user_id: &str) -> Result<Transaction> {
        self.to_insertable(user_id).save(conn)
    }

    pub fn to_insertable<'a>(&'a self, user_id: &'a str) -> InsertableTransaction<'a> {
        InsertableTransaction {
            user_id,
            name: &self.name,
            amount: self.amount,
            category_id: self.category_id,
            kind: self.kind,
            month: self.period.month,
            year: self.period.year,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertableTransaction<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    pub month: i32,
    pub year: i32,
}

impl InsertableTransaction<'_> {
    pub fn save(self, conn: &mut Conn) -> Result<Transaction> {
        let transaction = diesel::insert_into(transactions::table)
            .values(self)
            .returning(Transaction::as_returning())
            .get_result(conn)?;

        log::info!("Created transaction {}", transaction.id);
        Ok(transaction)
    }
}

/// Insert many rows at once, returning how many were inserted
pub fn save_all(conn: &mut Conn, rows: &[InsertableTransaction]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    Ok(diesel::insert_into(transactions::table)
        .values(rows)
        .execute(conn)?)
}
