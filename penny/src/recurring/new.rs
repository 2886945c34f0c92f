use crate::{
    category::Category, essentials::*, recurring::RecurringTransaction,
    schema::recurring_transactions, transaction::NewTransaction,
};

use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurring {
    pub name: String,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    /// Month the first payment is booked in right away, if any
    pub count_this_month: Option<Period>,
}

impl NewRecurring {
    /// Insert the recurring payment, and its first transaction when it counts
    /// this month already
    pub fn save(&self, conn: &mut Conn, user_id: &str) -> Result<RecurringTransaction> {
        conn.immediate_transaction(|conn| {
            Category::usable(conn, user_id, self.category_id)?;

            let recurring = self.to_insertable(user_id).save(conn)?;

            if let Some(period) = self.count_this_month {
                NewTransaction {
                    name: self.name.clone(),
                    amount: self.amount,
                    category_id: self.category_id,
                    kind: self.kind,
                    period,
                }
                .save(conn, user_id)?;
            }

            Ok(recurring)
        })
    }

    pub fn to_insertable<'a>(&'a self, user_id: &'a str) -> InsertableRecurring<'a> {
        InsertableRecurring {
            user_id,
            name: &self.name,
            amount: self.amount,
            category_id: self.category_id,
            kind: self.kind,
            active: true,
            count_this_month: self.count_this_month.is_some(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recurring_transactions)]
pub struct InsertableRecurring<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    pub active: bool,
    pub count_this_month: bool,
}

impl InsertableRecurring<'_> {
    pub fn save(self, conn: &mut Conn) -> Result<RecurringTransaction> {
        let recurring = diesel::insert_into(recurring_transactions::table)
            .values(self)
            .returning(RecurringTransaction::as_returning())
            .get_result(conn)?;

        log::info!("Created recurring transaction {}", recurring.id);
        Ok(recurring)
    }
}
