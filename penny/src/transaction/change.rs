use crate::{
    category::Category, essentials::*, result::OptionalExtension, schema::transactions,
    transaction::Transaction,
};

use diesel::prelude::*;

/// Month and year are left out, a transaction stays in the month it was
/// booked in
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = transactions)]
pub struct TransactionPatch {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: Option<Kind>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.kind.is_none()
    }

    /// Moving to a deleted category is allowed so that transactions already
    /// booked in one can still be edited
    pub fn save(&self, conn: &mut Conn, user_id: &str, id: i64) -> Result<Transaction> {
        if let Some(category_id) = self.category_id {
            if Category::find(conn, user_id, category_id).optional()?.is_none() {
                return Err(Error::Invalid(format!(
                    "Category {category_id} does not exist"
                )));
            }
        }

        if self.is_empty() {
            return Transaction::find(conn, user_id, id);
        }

        let transaction = diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::user_id.eq(user_id)),
        )
        .set(self)
        .returning(Transaction::as_returning())
        .get_result(conn)
        .map_err(|e| Error::from_diesel_error(e, "Transaction"))?;

        log::info!("Updated transaction {id}");
        Ok(transaction)
    }
}
