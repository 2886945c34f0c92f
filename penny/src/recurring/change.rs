use crate::{essentials::*, recurring::RecurringTransaction, schema::recurring_transactions};

use diesel::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = recurring_transactions)]
pub struct RecurringPatch {
    pub active: Option<bool>,
}

impl RecurringPatch {
    pub fn save(&self, conn: &mut Conn, user_id: &str, id: i64) -> Result<RecurringTransaction> {
        if self.active.is_none() {
            return RecurringTransaction::find(conn, user_id, id);
        }

        let recurring = diesel::update(
            recurring_transactions::table
                .filter(recurring_transactions::id.eq(id))
                .filter(recurring_transactions::user_id.eq(user_id)),
        )
        .set(self)
        .returning(RecurringTransaction::as_returning())
        .get_result(conn)
        .map_err(|e| Error::from_diesel_error(e, "RecurringTransaction"))?;

        log::info!("Updated recurring transaction {id}");
        Ok(recurring)
    }
}
