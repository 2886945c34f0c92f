use crate::{
    cache::CacheKey,
    essentials::*,
    gateway::{Remote, Removal},
    schema::recurring_transactions,
};

use diesel::prelude::*;

pub mod change;
pub mod materialize;
pub mod new;

pub use change::RecurringPatch;
pub use materialize::Materializer;
pub use new::NewRecurring;

/// A payment booked again every month while active
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = recurring_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecurringTransaction {
    pub id: Id,
    pub name: String,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    pub active: bool,
    pub count_this_month: bool,
}

impl RecurringTransaction {
    pub fn find(conn: &mut Conn, user_id: &str, id: i64) -> Result<Self> {
        recurring_transactions::table
            .filter(recurring_transactions::id.eq(id))
            .filter(recurring_transactions::user_id.eq(user_id))
            .select(RecurringTransaction::as_select())
            .first(conn)
            .map_err(|e| Error::from_diesel_error(e, "RecurringTransaction"))
    }

    pub fn all(conn: &mut Conn, user_id: &str) -> Result<Vec<Self>> {
        Ok(recurring_transactions::table
            .filter(recurring_transactions::user_id.eq(user_id))
            .order(recurring_transactions::id)
            .select(RecurringTransaction::as_select())
            .load(conn)?)
    }

    pub fn delete(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        let deleted = diesel::delete(
            recurring_transactions::table
                .filter(recurring_transactions::id.eq(id))
                .filter(recurring_transactions::user_id.eq(user_id)),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Err(Error::ModelNotFound("RecurringTransaction"));
        }

        log::info!("Deleted recurring transaction {id}");
        Ok(Removal::Deleted)
    }
}

impl Remote for RecurringTransaction {
    type New = NewRecurring;
    type Patch = RecurringPatch;

    fn id(&self) -> Id {
        self.id
    }

    fn speculative(new: &NewRecurring) -> Self {
        RecurringTransaction {
            id: Id::temporary(),
            name: new.name.clone(),
            amount: new.amount,
            category_id: new.category_id,
            kind: new.kind,
            active: true,
            count_this_month: new.count_this_month.is_some(),
        }
    }

    fn merge(&mut self, patch: &RecurringPatch) {
        if let Some(active) = patch.active {
            self.active = active;
        }
    }

    fn insert(conn: &mut Conn, user_id: &str, new: &NewRecurring) -> Result<Self> {
        new.save(conn, user_id)
    }

    fn select(conn: &mut Conn, user_id: &str, _key: &CacheKey) -> Result<Vec<Self>> {
        Self::all(conn, user_id)
    }

    fn change(conn: &mut Conn, user_id: &str, id: i64, patch: &RecurringPatch) -> Result<Self> {
        patch.save(conn, user_id, id)
    }

    fn remove(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        Self::delete(conn, user_id, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::{assert_eq, Result, *};

    #[test]
    fn all_is_scoped_to_user() -> Result<()> {
        let conn = &mut test::db()?;
        let rent = test::category(conn, "Rent", Kind::Expense)?;
        let r1 = test::recurring(conn, &rent, 900)?;
        let r2 = test::recurring(conn, &rent, 50)?;

        assert_eq!(vec![r1.clone(), r2], RecurringTransaction::all(conn, test::USER)?);
        assert!(RecurringTransaction::all(conn, "mallory")?.is_empty());
        assert_eq!(r1, RecurringTransaction::find(conn, test::USER, r1.id.row()?)?);

        Ok(())
    }

    #[test]
    fn delete() -> Result<()> {
        let conn = &mut test::db()?;
        let rent = test::category(conn, "Rent", Kind::Expense)?;
        let recurring = test::recurring(conn, &rent, 900)?;
        let id = recurring.id.row()?;

        assert!(matches!(
            RecurringTransaction::delete(conn, "mallory", id),
            Err(Error::ModelNotFound("RecurringTransaction"))
        ));
        assert_eq!(Removal::Deleted, RecurringTransaction::delete(conn, test::USER, id)?);
        assert!(RecurringTransaction::all(conn, test::USER)?.is_empty());

        Ok(())
    }

    #[test]
    fn speculative() -> Result<()> {
        let new = NewRecurring {
            name: "Rent".to_owned(),
            amount: 900,
            category_id: 1,
            kind: Kind::Expense,
            count_this_month: Some(Period::new(2024, 3)?),
        };

        let mut recurring = RecurringTransaction::speculative(&new);
        assert!(recurring.id.is_temporary());
        assert!(recurring.active);
        assert!(recurring.count_this_month);

        recurring.merge(&RecurringPatch {
            active: Some(false),
        });
        assert!(!recurring.active);

        Ok(())
    }
}
