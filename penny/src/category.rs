use crate::{
    cache::CacheKey,
    essentials::*,
    gateway::{Remote, Removal},
    result::OptionalExtension,
    schema::{categories, recurring_transactions, transactions},
};

use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub mod change;
pub mod new;

pub use change::CategoryPatch;
pub use new::NewCategory;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: Id,
    pub name: String,
    pub kind: Kind,
    pub color: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn find(conn: &mut Conn, user_id: &str, id: i64) -> Result<Self> {
        categories::table
            .filter(categories::id.eq(id))
            .filter(categories::user_id.eq(user_id))
            .select(Category::as_select())
            .first(conn)
            .map_err(|e| Error::from_diesel_error(e, "Category"))
    }

    /// Categories, deleted ones included, ordered by name
    pub fn all(conn: &mut Conn, user_id: &str) -> Result<Vec<Self>> {
        Ok(categories::table
            .filter(categories::user_id.eq(user_id))
            .order((categories::name, categories::id))
            .select(Category::as_select())
            .load(conn)?)
    }

    /// The category a new transaction or recurring payment may be booked in
    pub(crate) fn usable(conn: &mut Conn, user_id: &str, id: i64) -> Result<Self> {
        match Self::find(conn, user_id, id).optional()? {
            Some(category) if !category.is_deleted() => Ok(category),
            Some(_) => Err(Error::Invalid(format!("Category {id} is deleted"))),
            None => Err(Error::Invalid(format!("Category {id} does not exist"))),
        }
    }

    /// Number of transactions and recurring payments booked in the category
    pub fn dependents(conn: &mut Conn, id: i64) -> Result<i64> {
        let transactions = transactions::table
            .filter(transactions::category_id.eq(id))
            .count()
            .get_result::<i64>(conn)?;
        let recurring = recurring_transactions::table
            .filter(recurring_transactions::category_id.eq(id))
            .count()
            .get_result::<i64>(conn)?;

        Ok(transactions + recurring)
    }

    /// Delete the category, or only mark it deleted when something still
    /// references it
    pub fn delete(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        conn.immediate_transaction(|conn| {
            let category = Self::find(conn, user_id, id)?;

            if Self::dependents(conn, id)? > 0 {
                if !category.is_deleted() {
                    diesel::update(categories::table.filter(categories::id.eq(id)))
                        .set(categories::deleted_at.eq(Some(Utc::now())))
                        .execute(conn)?;
                }
                Ok(Removal::SoftDeleted)
            } else {
                diesel::delete(categories::table.filter(categories::id.eq(id))).execute(conn)?;
                Ok(Removal::Deleted)
            }
        })
    }
}

impl Remote for Category {
    type New = NewCategory;
    type Patch = CategoryPatch;

    fn id(&self) -> Id {
        self.id
    }

    fn speculative(new: &NewCategory) -> Self {
        Category {
            id: Id::temporary(),
            name: new.name.clone(),
            kind: new.kind,
            color: new.color.clone(),
            deleted_at: None,
        }
    }

    fn merge(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }

    fn insert(conn: &mut Conn, user_id: &str, new: &NewCategory) -> Result<Self> {
        new.save(conn, user_id)
    }

    fn select(conn: &mut Conn, user_id: &str, _key: &CacheKey) -> Result<Vec<Self>> {
        Self::all(conn, user_id)
    }

    fn change(conn: &mut Conn, user_id: &str, id: i64, patch: &CategoryPatch) -> Result<Self> {
        patch.save(conn, user_id, id)
    }

    fn remove(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        Self::delete(conn, user_id, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::OptionalExtension;
    use crate::test::prelude::{assert_eq, Result, *};

    #[test]
    fn find_is_scoped_to_user() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        let id = food.id.row()?;

        assert_eq!(food, Category::find(conn, test::USER, id)?);
        assert!(matches!(
            Category::find(conn, "mallory", id),
            Err(Error::ModelNotFound("Category"))
        ));

        Ok(())
    }

    #[test]
    fn all() -> Result<()> {
        let conn = &mut test::db()?;
        test::category(conn, "Salary", Kind::Income)?;
        test::category(conn, "Food", Kind::Expense)?;
        NewCategory {
            name: "Other".to_owned(),
            kind: Kind::Expense,
            color: "#000".to_owned(),
        }
        .save(conn, "mallory")?;

        let names = Category::all(conn, test::USER)?
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();
        assert_eq!(vec!["Food", "Salary"], names);

        Ok(())
    }

    #[test]
    fn delete_without_dependents() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        let id = food.id.row()?;

        assert_eq!(Removal::Deleted, Category::delete(conn, test::USER, id)?);
        assert!(Category::find(conn, test::USER, id).optional()?.is_none());

        Ok(())
    }

    #[test]
    fn delete_with_transactions() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        test::transaction(conn, &food, 120, Period::new(2024, 3)?)?;
        let id = food.id.row()?;

        assert_eq!(Removal::SoftDeleted, Category::delete(conn, test::USER, id)?);
        let food = Category::find(conn, test::USER, id)?;
        assert!(food.is_deleted());

        // Deleting again keeps the original timestamp
        let deleted_at = food.deleted_at;
        assert_eq!(Removal::SoftDeleted, Category::delete(conn, test::USER, id)?);
        assert_eq!(deleted_at, Category::find(conn, test::USER, id)?.deleted_at);

        Ok(())
    }

    #[test]
    fn delete_with_recurring() -> Result<()> {
        let conn = &mut test::db()?;
        let rent = test::category(conn, "Rent", Kind::Expense)?;
        test::recurring(conn, &rent, 900)?;

        assert_eq!(
            Removal::SoftDeleted,
            Category::delete(conn, test::USER, rent.id.row()?)?
        );

        Ok(())
    }

    #[test]
    fn delete_of_other_user() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        let id = food.id.row()?;

        assert!(Category::delete(conn, "mallory", id)
            .unwrap_err()
            .is_not_found());
        assert!(Category::find(conn, test::USER, id).is_ok());

        Ok(())
    }

    #[test]
    fn usable() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        test::transaction(conn, &food, 10, Period::new(2024, 1)?)?;
        let id = food.id.row()?;

        assert!(Category::usable(conn, test::USER, id).is_ok());
        assert!(matches!(
            Category::usable(conn, "mallory", id),
            Err(Error::Invalid(_))
        ));

        Category::delete(conn, test::USER, id)?;
        assert!(matches!(
            Category::usable(conn, test::USER, id),
            Err(Error::Invalid(_))
        ));

        Ok(())
    }

    #[test]
    fn speculative() {
        let category = Category::speculative(&NewCategory {
            name: "Food".to_owned(),
            kind: Kind::Expense,
            color: "#ff0000".to_owned(),
        });

        assert!(category.id.is_temporary());
        assert_eq!("Food", category.name);
        assert!(!category.is_deleted());
    }
}
