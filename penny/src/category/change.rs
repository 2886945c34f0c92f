use crate::{category::Category, essentials::*, schema::categories};

use diesel::prelude::*;

/// Kind can't change: transactions booked in the category rely on it
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = categories)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    pub fn save(&self, conn: &mut Conn, user_id: &str, id: i64) -> Result<Category> {
        if self.is_empty() {
            return Category::find(conn, user_id, id);
        }

        let category = diesel::update(
            categories::table
                .filter(categories::id.eq(id))
                .filter(categories::user_id.eq(user_id)),
        )
        .set(self)
        .returning(Category::as_returning())
        .get_result(conn)
        .map_err(|e| Error::from_diesel_error(e, "Category"))?;

        log::info!("Updated category {id}");
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::{assert_eq, Result, *};

    #[test]
    fn save() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;
        let id = food.id.row()?;

        let patch = CategoryPatch {
            color: Some("#00ff00".to_owned()),
            ..Default::default()
        };
        let food = patch.save(conn, test::USER, id)?;
        assert_eq!("Food", food.name);
        assert_eq!("#00ff00", food.color);
        assert_eq!(food, Category::find(conn, test::USER, id)?);

        assert_eq!(food, CategoryPatch::default().save(conn, test::USER, id)?);

        Ok(())
    }

    #[test]
    fn save_other_user() -> Result<()> {
        let conn = &mut test::db()?;
        let food = test::category(conn, "Food", Kind::Expense)?;

        let patch = CategoryPatch {
            name: Some("Mine".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            patch.save(conn, "mallory", food.id.row()?),
            Err(Error::ModelNotFound("Category"))
        ));
        assert_eq!("Food", Category::find(conn, test::USER, food.id.row()?)?.name);

        Ok(())
    }
}
