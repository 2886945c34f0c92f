use crate::{category::Category, essentials::*, schema::categories};

use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub kind: Kind,
    pub color: String,
}

impl NewCategory {
    pub fn save(&self, conn: &mut Conn, user_id: &str) -> Result<Category> {
        self.to_insertable(user_id).save(conn)
    }

    pub fn to_insertable<'a>(&'a self, user_id: &'a str) -> InsertableCategory<'a> {
        InsertableCategory {
            user_id,
            name: &self.name,
            kind: self.kind,
            color: &self.color,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct InsertableCategory<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub kind: Kind,
    pub color: &'a str,
}

impl InsertableCategory<'_> {
    pub fn save(self, conn: &mut Conn) -> Result<Category> {
        let category = diesel::insert_into(categories::table)
            .values(self)
            .returning(Category::as_returning())
            .get_result(conn)?;

        log::info!("Created category {}", category.id);
        Ok(category)
    }
}
