use crate::{
    cache::CacheKey,
    category::Category,
    essentials::*,
    gateway::{Remote, Removal},
    schema::transactions,
};

use diesel::prelude::*;

pub mod change;
pub mod new;

pub use change::TransactionPatch;
pub use new::NewTransaction;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Transaction {
    pub id: Id,
    pub name: String,
    pub amount: i64,
    pub category_id: i64,
    pub kind: Kind,
    pub month: i32,
    pub year: i32,
}

impl Transaction {
    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }

    pub fn find(conn: &mut Conn, user_id: &str, id: i64) -> Result<Self> {
        transactions::table
            .filter(transactions::id.eq(id))
            .filter(transactions::user_id.eq(user_id))
            .select(Transaction::as_select())
            .first(conn)
            .map_err(|e| Error::from_diesel_error(e, "Transaction"))
    }

    pub fn for_month(conn: &mut Conn, user_id: &str, period: Period) -> Result<Vec<Self>> {
        Ok(transactions::table
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::year.eq(period.year))
            .filter(transactions::month.eq(period.month))
            .order(transactions::id)
            .select(Transaction::as_select())
            .load(conn)?)
    }

    pub fn for_year(conn: &mut Conn, user_id: &str, year: i32) -> Result<Vec<Self>> {
        Ok(transactions::table
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::year.eq(year))
            .order((transactions::month, transactions::id))
            .select(Transaction::as_select())
            .load(conn)?)
    }

    pub fn delete(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        let deleted = diesel::delete(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::user_id.eq(user_id)),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Err(Error::ModelNotFound("Transaction"));
        }

        log::info!("Deleted transaction {id}");
        Ok(Removal::Deleted)
    }
}

impl Remote for Transaction {
    type New = NewTransaction;
    type Patch = TransactionPatch;

    fn id(&self) -> Id {
        self.id
    }

    fn speculative(new: &NewTransaction) -> Self {
        Transaction {
            id: Id::temporary(),
            name: new.name.clone(),
            amount: new.amount,
            category_id: new.category_id,
            kind: new.kind,
            month: new.period.month,
            year: new.period.year,
        }
    }

    fn merge(&mut self, patch: &TransactionPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
    }

    fn insert(conn: &mut Conn, user_id: &str, new: &NewTransaction) -> Result<Self> {
        conn.immediate_transaction(|conn| {
            Category::usable(conn, user_id, new.category_id)?;
            new.save(conn, user_id)
        })
    }

    fn select(conn: &mut Conn, user_id: &str, key: &CacheKey) -> Result<Vec<Self>> {
        match *key {
            CacheKey::Transactions { month, year } => {
                Self::for_month(conn, user_id, Period::new(year, month)?)
            }
            CacheKey::TransactionsByYear { year } => Self::for_year(conn, user_id, year),
            _ => Err(Error::Invalid(format!("Cache key {key} does not hold transactions"))),
        }
    }

    fn change(conn: &mut Conn, user_id: &str, id: i64, patch: &TransactionPatch) -> Result<Self> {
        conn.immediate_transaction(|conn| patch.save(conn, user_id, id))
    }

    fn remove(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal> {
        Self::delete(conn, user_id, id)
    }
}
