#![cfg(test)]

use crate::{
    cache::{CacheKey, StaleTimes},
    category::{Category, NewCategory},
    date::Period,
    db::{Conn, Database},
    gateway::{Gateway, Remote, Removal, Store},
    kind::Kind,
    ledger::Ledger,
    recurring::{NewRecurring, RecurringTransaction},
    session::Session,
    transaction::{NewTransaction, Transaction},
};
use anyhow::Result;

pub mod prelude {
    pub use crate::essentials::*;
    pub(crate) use crate::test;
    pub use anyhow::Result;
    pub use pretty_assertions::{assert_eq, assert_ne};
}

pub const USER: &str = "alice";

pub fn db() -> Result<Database> {
    let mut db = Database::memory()?;
    db.setup()?;
    Ok(db)
}

/// Store with a session for [`USER`]
pub fn store() -> Result<Store> {
    Ok(Store::new(db()?, Session::user(USER)))
}

pub fn ledger() -> Result<Ledger<Store>> {
    Ok(Ledger::new(store()?, StaleTimes::default()))
}

pub fn category(conn: &mut Conn, name: &str, kind: Kind) -> Result<Category> {
    Ok(NewCategory {
        name: name.to_owned(),
        kind,
        color: "#3b82f6".to_owned(),
    }
    .save(conn, USER)?)
}

pub fn transaction(
    conn: &mut Conn,
    category: &Category,
    amount: i64,
    period: Period,
) -> Result<Transaction> {
    Ok(NewTransaction {
        name: "Groceries".to_owned(),
        amount,
        category_id: category.id.row()?,
        kind: category.kind,
        period,
    }
    .save(conn, USER)?)
}

/// Active, not counting this month
pub fn recurring(conn: &mut Conn, category: &Category, amount: i64) -> Result<RecurringTransaction> {
    Ok(NewRecurring {
        name: "Rent".to_owned(),
        amount,
        category_id: category.id.row()?,
        kind: category.kind,
        count_this_month: None,
    }
    .save(conn, USER)?)
}

/// Gateway whose writes all fail, as if the network was down
pub struct Flaky<G> {
    inner: G,
}

impl<G: Gateway> Flaky<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    fn network_error() -> crate::Error {
        crate::Error::GenericError("network error".into())
    }
}

impl<G: Gateway> Gateway for Flaky<G> {
    fn session(&self) -> &Session {
        self.inner.session()
    }

    fn end_session(&mut self) {
        self.inner.end_session()
    }

    fn create<T: Remote>(&mut self, _new: &T::New) -> crate::Result<T> {
        Err(Self::network_error())
    }

    fn list<T: Remote>(&mut self, key: &CacheKey) -> crate::Result<Vec<T>> {
        self.inner.list(key)
    }

    fn update<T: Remote>(&mut self, _id: i64, _patch: &T::Patch) -> crate::Result<T> {
        Err(Self::network_error())
    }

    fn delete<T: Remote>(&mut self, _id: i64) -> crate::Result<Removal> {
        Err(Self::network_error())
    }
}
