//! Authenticated access to the relational store
//!
//! Everything goes through the current session: reads only see rows owned by
//! its user, and writes only touch those rows.

use crate::{
    cache::{check_kind, CacheKey, Cached},
    db::Database,
    essentials::*,
    session::Session,
};

use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    /// Still referenced, only marked as deleted
    SoftDeleted,
}

/// An entity the store can create, list, update and delete for a user
pub trait Remote: Cached + Debug {
    type New: Debug + Clone;
    type Patch: Debug + Clone;

    fn id(&self) -> Id;

    /// What the cache shows until the store has answered
    fn speculative(new: &Self::New) -> Self;
    fn merge(&mut self, patch: &Self::Patch);

    fn insert(conn: &mut Conn, user_id: &str, new: &Self::New) -> Result<Self>;
    fn select(conn: &mut Conn, user_id: &str, key: &CacheKey) -> Result<Vec<Self>>;
    fn change(conn: &mut Conn, user_id: &str, id: i64, patch: &Self::Patch) -> Result<Self>;
    fn remove(conn: &mut Conn, user_id: &str, id: i64) -> Result<Removal>;
}

pub trait Gateway {
    fn session(&self) -> &Session;
    fn end_session(&mut self);

    fn create<T: Remote>(&mut self, new: &T::New) -> Result<T>;
    fn list<T: Remote>(&mut self, key: &CacheKey) -> Result<Vec<T>>;
    fn update<T: Remote>(&mut self, id: i64, patch: &T::Patch) -> Result<T>;
    fn delete<T: Remote>(&mut self, id: i64) -> Result<Removal>;
}

/// Gateway over a local SQLite database
pub struct Store {
    conn: Database,
    session: Session,
}

impl Store {
    pub fn new(conn: Database, session: Session) -> Self {
        Self { conn, session }
    }

    pub fn conn(&mut self) -> &mut Conn {
        &mut self.conn
    }
}

impl From<Store> for Database {
    fn from(store: Store) -> Database {
        store.conn
    }
}

impl Gateway for Store {
    fn session(&self) -> &Session {
        &self.session
    }

    fn end_session(&mut self) {
        self.session.end();
    }

    fn create<T: Remote>(&mut self, new: &T::New) -> Result<T> {
        let user_id = self.session.user_id()?;
        T::insert(&mut self.conn, user_id, new)
    }

    fn list<T: Remote>(&mut self, key: &CacheKey) -> Result<Vec<T>> {
        let user_id = self.session.user_id()?;
        check_kind::<T>(key)?;

        log::debug!("Fetching {key}");
        T::select(&mut self.conn, user_id, key)
    }

    fn update<T: Remote>(&mut self, id: i64, patch: &T::Patch) -> Result<T> {
        let user_id = self.session.user_id()?;
        T::change(&mut self.conn, user_id, id, patch)
    }

    fn delete<T: Remote>(&mut self, id: i64) -> Result<Removal> {
        let user_id = self.session.user_id()?;
        let removal = T::remove(&mut self.conn, user_id, id)?;

        log::info!("{removal:?} {} {id}", T::KIND);
        Ok(removal)
    }
}
