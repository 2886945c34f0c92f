use crate::essentials::*;

use std::fmt::{Display, Formatter};
use std::path::Path;

use diesel::{
    backend::Backend,
    connection::SimpleConnection,
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::BigInt,
    sqlite::Sqlite,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use uuid::Uuid;

pub type Conn = SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(derive_more::Deref, derive_more::DerefMut)]
pub struct Database(Conn);

impl From<Database> for Conn {
    fn from(database: Database) -> Conn {
        database.0
    }
}

impl Database {
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let url = path
            .to_str()
            .ok_or_else(|| Error::Invalid(format!("Database path is not valid UTF-8: {}", path.display())))?;

        Self::establish(url)
    }

    pub fn memory() -> Result<Self> {
        Self::establish(":memory:")
    }

    fn establish(url: &str) -> Result<Self> {
        let mut conn = Conn::establish(url)?;
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        Ok(Database(conn))
    }

    /// Bring the schema up to date
    pub fn setup(&mut self) -> Result<()> {
        let applied = self.0.run_pending_migrations(MIGRATIONS)?;
        if !applied.is_empty() {
            log::debug!("Applied {} migration(s)", applied.len());
        }
        Ok(())
    }
}

/// Identifier of a stored row, or of a record that only exists in the cache
/// while its creation is in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromSqlRow, AsExpression)]
#[diesel(sql_type = BigInt)]
pub enum Id {
    Row(i64),
    Temporary(Uuid),
}

impl Id {
    pub fn temporary() -> Self {
        Id::Temporary(Uuid::new_v4())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Id::Temporary(_))
    }

    pub fn is_row(&self, id: i64) -> bool {
        *self == Id::Row(id)
    }

    pub fn row(&self) -> Result<i64> {
        match self {
            Id::Row(id) => Ok(*id),
            Id::Temporary(_) => Err(Error::NotPersisted),
        }
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::Row(id)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Id::Row(id) => write!(f, "{id}"),
            Id::Temporary(uuid) => write!(f, "temp-{uuid}"),
        }
    }
}

impl ToSql<BigInt, Sqlite> for Id {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        match self {
            Id::Row(id) => {
                out.set_value(*id);
                Ok(IsNull::No)
            }
            Id::Temporary(_) => Err(Box::new(Error::NotPersisted)),
        }
    }
}

impl FromSql<BigInt, Sqlite> for Id {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        Ok(Id::Row(i64::from_sql(bytes)?))
    }
}
