pub mod cache;
pub mod category;
pub mod date;
pub mod db;
pub mod gateway;
pub mod kind;
pub mod ledger;
pub mod mutation;
pub mod recurring;
pub mod result;
pub mod schema;
pub mod session;
pub mod stats;
pub mod transaction;
pub mod validate;

mod test;

pub use cache::{Cache, CacheKey, StaleTimes};
pub use category::Category;
pub use date::Period;
pub use db::{Database, Id};
pub use gateway::{Gateway, Removal, Store};
pub use kind::Kind;
pub use ledger::Ledger;
pub use recurring::{Materializer, RecurringTransaction};
pub use result::{Error, Result};
pub use session::Session;
pub use transaction::Transaction;

mod essentials {
    pub use crate::{
        date::Period,
        db::{Conn, Id},
        kind::Kind,
        result::{Error, OptionalExtension, Result},
    };
}

pub mod prelude {
    pub use crate::{
        cache::{CacheKey, StaleTimes},
        category::{Category, CategoryPatch, NewCategory},
        date::Period,
        db::{Conn, Database, Id},
        gateway::{Gateway, Removal, Store},
        kind::Kind,
        ledger::Ledger,
        mutation::Notification,
        recurring::{Materializer, RecurringTransaction},
        result::{Error, OptionalExtension, Result},
        session::Session,
        stats::{MonthlySummary, YearlyStats},
        transaction::Transaction,
        validate::{
            CategoryForm, EditCategoryForm, EditTransactionForm, RecurringForm,
            ToggleRecurringForm, TransactionForm, ValidationError,
        },
    };
}
