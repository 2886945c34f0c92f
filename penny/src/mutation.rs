//! Optimistic writes
//!
//! A write moves through typed states, each consuming the previous one:
//!
//! - [`Mutation`]: what is asked for, and which cache entry shows it
//! - [`Snapshotted`]: the entry has been captured as it was
//! - [`InFlight`]: the cache shows the speculative outcome, the store hasn't
//!   been asked yet
//! - [`Settled`]: the store answered
//!
//! [`Coordinator::settle`] then either invalidates the entry so the next read
//! fetches what the store holds, or puts the snapshot back and records a
//! [`Notification`].

use crate::{
    cache::{check_kind, Cache, CacheKey, EntityKind, Snapshot},
    essentials::*,
    gateway::{Gateway, Remote, Removal},
};

use std::fmt::{Display, Formatter};

use chrono::Utc;

/// Where a mutation stands, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Snapshotting,
    Speculating,
    AwaitingRemote,
    Reconciling,
    RollingBack,
}

#[derive(Debug, Clone)]
pub enum Operation<T: Remote> {
    Create(T::New),
    Update(i64, T::Patch),
    Delete(i64),
}

impl<T: Remote> Operation<T> {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create(_) => "create",
            Operation::Update(..) => "update",
            Operation::Delete(_) => "delete",
        }
    }
}

#[derive(Debug)]
pub struct Mutation<T: Remote> {
    key: CacheKey,
    related: Vec<CacheKey>,
    operation: Operation<T>,
}

impl<T: Remote> Mutation<T> {
    pub fn new(key: CacheKey, operation: Operation<T>) -> Self {
        Self {
            key,
            related: Vec::new(),
            operation,
        }
    }

    pub fn create(key: CacheKey, new: T::New) -> Self {
        Self::new(key, Operation::Create(new))
    }

    pub fn update(key: CacheKey, id: i64, patch: T::Patch) -> Self {
        Self::new(key, Operation::Update(id, patch))
    }

    pub fn delete(key: CacheKey, id: i64) -> Self {
        Self::new(key, Operation::Delete(id))
    }

    /// Entries that also go stale once the store accepted the write
    pub fn with_related<I: IntoIterator<Item = CacheKey>>(mut self, keys: I) -> Self {
        self.related.extend(keys);
        self
    }

    pub fn key(&self) -> CacheKey {
        self.key
    }

    pub fn operation(&self) -> &Operation<T> {
        &self.operation
    }

    /// Capture the entry as it is, or the fact there is none
    pub fn snapshot(self, cache: &mut Cache) -> Result<Snapshotted<T>> {
        check_kind::<T>(&self.key)?;
        log::debug!("{:?} {}", Phase::Snapshotting, self.key);

        let pending = cache.begin_mutation(&self.key);
        if pending > 0 {
            log::warn!(
                "{pending} mutation(s) already pending on {}, the last one to settle wins",
                self.key
            );
        }

        let snapshot = cache.get::<T>(&self.key).map(|entry| entry.snapshot());

        Ok(Snapshotted {
            mutation: self,
            snapshot,
        })
    }
}

#[derive(Debug)]
pub struct Snapshotted<T: Remote> {
    mutation: Mutation<T>,
    snapshot: Option<Snapshot<T>>,
}

impl<T: Remote> Snapshotted<T> {
    pub fn snapshot(&self) -> Option<&Snapshot<T>> {
        self.snapshot.as_ref()
    }

    /// Show the outcome of the write in the cache before the store has it
    pub fn speculate(self, cache: &mut Cache) -> Result<InFlight<T>> {
        let Snapshotted { mutation, snapshot } = self;
        log::debug!("{:?} {}", Phase::Speculating, mutation.key);

        let mut provisional = None;
        match &mutation.operation {
            Operation::Create(new) => {
                let record = T::speculative(new);
                provisional = Some(record.id());
                cache.patch(mutation.key, |items: &mut Vec<T>| items.push(record))?;
            }
            Operation::Update(id, patch) => {
                cache.patch(mutation.key, |items: &mut Vec<T>| {
                    items
                        .iter_mut()
                        .filter(|item| item.id().is_row(*id))
                        .for_each(|item| item.merge(patch))
                })?;
            }
            Operation::Delete(id) => {
                cache.patch(mutation.key, |items: &mut Vec<T>| {
                    items.retain(|item| !item.id().is_row(*id))
                })?;
            }
        }

        Ok(InFlight {
            mutation,
            snapshot,
            provisional,
        })
    }
}

#[derive(Debug)]
pub struct InFlight<T: Remote> {
    mutation: Mutation<T>,
    snapshot: Option<Snapshot<T>>,
    provisional: Option<Id>,
}

impl<T: Remote> InFlight<T> {
    pub fn key(&self) -> CacheKey {
        self.mutation.key
    }

    /// Temporary id of the record a create put in the cache
    pub fn provisional(&self) -> Option<Id> {
        self.provisional
    }

    pub fn dispatch<G: Gateway>(self, gateway: &mut G) -> Settled<T> {
        log::debug!("{:?} {}", Phase::AwaitingRemote, self.mutation.key);

        let outcome = match &self.mutation.operation {
            Operation::Create(new) => gateway.create::<T>(new).map(Outcome::Created),
            Operation::Update(id, patch) => gateway.update::<T>(*id, patch).map(Outcome::Updated),
            Operation::Delete(id) => gateway.delete::<T>(*id).map(Outcome::Deleted),
        };

        Settled {
            mutation: self.mutation,
            snapshot: self.snapshot,
            outcome,
        }
    }

    /// Settle with an answer obtained some other way
    pub fn resolve(self, outcome: Result<Outcome<T>>) -> Settled<T> {
        Settled {
            mutation: self.mutation,
            snapshot: self.snapshot,
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Created(T),
    Updated(T),
    Deleted(Removal),
}

impl<T> Outcome<T> {
    pub fn into_record(self) -> Result<T> {
        match self {
            Outcome::Created(record) | Outcome::Updated(record) => Ok(record),
            Outcome::Deleted(_) => Err(Error::Invalid("Deletion has no record".to_owned())),
        }
    }

    pub fn into_removal(self) -> Result<Removal> {
        match self {
            Outcome::Deleted(removal) => Ok(removal),
            _ => Err(Error::Invalid("Only deletions have a removal".to_owned())),
        }
    }
}

#[derive(Debug)]
pub struct Settled<T: Remote> {
    mutation: Mutation<T>,
    snapshot: Option<Snapshot<T>>,
    outcome: Result<Outcome<T>>,
}

impl<T: Remote> Settled<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Message for the user about a write the store refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: CacheKey,
    pub message: String,
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Owns the cache, and runs every write against it
#[derive(Default)]
pub struct Coordinator {
    cache: Cache,
    notifications: Vec<Notification>,
}

impl Coordinator {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            notifications: Vec::new(),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Forget everything, as when the session ends
    pub fn clear(&mut self) {
        self.cache.clear();
        self.notifications.clear();
    }

    pub fn invalidate_kind(&mut self, kind: EntityKind) {
        self.cache.invalidate_kind(kind);
    }

    /// Items of `key`, fetched from the store when missing, stale or too old
    pub fn read<T: Remote, G: Gateway>(&mut self, gateway: &mut G, key: CacheKey) -> Result<&[T]> {
        if self.cache.needs_fetch(&key, Utc::now()) {
            let items = gateway.list::<T>(&key)?;
            self.cache.set(key, items)?;
        }

        Ok(self
            .cache
            .get::<T>(&key)
            .map(|entry| entry.items())
            .unwrap_or_default())
    }

    pub fn begin<T: Remote>(&mut self, mutation: Mutation<T>) -> Result<InFlight<T>> {
        mutation.snapshot(&mut self.cache)?.speculate(&mut self.cache)
    }

    pub fn settle<T: Remote>(&mut self, settled: Settled<T>) -> Result<Outcome<T>> {
        let Settled {
            mutation,
            snapshot,
            outcome,
        } = settled;
        let key = mutation.key;
        self.cache.end_mutation(&key);

        match outcome {
            Ok(outcome) => {
                log::debug!("{:?} {key}", Phase::Reconciling);
                self.cache.invalidate(&key);
                for related in &mutation.related {
                    self.cache.invalidate(related);
                }

                log::debug!("{:?} {key}", Phase::Idle);
                Ok(outcome)
            }
            Err(error) => {
                log::debug!("{:?} {key}", Phase::RollingBack);
                log::error!(
                    "Failed to {} {}, rolling back {key}: {error}",
                    mutation.operation.verb(),
                    T::KIND
                );
                self.cache.restore(key, snapshot)?;
                self.notifications.push(Notification {
                    key,
                    message: format!(
                        "Failed to {} {}: {}",
                        mutation.operation.verb(),
                        T::KIND,
                        error.root()
                    ),
                });

                log::debug!("{:?} {key}", Phase::Idle);
                Err(Error::RemoteWrite(Box::new(error)))
            }
        }
    }

    /// Run a write through every phase
    pub fn execute<T: Remote, G: Gateway>(
        &mut self,
        gateway: &mut G,
        mutation: Mutation<T>,
    ) -> Result<Outcome<T>> {
        let in_flight = self.begin(mutation)?;
        let settled = in_flight.dispatch(gateway);
        self.settle(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cached;
    use crate::category::{Category, CategoryPatch, NewCategory};
    use crate::test::prelude::{assert_eq, Result, *};
    use crate::transaction::{NewTransaction, Transaction};

    fn food() -> NewCategory {
        NewCategory {
            name: "Food".to_owned(),
            kind: Kind::Expense,
            color: "#ff0000".to_owned(),
        }
    }

    fn entry<T: Cached>(coordinator: &Coordinator, key: CacheKey) -> Option<Snapshot<T>> {
        coordinator.cache().get::<T>(&key).map(|e| e.snapshot())
    }

    #[test]
    fn create_reconciles() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;

        let in_flight = coordinator.begin(Mutation::<Category>::create(CacheKey::Categories, food()))?;
        let provisional = in_flight.provisional().unwrap();
        assert!(provisional.is_temporary());

        // Visible before the store answered
        let speculative = entry::<Category>(&coordinator, CacheKey::Categories).unwrap();
        assert_eq!(1, speculative.items.len());
        assert_eq!(provisional, speculative.items[0].id);

        let settled = in_flight.dispatch(&mut store);
        assert!(settled.is_success());
        let created = coordinator.settle(settled)?.into_record()?;
        assert!(!created.id.is_temporary());
        assert!(coordinator.cache().get::<Category>(&CacheKey::Categories).unwrap().is_stale());

        let categories = coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;
        assert_eq!(vec![created], categories.to_vec());

        Ok(())
    }

    #[test]
    fn failed_update_rolls_back() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        store.create::<Category>(&food())?;
        let before = coordinator
            .read::<Category, _>(&mut store, CacheKey::Categories)?
            .to_vec();
        let snapshot = entry::<Category>(&coordinator, CacheKey::Categories);

        let mut flaky = test::Flaky::new(store);
        let patch = CategoryPatch {
            color: Some("#00ff00".to_owned()),
            ..Default::default()
        };
        let in_flight = coordinator.begin(Mutation::<Category>::update(
            CacheKey::Categories,
            before[0].id.row()?,
            patch,
        ))?;
        let speculative = entry::<Category>(&coordinator, CacheKey::Categories).unwrap();
        assert_eq!("#00ff00", speculative.items[0].color);

        let error = coordinator.settle(in_flight.dispatch(&mut flaky)).unwrap_err();
        assert!(matches!(error, Error::RemoteWrite(_)));

        assert_eq!(snapshot, entry::<Category>(&coordinator, CacheKey::Categories));
        assert_eq!(1, coordinator.notifications().len());
        assert_eq!(
            "Failed to update category: Generic error. network error",
            coordinator.notifications()[0].message
        );
        assert_eq!(
            0,
            coordinator
                .cache()
                .get::<Category>(&CacheKey::Categories)
                .unwrap()
                .in_flight()
        );

        Ok(())
    }

    #[test]
    fn failed_create_leaves_nothing() -> Result<()> {
        let mut flaky = test::Flaky::new(test::store()?);
        let mut coordinator = Coordinator::default();

        // No entry before: none after
        let result = coordinator.execute(&mut flaky, Mutation::<Category>::create(CacheKey::Categories, food()));
        assert!(result.is_err());
        assert!(!coordinator.cache().contains(&CacheKey::Categories));

        // With an entry: no speculative record left behind
        coordinator.read::<Category, _>(&mut flaky, CacheKey::Categories)?;
        let snapshot = entry::<Category>(&coordinator, CacheKey::Categories);
        coordinator
            .execute(&mut flaky, Mutation::<Category>::create(CacheKey::Categories, food()))
            .unwrap_err();
        assert_eq!(snapshot, entry::<Category>(&coordinator, CacheKey::Categories));
        assert!(entry::<Category>(&coordinator, CacheKey::Categories)
            .unwrap()
            .items
            .iter()
            .all(|c| !c.id.is_temporary()));

        assert_eq!(2, coordinator.take_notifications().len());
        assert!(coordinator.notifications().is_empty());

        Ok(())
    }

    #[test]
    fn delete_reconciles_related() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        let category = test::category(store.conn(), "Food", Kind::Expense)?;
        let period = Period::new(2024, 3)?;
        let transaction = test::transaction(store.conn(), &category, 10, period)?;
        let by_year = CacheKey::TransactionsByYear { year: 2024 };

        coordinator.read::<Transaction, _>(&mut store, period.key())?;
        coordinator.read::<Transaction, _>(&mut store, by_year)?;

        let in_flight = coordinator.begin(
            Mutation::<Transaction>::delete(period.key(), transaction.id.row()?).with_related([by_year]),
        )?;
        assert!(entry::<Transaction>(&coordinator, period.key()).unwrap().items.is_empty());

        let removal = coordinator.settle(in_flight.dispatch(&mut store))?.into_removal()?;
        assert_eq!(Removal::Deleted, removal);
        assert!(coordinator.cache().get::<Transaction>(&by_year).unwrap().is_stale());
        assert!(coordinator.read::<Transaction, _>(&mut store, by_year)?.is_empty());

        Ok(())
    }

    #[test]
    fn unauthorized_rolls_back() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;
        let snapshot = entry::<Category>(&coordinator, CacheKey::Categories);

        store.end_session();
        let error = coordinator
            .execute(&mut store, Mutation::<Category>::create(CacheKey::Categories, food()))
            .unwrap_err();
        assert!(error.is_unauthorized());
        assert_eq!(snapshot, entry::<Category>(&coordinator, CacheKey::Categories));

        Ok(())
    }

    #[test]
    fn interleaved_last_settled_wins() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        let category = store.create::<Category>(&food())?;
        let id = category.id.row()?;
        coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;

        let patch = |color: &str| CategoryPatch {
            color: Some(color.to_owned()),
            ..Default::default()
        };
        let first = coordinator.begin(Mutation::<Category>::update(CacheKey::Categories, id, patch("#111")))?;
        let second = coordinator.begin(Mutation::<Category>::update(CacheKey::Categories, id, patch("#222")))?;
        assert_eq!(
            2,
            coordinator.cache().get::<Category>(&CacheKey::Categories).unwrap().in_flight()
        );

        coordinator.settle(first.dispatch(&mut store))?;
        coordinator.settle(second.dispatch(&mut store))?;

        let categories = coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;
        assert_eq!("#222", categories[0].color);
        assert_eq!(
            0,
            coordinator.cache().get::<Category>(&CacheKey::Categories).unwrap().in_flight()
        );

        Ok(())
    }

    #[test]
    fn interleaved_success_then_failure() -> Result<()> {
        let mut store = test::store()?;
        let mut coordinator = Coordinator::default();
        let category = store.create::<Category>(&food())?;
        let id = category.id.row()?;
        coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;

        let patch = |color: &str| CategoryPatch {
            color: Some(color.to_owned()),
            ..Default::default()
        };
        let failing = coordinator.begin(Mutation::<Category>::update(CacheKey::Categories, id, patch("#111")))?;
        let passing = coordinator.begin(Mutation::<Category>::update(CacheKey::Categories, id, patch("#222")))?;

        coordinator.settle(passing.dispatch(&mut store))?;
        coordinator
            .settle(failing.resolve(Err(Error::GenericError("network error".into()))))
            .unwrap_err();

        // The rollback predates the successful write, so it can't be trusted
        assert!(coordinator
            .cache()
            .get::<Category>(&CacheKey::Categories)
            .unwrap()
            .is_stale());

        let categories = coordinator.read::<Category, _>(&mut store, CacheKey::Categories)?;
        assert_eq!("#222", categories[0].color);
        assert_eq!(1, coordinator.notifications().len());

        Ok(())
    }

    #[test]
    fn wrong_key_kind() -> Result<()> {
        let mut coordinator = Coordinator::default();

        let new = NewTransaction {
            name: "Groceries".to_owned(),
            amount: 10,
            category_id: 1,
            kind: Kind::Expense,
            period: Period::new(2024, 3)?,
        };
        assert!(coordinator
            .begin(Mutation::<Transaction>::create(CacheKey::Categories, new))
            .is_err());
        assert!(coordinator.cache().is_empty());

        Ok(())
    }

    #[test]
    fn resolve() -> Result<()> {
        let mut coordinator = Coordinator::default();
        coordinator.cache.set::<Category>(CacheKey::Categories, vec![])?;
        let snapshot = entry::<Category>(&coordinator, CacheKey::Categories);

        let in_flight = coordinator.begin(Mutation::<Category>::create(CacheKey::Categories, food()))?;
        let settled = in_flight.resolve(Err(Error::NonUnique("Food".to_owned())));
        assert!(!settled.is_success());
        coordinator.settle(settled).unwrap_err();

        assert_eq!(snapshot, entry::<Category>(&coordinator, CacheKey::Categories));
        assert_eq!(
            "Failed to create category: Conflict with existing data. Food",
            coordinator.notifications()[0].to_string()
        );

        Ok(())
    }
}
