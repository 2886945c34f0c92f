//! Last-known query results, keyed by what was asked for
//!
//! The cache is a plain owned value: whoever holds it (normally the
//! [`Coordinator`](crate::mutation::Coordinator)) decides when it is read,
//! written, invalidated or dropped. It never talks to the store by itself.

use crate::{
    category::Category, essentials::*, recurring::RecurringTransaction, transaction::Transaction,
};

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EntityKind {
    #[display("category")]
    Category,
    #[display("transaction")]
    Transaction,
    #[display("recurring transaction")]
    Recurring,
}

/// Entity kind plus the filter parameters of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Categories,
    Transactions { month: i32, year: i32 },
    TransactionsByYear { year: i32 },
    Recurring,
}

impl CacheKey {
    pub fn kind(&self) -> EntityKind {
        match self {
            CacheKey::Categories => EntityKind::Category,
            CacheKey::Transactions { .. } | CacheKey::TransactionsByYear { .. } => {
                EntityKind::Transaction
            }
            CacheKey::Recurring => EntityKind::Recurring,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Categories => f.write_str("[category]"),
            CacheKey::Transactions { month, year } => write!(f, "[transaction, {month}, {year}]"),
            CacheKey::TransactionsByYear { year } => write!(f, "[transactions, {year}]"),
            CacheKey::Recurring => f.write_str("[recurring]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    items: Vec<T>,
    stale: bool,
    fetched_at: Option<DateTime<Utc>>,
    in_flight: usize,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            stale: false,
            fetched_at: None,
            in_flight: 0,
        }
    }
}

impl<T> Entry<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Number of mutations that snapshotted this entry and haven't settled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl<T: Clone> Entry<T> {
    /// Contents of the entry, without the mutation bookkeeping
    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items.clone(),
            stale: self.stale,
            fetched_at: self.fetched_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub stale: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

pub enum Slot {
    Categories(Entry<Category>),
    Transactions(Entry<Transaction>),
    Recurring(Entry<RecurringTransaction>),
}

impl Slot {
    fn in_flight_mut(&mut self) -> &mut usize {
        match self {
            Slot::Categories(entry) => &mut entry.in_flight,
            Slot::Transactions(entry) => &mut entry.in_flight,
            Slot::Recurring(entry) => &mut entry.in_flight,
        }
    }

    fn invalidate(&mut self) {
        match self {
            Slot::Categories(entry) => entry.stale = true,
            Slot::Transactions(entry) => entry.stale = true,
            Slot::Recurring(entry) => entry.stale = true,
        }
    }
}

/// Types the cache knows how to hold
pub trait Cached: Clone + Sized {
    const KIND: EntityKind;

    fn into_slot(entry: Entry<Self>) -> Slot;
    fn entry(slot: &Slot) -> Option<&Entry<Self>>;
    fn entry_mut(slot: &mut Slot) -> Option<&mut Entry<Self>>;
}

macro_rules! cached {
    ($type:ty, $kind:ident, $variant:ident) => {
        impl Cached for $type {
            const KIND: EntityKind = EntityKind::$kind;

            fn into_slot(entry: Entry<Self>) -> Slot {
                Slot::$variant(entry)
            }

            fn entry(slot: &Slot) -> Option<&Entry<Self>> {
                match slot {
                    Slot::$variant(entry) => Some(entry),
                    _ => None,
                }
            }

            fn entry_mut(slot: &mut Slot) -> Option<&mut Entry<Self>> {
                match slot {
                    Slot::$variant(entry) => Some(entry),
                    _ => None,
                }
            }
        }
    };
}

cached!(Category, Category, Categories);
cached!(Transaction, Transaction, Transactions);
cached!(RecurringTransaction, Recurring, Recurring);

/// How long a fetched entry is trusted before a read goes back to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleTimes {
    pub categories: Duration,
    pub transactions: Duration,
    pub recurring: Duration,
}

impl Default for StaleTimes {
    fn default() -> Self {
        Self {
            categories: Duration::minutes(15),
            transactions: Duration::minutes(5),
            recurring: Duration::minutes(15),
        }
    }
}

impl StaleTimes {
    pub fn for_kind(&self, kind: EntityKind) -> Duration {
        match kind {
            EntityKind::Category => self.categories,
            EntityKind::Transaction => self.transactions,
            EntityKind::Recurring => self.recurring,
        }
    }
}

#[derive(Default)]
pub struct Cache {
    slots: HashMap<CacheKey, Slot>,
    stale_times: StaleTimes,
}

pub(crate) fn check_kind<T: Cached>(key: &CacheKey) -> Result<()> {
    if key.kind() == T::KIND {
        Ok(())
    } else {
        Err(Error::Invalid(format!(
            "Cache key {key} does not hold {} entries",
            T::KIND
        )))
    }
}

impl Cache {
    pub fn new(stale_times: StaleTimes) -> Self {
        Self {
            slots: HashMap::new(),
            stale_times,
        }
    }

    pub fn stale_times(&self) -> &StaleTimes {
        &self.stale_times
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn get<T: Cached>(&self, key: &CacheKey) -> Option<&Entry<T>> {
        self.slots.get(key).and_then(T::entry)
    }

    /// Replace the entry with freshly fetched items
    pub fn set<T: Cached>(&mut self, key: CacheKey, items: Vec<T>) -> Result<()> {
        check_kind::<T>(&key)?;

        let entry = self.entry_mut::<T>(key);
        entry.items = items;
        entry.stale = false;
        entry.fetched_at = Some(Utc::now());

        Ok(())
    }

    /// Transform the items in place, creating an empty entry if needed
    ///
    /// A created entry has never been fetched, so it still needs a read.
    pub fn patch<T, F>(&mut self, key: CacheKey, f: F) -> Result<()>
    where
        T: Cached,
        F: FnOnce(&mut Vec<T>),
    {
        check_kind::<T>(&key)?;

        f(&mut self.entry_mut::<T>(key).items);
        Ok(())
    }

    /// Put back what a snapshot captured, or drop the entry if there was
    /// nothing to capture
    ///
    /// An entry another write already invalidated, or still has pending, is
    /// left stale: the snapshot may predate that write.
    pub fn restore<T: Cached>(&mut self, key: CacheKey, snapshot: Option<Snapshot<T>>) -> Result<()> {
        check_kind::<T>(&key)?;

        match snapshot {
            Some(Snapshot {
                items,
                stale,
                fetched_at,
            }) => {
                let entry = self.entry_mut::<T>(key);
                let overtaken = entry.stale || entry.in_flight > 0;
                entry.items = items;
                entry.stale = stale || overtaken;
                entry.fetched_at = fetched_at;
            }
            None => {
                self.slots.remove(&key);
            }
        }

        Ok(())
    }

    /// Mark the entry stale so the next read goes to the store
    ///
    /// Returns whether there was an entry to invalidate.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.invalidate();
                true
            }
            None => false,
        }
    }

    pub fn invalidate_kind(&mut self, kind: EntityKind) {
        for (_, slot) in self.slots.iter_mut().filter(|(key, _)| key.kind() == kind) {
            slot.invalidate();
        }
    }

    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.slots.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Whether a read of `key` at `now` has to go to the store
    pub fn needs_fetch(&self, key: &CacheKey, now: DateTime<Utc>) -> bool {
        let Some(slot) = self.slots.get(key) else {
            return true;
        };

        let (stale, fetched_at) = match slot {
            Slot::Categories(entry) => (entry.stale, entry.fetched_at),
            Slot::Transactions(entry) => (entry.stale, entry.fetched_at),
            Slot::Recurring(entry) => (entry.stale, entry.fetched_at),
        };

        match fetched_at {
            Some(fetched_at) if !stale => now - fetched_at >= self.stale_times.for_kind(key.kind()),
            _ => true,
        }
    }

    /// Register a mutation on `key`, returning how many were already pending
    pub(crate) fn begin_mutation(&mut self, key: &CacheKey) -> usize {
        match self.slots.get_mut(key) {
            Some(slot) => {
                let in_flight = slot.in_flight_mut();
                *in_flight += 1;
                *in_flight - 1
            }
            None => 0,
        }
    }

    pub(crate) fn end_mutation(&mut self, key: &CacheKey) {
        if let Some(slot) = self.slots.get_mut(key) {
            let in_flight = slot.in_flight_mut();
            *in_flight = in_flight.saturating_sub(1);
        }
    }

    /// Callers have checked the key kind; a slot of another type is replaced
    pub(crate) fn entry_mut<T: Cached>(&mut self, key: CacheKey) -> &mut Entry<T> {
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| T::into_slot(Entry::default()));

        if T::entry(slot).is_none() {
            *slot = T::into_slot(Entry::default());
        }

        match T::entry_mut(slot) {
            Some(entry) => entry,
            None => unreachable!("slot was just made to hold {}", T::KIND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::{assert_eq, Result, *};

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.to_owned(),
            kind: Kind::Expense,
            color: "#ff0000".to_owned(),
            deleted_at: None,
        }
    }

    #[test]
    fn get_set() -> Result<()> {
        let mut cache = Cache::default();
        assert!(cache.get::<Category>(&CacheKey::Categories).is_none());

        cache.set(CacheKey::Categories, vec![category(1, "Food")])?;
        let entry = cache.get::<Category>(&CacheKey::Categories).unwrap();
        assert_eq!(1, entry.items().len());
        assert!(!entry.is_stale());
        assert!(entry.fetched_at().is_some());

        // Wrong kind for the key
        assert!(cache.get::<Transaction>(&CacheKey::Categories).is_none());
        assert!(cache.set::<Transaction>(CacheKey::Categories, vec![]).is_err());
        assert!(cache.set::<Category>(CacheKey::Recurring, vec![]).is_err());

        Ok(())
    }

    #[test]
    fn patch() -> Result<()> {
        let mut cache = Cache::default();

        cache.patch(CacheKey::Categories, |items: &mut Vec<Category>| {
            items.push(category(1, "Food"))
        })?;
        let entry = cache.get::<Category>(&CacheKey::Categories).unwrap();
        assert_eq!("Food", entry.items()[0].name);
        // Never fetched
        assert!(cache.needs_fetch(&CacheKey::Categories, Utc::now()));

        cache.set(CacheKey::Categories, vec![category(1, "Food")])?;
        cache.patch(CacheKey::Categories, |items: &mut Vec<Category>| items[0].name = "Rent".to_owned())?;
        assert_eq!("Rent", cache.get::<Category>(&CacheKey::Categories).unwrap().items()[0].name);
        assert!(!cache.needs_fetch(&CacheKey::Categories, Utc::now()));

        Ok(())
    }

    #[test]
    fn invalidate() -> Result<()> {
        let mut cache = Cache::default();
        let march = CacheKey::Transactions { month: 3, year: 2024 };
        let april = CacheKey::Transactions { month: 4, year: 2024 };

        assert!(!cache.invalidate(&march));

        cache.set::<Transaction>(march, vec![])?;
        cache.set::<Transaction>(april, vec![])?;
        cache.set::<Category>(CacheKey::Categories, vec![])?;

        assert!(cache.invalidate(&march));
        assert!(cache.get::<Transaction>(&march).unwrap().is_stale());
        assert!(!cache.get::<Transaction>(&april).unwrap().is_stale());
        assert!(cache.needs_fetch(&march, Utc::now()));

        cache.invalidate_kind(EntityKind::Transaction);
        assert!(cache.get::<Transaction>(&april).unwrap().is_stale());
        assert!(!cache.get::<Category>(&CacheKey::Categories).unwrap().is_stale());

        // Setting again makes it fresh
        cache.set::<Transaction>(march, vec![])?;
        assert!(!cache.needs_fetch(&march, Utc::now()));

        Ok(())
    }

    #[test]
    fn needs_fetch_after_stale_time() -> Result<()> {
        let mut cache = Cache::new(StaleTimes {
            categories: Duration::minutes(1),
            ..Default::default()
        });

        assert!(cache.needs_fetch(&CacheKey::Categories, Utc::now()));

        cache.set::<Category>(CacheKey::Categories, vec![])?;
        let now = Utc::now();
        assert!(!cache.needs_fetch(&CacheKey::Categories, now));
        assert!(cache.needs_fetch(&CacheKey::Categories, now + Duration::minutes(2)));

        Ok(())
    }

    #[test]
    fn restore() -> Result<()> {
        let mut cache = Cache::default();
        cache.set(CacheKey::Categories, vec![category(1, "Food")])?;
        let snapshot = cache.get::<Category>(&CacheKey::Categories).unwrap().snapshot();

        cache.patch(CacheKey::Categories, |items: &mut Vec<Category>| items.clear())?;
        cache.restore(CacheKey::Categories, Some(snapshot.clone()))?;
        assert_eq!(
            snapshot,
            cache.get::<Category>(&CacheKey::Categories).unwrap().snapshot()
        );

        cache.restore::<Category>(CacheKey::Categories, None)?;
        assert!(!cache.contains(&CacheKey::Categories));

        Ok(())
    }

    #[test]
    fn restore_after_invalidation() -> Result<()> {
        let mut cache = Cache::default();
        cache.set(CacheKey::Categories, vec![category(1, "Food")])?;
        let snapshot = cache.get::<Category>(&CacheKey::Categories).unwrap().snapshot();

        cache.invalidate(&CacheKey::Categories);
        cache.restore(CacheKey::Categories, Some(snapshot.clone()))?;

        let entry = cache.get::<Category>(&CacheKey::Categories).unwrap();
        assert_eq!(snapshot.items, entry.items());
        assert!(entry.is_stale());
        assert!(cache.needs_fetch(&CacheKey::Categories, Utc::now()));

        Ok(())
    }

    #[test]
    fn restore_with_pending_mutation() -> Result<()> {
        let mut cache = Cache::default();
        cache.set(CacheKey::Categories, vec![category(1, "Food")])?;
        let snapshot = cache.get::<Category>(&CacheKey::Categories).unwrap().snapshot();

        cache.begin_mutation(&CacheKey::Categories);
        cache.restore(CacheKey::Categories, Some(snapshot))?;
        assert!(cache
            .get::<Category>(&CacheKey::Categories)
            .unwrap()
            .is_stale());

        Ok(())
    }

    #[test]
    fn mutation_count() -> Result<()> {
        let mut cache = Cache::default();
        assert_eq!(0, cache.begin_mutation(&CacheKey::Recurring));

        cache.set::<RecurringTransaction>(CacheKey::Recurring, vec![])?;
        assert_eq!(0, cache.begin_mutation(&CacheKey::Recurring));
        assert_eq!(1, cache.begin_mutation(&CacheKey::Recurring));
        cache.end_mutation(&CacheKey::Recurring);
        assert_eq!(
            1,
            cache
                .get::<RecurringTransaction>(&CacheKey::Recurring)
                .unwrap()
                .in_flight()
        );

        cache.clear();
        assert!(cache.is_empty());

        Ok(())
    }

    #[test]
    fn display() {
        assert_eq!("[category]", CacheKey::Categories.to_string());
        assert_eq!(
            "[transaction, 3, 2024]",
            CacheKey::Transactions { month: 3, year: 2024 }.to_string()
        );
    }
}
