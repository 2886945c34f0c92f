use crate::{
    cache::{Cache, CacheKey, StaleTimes},
    category::Category,
    essentials::*,
    gateway::{Gateway, Removal},
    mutation::{Coordinator, Mutation, Notification},
    recurring::RecurringTransaction,
    stats::{MonthlySummary, YearlyStats},
    transaction::Transaction,
    validate::{
        self, CategoryForm, EditCategoryForm, EditTransactionForm, RecurringForm,
        ToggleRecurringForm, TransactionForm,
    },
};

/// What a signed-in user does with their money
///
/// Input is validated first, so a rejected form never reaches the cache or
/// the store. Every write then goes through the [`Coordinator`].
pub struct Ledger<G: Gateway> {
    gateway: G,
    coordinator: Coordinator,
}

impl<G: Gateway> Ledger<G> {
    pub fn new(gateway: G, stale_times: StaleTimes) -> Self {
        Self {
            gateway,
            coordinator: Coordinator::new(Cache::new(stale_times)),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn cache(&self) -> &Cache {
        self.coordinator.cache()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.coordinator.notifications()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.coordinator.take_notifications()
    }

    /// End the session and forget everything cached for it
    pub fn logout(&mut self) {
        self.gateway.end_session();
        self.coordinator.clear();
    }

    pub fn categories(&mut self) -> Result<&[Category]> {
        self.coordinator
            .read::<Category, _>(&mut self.gateway, CacheKey::Categories)
    }

    pub fn transactions(&mut self, period: Period) -> Result<&[Transaction]> {
        self.coordinator
            .read::<Transaction, _>(&mut self.gateway, period.key())
    }

    pub fn transactions_by_year(&mut self, year: i32) -> Result<&[Transaction]> {
        self.coordinator
            .read::<Transaction, _>(&mut self.gateway, CacheKey::TransactionsByYear { year })
    }

    pub fn recurring(&mut self) -> Result<&[RecurringTransaction]> {
        self.coordinator
            .read::<RecurringTransaction, _>(&mut self.gateway, CacheKey::Recurring)
    }

    pub fn create_category(&mut self, form: &CategoryForm) -> Result<Category> {
        let new = validate::category(form)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Category>::create(CacheKey::Categories, new),
            )?
            .into_record()
    }

    pub fn edit_category(&mut self, form: &EditCategoryForm) -> Result<Category> {
        let (id, patch) = validate::edit_category(form)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Category>::update(CacheKey::Categories, id, patch),
            )?
            .into_record()
    }

    pub fn delete_category(&mut self, id: &str) -> Result<Removal> {
        let id = validate::delete(id)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Category>::delete(CacheKey::Categories, id),
            )?
            .into_removal()
    }

    pub fn create_transaction(&mut self, form: &TransactionForm) -> Result<Transaction> {
        let new = validate::transaction(form)?;
        let period = new.period;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Transaction>::create(period.key(), new)
                    .with_related([CacheKey::TransactionsByYear { year: period.year }]),
            )?
            .into_record()
    }

    /// `period` is the month the transaction is booked in, which can't change
    pub fn edit_transaction(
        &mut self,
        period: Period,
        form: &EditTransactionForm,
    ) -> Result<Transaction> {
        let (id, patch) = validate::edit_transaction(form)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Transaction>::update(period.key(), id, patch)
                    .with_related([CacheKey::TransactionsByYear { year: period.year }]),
            )?
            .into_record()
    }

    pub fn delete_transaction(&mut self, period: Period, id: &str) -> Result<Removal> {
        let id = validate::delete(id)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<Transaction>::delete(period.key(), id)
                    .with_related([CacheKey::TransactionsByYear { year: period.year }]),
            )?
            .into_removal()
    }

    /// A payment counting this month is also booked in `today`'s month
    pub fn create_recurring(
        &mut self,
        form: &RecurringForm,
        today: Period,
    ) -> Result<RecurringTransaction> {
        let new = validate::recurring(form, today)?;
        let related = new
            .count_this_month
            .map(|period| {
                [
                    period.key(),
                    CacheKey::TransactionsByYear { year: period.year },
                ]
            })
            .into_iter()
            .flatten();

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<RecurringTransaction>::create(CacheKey::Recurring, new)
                    .with_related(related),
            )?
            .into_record()
    }

    pub fn toggle_recurring(&mut self, form: &ToggleRecurringForm) -> Result<RecurringTransaction> {
        let (id, patch) = validate::toggle_recurring(form)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<RecurringTransaction>::update(CacheKey::Recurring, id, patch),
            )?
            .into_record()
    }

    pub fn delete_recurring(&mut self, id: &str) -> Result<Removal> {
        let id = validate::delete(id)?;

        self.coordinator
            .execute(
                &mut self.gateway,
                Mutation::<RecurringTransaction>::delete(CacheKey::Recurring, id),
            )?
            .into_removal()
    }

    pub fn monthly_summary(&mut self, period: Period) -> Result<MonthlySummary> {
        let categories = self.categories()?.to_vec();
        let transactions = self.transactions(period)?;

        Ok(MonthlySummary::new(period, &categories, transactions))
    }

    pub fn yearly_stats(&mut self, year: i32) -> Result<YearlyStats> {
        let categories = self.categories()?.to_vec();
        let transactions = self.transactions_by_year(year)?;

        Ok(YearlyStats::new(year, &categories, transactions))
    }
}
