//! Dashboard and yearly figures, computed from cached lists

use crate::{category::Category, essentials::*, transaction::Transaction};

mod categories;
pub use categories::{Breakdown, CategoryAmount};

/// Number of transactions shown as the latest ones of a month
pub const LATEST_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: i64,
    pub expenses: i64,
}

impl Totals {
    pub fn new<'a, I: IntoIterator<Item = &'a Transaction>>(transactions: I) -> Self {
        transactions
            .into_iter()
            .fold(Totals::default(), |mut totals, t| {
                match t.kind {
                    Kind::Income => totals.income = totals.income.saturating_add(t.amount),
                    Kind::Expense => totals.expenses = totals.expenses.saturating_add(t.amount),
                }
                totals
            })
    }

    /// Saturates instead of wrapping, like the sums themselves
    pub fn balance(&self) -> i64 {
        self.income.saturating_sub(self.expenses)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub period: Period,
    pub totals: Totals,
    pub breakdown: Breakdown,
    /// Most recently created first
    pub latest: Vec<Transaction>,
}

impl MonthlySummary {
    pub fn new(period: Period, categories: &[Category], transactions: &[Transaction]) -> Self {
        let mut latest = transactions.to_vec();
        latest.sort_by_key(|t| std::cmp::Reverse(t.id.row().unwrap_or(i64::MAX)));
        latest.truncate(LATEST_COUNT);

        Self {
            period,
            totals: Totals::new(transactions),
            breakdown: Breakdown::new(categories, transactions),
            latest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthStats {
    pub period: Period,
    pub totals: Totals,
}

impl MonthStats {
    pub fn balance(&self) -> i64 {
        self.totals.balance()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    pub year: i32,
    pub totals: Totals,
    /// January to December
    pub months: Vec<MonthStats>,
    pub breakdown: Breakdown,
}

impl YearlyStats {
    pub fn new(year: i32, categories: &[Category], transactions: &[Transaction]) -> Self {
        let transactions = transactions
            .iter()
            .filter(|t| t.year == year)
            .cloned()
            .collect::<Vec<_>>();

        let months = (1..=12)
            .map(|month| MonthStats {
                period: Period { year, month },
                totals: Totals::new(transactions.iter().filter(|t| t.month == month)),
            })
            .collect();

        Self {
            year,
            totals: Totals::new(&transactions),
            months,
            breakdown: Breakdown::new(categories, &transactions),
        }
    }

    /// Month with the highest balance, the earliest one on ties
    pub fn best_month(&self) -> Option<&MonthStats> {
        self.months.iter().reduce(|best, month| {
            if month.balance() > best.balance() {
                month
            } else {
                best
            }
        })
    }

    /// Month with the lowest balance, the earliest one on ties
    pub fn worst_month(&self) -> Option<&MonthStats> {
        self.months.iter().reduce(|worst, month| {
            if month.balance() < worst.balance() {
                month
            } else {
                worst
            }
        })
    }
}
