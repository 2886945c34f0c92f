use crate::{category::Category, essentials::*, transaction::Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    pub category: Category,
    pub amount: i64,
}

/// Amounts per category, for each kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    pub income: Vec<CategoryAmount>,
    pub expenses: Vec<CategoryAmount>,
}

impl Breakdown {
    /// Only categories with a non-zero amount are kept, largest first
    ///
    /// A transaction counts toward a category only when both share the same
    /// kind.
    pub fn new(categories: &[Category], transactions: &[Transaction]) -> Self {
        Self {
            income: Self::for_kind(Kind::Income, categories, transactions),
            expenses: Self::for_kind(Kind::Expense, categories, transactions),
        }
    }

    fn for_kind(kind: Kind, categories: &[Category], transactions: &[Transaction]) -> Vec<CategoryAmount> {
        let mut amounts = categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|category| CategoryAmount {
                category: category.clone(),
                amount: transactions
                    .iter()
                    .filter(|t| t.kind == kind && category.id.is_row(t.category_id))
                    .fold(0i64, |sum, t| sum.saturating_add(t.amount)),
            })
            .filter(|c| c.amount != 0)
            .collect::<Vec<_>>();

        amounts.sort_by(|a, b| b.amount.cmp(&a.amount));
        amounts
    }

    pub fn get(&self, kind: Kind) -> &[CategoryAmount] {
        match kind {
            Kind::Income => &self.income,
            Kind::Expense => &self.expenses,
        }
    }
}
