use anyhow::Result;
use std::borrow::Cow;

use penny::prelude::*;

use crate::cli::transaction::*;
use crate::config::Config;
use crate::utils::{kind_or_category, report, table_display::ColumnDisplay};

use tabled::{settings::Panel, Table, Tabled};

struct CommandContext<'a> {
    ledger: &'a mut Ledger<Store>,
}

/// A transaction with the name of its category
pub struct TransactionToDisplay(pub Transaction, pub Option<String>);

impl Tabled for TransactionToDisplay {
    const LENGTH: usize = 4;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.0.id.to_column().into(),
            (self.0.amount, self.0.kind).to_column().into(),
            self.0.name.as_str().into(),
            self.1.to_column().into(),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec!["id".into(), "amount".into(), "name".into(), "category".into()]
    }
}

impl TransactionToDisplay {
    pub fn with_categories(transactions: &[Transaction], categories: &[Category]) -> Vec<Self> {
        transactions
            .iter()
            .map(|t| {
                let category = categories
                    .iter()
                    .find(|c| c.id.is_row(t.category_id))
                    .map(|c| c.name.clone());
                TransactionToDisplay(t.clone(), category)
            })
            .collect()
    }
}

pub fn run(config: &Config, command: &Command) -> Result<()> {
    let ledger = &mut config.ledger()?;
    let mut cmd = CommandContext { ledger };

    match &command {
        Command::List(args) => cmd.list(args),
        Command::Add(args) => cmd.add(args),
        Command::Update(args) => cmd.update(args),
        Command::Delete(args) => cmd.delete(args),
    }
}

impl CommandContext<'_> {
    fn list(&mut self, args: &List) -> Result<()> {
        let period = args.period.period()?;

        let categories = self.ledger.categories().map(<[Category]>::to_vec);
        let categories = report(self.ledger, categories)?;
        let transactions = self.ledger.transactions(period).map(<[Transaction]>::to_vec);
        let transactions = report(self.ledger, transactions)?;

        let count = transactions.len();
        if count > 0 {
            println!(
                "{}",
                Table::new(TransactionToDisplay::with_categories(
                    &transactions,
                    &categories
                ))
                .with(Panel::header(format!(
                    "{count} transactions in {}",
                    period.to_column()
                )))
            );
        } else {
            println!("No transactions in {}", period.to_column());
        }

        Ok(())
    }

    fn add(&mut self, args: &Add) -> Result<()> {
        let period = args.period.period()?;
        let kind = kind_or_category(self.ledger, args.kind.as_deref(), &args.category)?;

        let created = self.ledger.create_transaction(&TransactionForm {
            name: &args.name(),
            amount: &args.amount,
            category_id: &args.category,
            kind: &kind,
            month: period.month,
            year: period.year,
        });
        let transaction = report(self.ledger, created)?;

        log::info!("Booked transaction {} in {period}", transaction.id);
        Ok(())
    }

    fn update(&mut self, args: &Update) -> Result<()> {
        let period = args.period.period()?;

        let current = self.ledger.transactions(period).map(|transactions| {
            transactions
                .iter()
                .find(|t| t.id.to_string() == args.id.trim())
                .cloned()
        });
        let Some(current) = report(self.ledger, current)? else {
            anyhow::bail!("Transaction not found in {period}: {}", args.id);
        };

        let amount = current.amount.to_string();
        let category_id = current.category_id.to_string();
        let kind = match (&args.kind, &args.category) {
            (Some(kind), _) => kind.clone(),
            (None, Some(category)) => kind_or_category(self.ledger, None, category)?,
            (None, None) => current.kind.to_string(),
        };

        let updated = self.ledger.edit_transaction(
            period,
            &EditTransactionForm {
                id: &args.id,
                name: args.name.as_deref().unwrap_or(&current.name),
                amount: args.amount.as_deref().unwrap_or(&amount),
                category_id: args.category.as_deref().unwrap_or(&category_id),
                kind: &kind,
            },
        );
        report(self.ledger, updated)?;

        Ok(())
    }

    fn delete(&mut self, args: &Delete) -> Result<()> {
        if !args.confirm || !crate::utils::confirm()? {
            anyhow::bail!("operation requires confirmation");
        }

        let period = args.period.period()?;
        let removed = self.ledger.delete_transaction(period, &args.id);
        report(self.ledger, removed)?;

        Ok(())
    }
}
