use anyhow::Result;

use penny::{prelude::*, stats::Breakdown};

use crate::cli::report::*;
use crate::config::Config;
use crate::transaction::TransactionToDisplay;
use crate::utils::{report, table_display::ColumnDisplay};

use tabled::{builder::Builder as TableBuilder, settings::Panel, Table};

struct CommandContext<'a> {
    ledger: &'a mut Ledger<Store>,
}

pub fn run(config: &Config, command: &Command) -> Result<()> {
    let ledger = &mut config.ledger()?;
    let mut cmd = CommandContext { ledger };

    match &command {
        Command::Month(args) => cmd.month(args),
        Command::Year(args) => cmd.year(args),
    }
}

fn print_breakdown(breakdown: &Breakdown, kind: Kind) {
    let amounts = breakdown.get(kind);
    if amounts.is_empty() {
        return;
    }

    let mut builder = TableBuilder::new();
    push_record!(builder, "category", "amount");
    for amount in amounts {
        push_record!(builder, amount.category.name, amount.amount);
    }

    let title = match kind {
        Kind::Income => "Income by category",
        Kind::Expense => "Expenses by category",
    };
    println!("{}", builder.build().with(Panel::header(title)));
}

impl CommandContext<'_> {
    fn month(&mut self, args: &Month) -> Result<()> {
        let period = args.period.period()?;
        let summary = self.ledger.monthly_summary(period);
        let summary = report(self.ledger, summary)?;

        let mut builder = TableBuilder::new();
        push_record!(builder, "income", "expenses", "balance");
        push_record!(
            builder,
            summary.totals.income,
            summary.totals.expenses,
            summary.totals.balance()
        );
        println!(
            "{}",
            builder
                .build()
                .with(Panel::header(period.to_column()))
        );

        print_breakdown(&summary.breakdown, Kind::Income);
        print_breakdown(&summary.breakdown, Kind::Expense);

        if !summary.latest.is_empty() {
            let categories = self.ledger.categories().map(<[Category]>::to_vec);
            let categories = report(self.ledger, categories)?;
            let latest = TransactionToDisplay::with_categories(&summary.latest, &categories);

            println!(
                "{}",
                Table::new(latest).with(Panel::header("Latest transactions"))
            );
        }

        Ok(())
    }

    fn year(&mut self, args: &Year) -> Result<()> {
        let year = args.year.unwrap_or_else(|| Period::current().year);
        let stats = self.ledger.yearly_stats(year);
        let stats = report(self.ledger, stats)?;

        let mut builder = TableBuilder::new();
        push_record!(builder, "month", "income", "expenses", "balance");
        for month in &stats.months {
            push_record!(
                builder,
                month.period.name(),
                month.totals.income,
                month.totals.expenses,
                month.balance()
            );
        }
        push_record!(
            builder,
            "Total",
            stats.totals.income,
            stats.totals.expenses,
            stats.totals.balance()
        );
        println!(
            "{}",
            builder.build().with(Panel::header(year.to_string()))
        );

        if let (Some(best), Some(worst)) = (stats.best_month(), stats.worst_month()) {
            println!("Best month: {} ({})", best.period.name(), best.balance());
            println!("Worst month: {} ({})", worst.period.name(), worst.balance());
        }

        print_breakdown(&stats.breakdown, Kind::Income);
        print_breakdown(&stats.breakdown, Kind::Expense);

        Ok(())
    }
}
