use anyhow::Result;
use std::borrow::Cow;

use penny::prelude::*;

use crate::cli::recurring::*;
use crate::config::Config;
use crate::utils::{kind_or_category, report, table_display::ColumnDisplay};

use tabled::{Table, Tabled};

struct CommandContext<'a> {
    ledger: &'a mut Ledger<Store>,
}

struct RecurringToDisplay(RecurringTransaction, Option<String>);

impl Tabled for RecurringToDisplay {
    const LENGTH: usize = 5;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.0.id.to_column().into(),
            (self.0.amount, self.0.kind).to_column().into(),
            self.0.name.as_str().into(),
            self.1.to_column().into(),
            self.0.active.to_column().into(),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            "id".into(),
            "amount".into(),
            "name".into(),
            "category".into(),
            "active".into(),
        ]
    }
}

pub fn run(config: &Config, command: &Command) -> Result<()> {
    let ledger = &mut config.ledger()?;
    let mut cmd = CommandContext { ledger };

    match &command {
        Command::List(args) => cmd.list(args),
        Command::Create(args) => cmd.create(args),
        Command::Toggle(args) => cmd.toggle(args),
        Command::Delete(args) => cmd.delete(args),
    }
}

impl CommandContext<'_> {
    fn list(&mut self, _args: &List) -> Result<()> {
        let categories = self.ledger.categories().map(<[Category]>::to_vec);
        let categories = report(self.ledger, categories)?;
        let recurring = self.ledger.recurring().map(<[RecurringTransaction]>::to_vec);

        let rows = report(self.ledger, recurring)?
            .into_iter()
            .map(|r| {
                let category = categories
                    .iter()
                    .find(|c| c.id.is_row(r.category_id))
                    .map(|c| c.name.clone());
                RecurringToDisplay(r, category)
            })
            .collect::<Vec<_>>();

        println!("{}", Table::new(rows));
        Ok(())
    }

    fn create(&mut self, args: &Create) -> Result<()> {
        let kind = kind_or_category(self.ledger, args.kind.as_deref(), &args.category)?;

        let created = self.ledger.create_recurring(
            &RecurringForm {
                name: &args.name(),
                amount: &args.amount,
                category_id: &args.category,
                kind: &kind,
                count_this_month: !args.no_count_this_month,
            },
            Period::current(),
        );
        let recurring = report(self.ledger, created)?;

        log::info!("Created recurring transaction {}", recurring.id);
        Ok(())
    }

    fn toggle(&mut self, args: &Toggle) -> Result<()> {
        let toggled = self.ledger.toggle_recurring(&ToggleRecurringForm {
            id: &args.id,
            active: args.active,
        });
        report(self.ledger, toggled)?;

        Ok(())
    }

    fn delete(&mut self, args: &Delete) -> Result<()> {
        if !args.confirm || !crate::utils::confirm()? {
            anyhow::bail!("operation requires confirmation");
        }

        let removed = self.ledger.delete_recurring(&args.id);
        report(self.ledger, removed)?;

        Ok(())
    }
}
