use anyhow::Result;
use std::borrow::Cow;

use penny::prelude::*;

use crate::cli::category::*;
use crate::config::Config;
use crate::utils::{report, table_display::ColumnDisplay};

use tabled::{Table, Tabled};

struct CommandContext<'a> {
    ledger: &'a mut Ledger<Store>,
}

#[derive(derive_more::From)]
pub struct CategoryToDisplay(Category);

impl Tabled for CategoryToDisplay {
    const LENGTH: usize = 5;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.0.id.to_column().into(),
            self.0.name.as_str().into(),
            self.0.kind.to_column().into(),
            self.0.color.as_str().into(),
            self.0.deleted_at.to_column().into(),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            "id".into(),
            "name".into(),
            "kind".into(),
            "color".into(),
            "deleted".into(),
        ]
    }
}

pub fn run(config: &Config, command: &Command) -> Result<()> {
    let ledger = &mut config.ledger()?;
    let mut cmd = CommandContext { ledger };

    match &command {
        Command::List(args) => cmd.list(args),
        Command::Create(args) => cmd.create(args),
        Command::Update(args) => cmd.update(args),
        Command::Delete(args) => cmd.delete(args),
    }
}

impl CommandContext<'_> {
    fn list(&mut self, args: &List) -> Result<()> {
        let categories = self.ledger.categories().map(<[Category]>::to_vec);
        let categories = report(self.ledger, categories)?
            .into_iter()
            .filter(|c| args.all || !c.is_deleted())
            .map(CategoryToDisplay::from)
            .collect::<Vec<_>>();

        println!("{}", Table::new(categories));
        Ok(())
    }

    fn create(&mut self, args: &Create) -> Result<()> {
        let created = self.ledger.create_category(&CategoryForm {
            name: &args.name,
            kind: &args.kind,
            color: &args.color,
        });
        let category = report(self.ledger, created)?;

        log::info!("Created category {} ({})", category.name, category.id);
        Ok(())
    }

    fn update(&mut self, args: &Update) -> Result<()> {
        let current = self.ledger.categories().map(|categories| {
            categories
                .iter()
                .find(|c| c.id.to_string() == args.id.trim())
                .cloned()
        });
        let (name, color) = match report(self.ledger, current)? {
            Some(category) => (category.name, category.color),
            None => anyhow::bail!("Category not found: {}", args.id),
        };

        let updated = self.ledger.edit_category(&EditCategoryForm {
            id: &args.id,
            name: args.name.as_deref().unwrap_or(&name),
            color: args.color.as_deref().unwrap_or(&color),
        });
        report(self.ledger, updated)?;

        Ok(())
    }

    fn delete(&mut self, args: &Delete) -> Result<()> {
        if !args.confirm || !crate::utils::confirm()? {
            anyhow::bail!("operation requires confirmation");
        }

        let removed = self.ledger.delete_category(&args.id);
        if let Removal::SoftDeleted = report(self.ledger, removed)? {
            println!("Category is still in use, it was marked as deleted");
        }

        Ok(())
    }
}
