use clap::{Args, Subcommand};

use crate::cli::PeriodArgs;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the transactions of a month
    List(List),
    /// Book a new transaction
    Add(Add),
    /// Update a transaction
    Update(Update),
    /// Delete a transaction
    Delete(Delete),
}

#[derive(Args, Clone, Debug)]
pub struct List {
    #[command(flatten, next_help_heading = "Month")]
    pub period: PeriodArgs,
}

#[derive(Args, Clone, Debug)]
pub struct Add {
    /// Amount of the transaction, a positive whole number
    #[arg(allow_negative_numbers = true)]
    pub amount: String,

    /// Describe the transaction
    #[arg(required = true)]
    pub name: Vec<String>,

    /// Id of the category
    #[arg(short, long, value_name = "ID")]
    pub category: String,

    /// Income or expense, the category's kind by default
    #[arg(short, long)]
    pub kind: Option<String>,

    #[command(flatten, next_help_heading = "Month")]
    pub period: PeriodArgs,
}

impl Add {
    pub fn name(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args, Clone, Debug)]
pub struct Update {
    /// Id of the transaction
    pub id: String,

    #[command(flatten, next_help_heading = "Month")]
    pub period: PeriodArgs,

    /// New amount
    #[arg(long, allow_negative_numbers = true, help_heading = "Changes")]
    pub amount: Option<String>,

    /// New description
    #[arg(long, help_heading = "Changes")]
    pub name: Option<String>,

    /// New category id
    #[arg(short, long, value_name = "ID", help_heading = "Changes")]
    pub category: Option<String>,

    /// New kind
    #[arg(short, long, help_heading = "Changes")]
    pub kind: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct Delete {
    /// Id of the transaction
    pub id: String,

    #[command(flatten, next_help_heading = "Month")]
    pub period: PeriodArgs,

    /// Confirm deletion
    #[arg(long)]
    pub confirm: bool,
}
