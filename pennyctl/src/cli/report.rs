use clap::{Args, Subcommand};

use crate::cli::PeriodArgs;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Dashboard of a month: totals, categories and latest transactions
    Month(Month),
    /// Statistics of a year, month by month
    Year(Year),
}

#[derive(Args, Clone, Debug)]
pub struct Month {
    #[command(flatten, next_help_heading = "Month")]
    pub period: PeriodArgs,
}

#[derive(Args, Clone, Debug)]
pub struct Year {
    /// Year, the current one by default
    #[arg(long)]
    pub year: Option<i32>,
}
