use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use penny::Period;

pub mod category;
pub mod recurring;
pub mod report;
pub mod session;
pub mod transaction;

/// Penny control
#[derive(Default, Clone, Debug, Parser)]
#[command(version, infer_subcommands = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Sets a custom config directory
    ///
    /// The default value is $PENNY_CONFIG if it is set, or
    /// $XDG_CONFIG_HOME/penny otherwise
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        global = true,
        help_heading = "Global options"
    )]
    pub config: Option<PathBuf>,

    /// Sets a custom data directory
    ///
    /// The default value is $PENNY_DATA if it is set, or
    /// $XDG_DATA_HOME/penny otherwise
    #[arg(
        short = 'D',
        long,
        value_name = "DIR",
        global = true,
        help_heading = "Global options"
    )]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Who the following commands act for
    Session {
        #[command(subcommand)]
        command: session::Command,
    },
    /// Category related commands
    Category {
        #[command(subcommand)]
        command: category::Command,
    },
    /// Transaction related commands
    Transaction {
        #[command(subcommand)]
        command: transaction::Command,
    },
    /// Recurring transaction related commands
    Recurring {
        #[command(subcommand)]
        command: recurring::Command,
    },
    /// Monthly dashboard and yearly statistics
    Report {
        #[command(subcommand)]
        command: report::Command,
    },
    /// Book this month's transaction of every active recurring transaction
    Materialize {
        /// Value of the authorization header, `Bearer <secret>`
        #[arg(long, value_name = "VALUE")]
        authorization: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Reset the database
    #[command(hide = true)]
    Reset {
        #[arg(long, required = true)]
        confirm: bool,
    },
}

/// A month, defaulting to the current one
#[derive(Args, Clone, Debug, Default)]
pub struct PeriodArgs {
    /// Month, from 1 to 12
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=12))]
    pub month: Option<i32>,

    /// Year
    #[arg(long)]
    pub year: Option<i32>,
}

impl PeriodArgs {
    pub fn period(&self) -> Result<Period> {
        let current = Period::current();
        Ok(Period::new(
            self.year.unwrap_or(current.year),
            self.month.unwrap_or(current.month),
        )?)
    }
}
