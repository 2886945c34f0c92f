use anyhow::Result;

#[macro_use]
mod utils;

mod category;
mod cli;
mod config;
mod recurring;
mod report;
mod session;
mod transaction;


use cli::Commands;
use config::Config;
use penny::Materializer;

fn main() -> Result<()> {
    let config = Config::try_parse()?;

    env_logger::Builder::new()
        .filter_level(config.log_level_filter())
        .init();

    let Some(command) = config.command() else {
        anyhow::bail!("No command provided, see --help");
    };

    match command {
        Commands::Session { command } => session::run(&config, command)?,
        Commands::Category { command } => category::run(&config, command)?,
        Commands::Transaction { command } => transaction::run(&config, command)?,
        Commands::Recurring { command } => recurring::run(&config, command)?,
        Commands::Report { command } => report::run(&config, command)?,
        Commands::Materialize {
            authorization,
            period,
        } => {
            let conn = &mut config.database()?;
            let count = Materializer::new(config.cron_secret()).run(
                conn,
                authorization.as_deref(),
                period.period()?,
            )?;
            println!("{count} transactions booked");
        }
        Commands::Reset { confirm } => {
            if *confirm && utils::confirm()? {
                std::fs::remove_file(config.database_path())?;
            } else {
                anyhow::bail!("operation requires confirmation");
            }
        }
    }

    Ok(())
}
