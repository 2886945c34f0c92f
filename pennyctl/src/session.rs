use anyhow::Result;

use crate::cli::session::*;
use crate::config::Config;

pub fn run(config: &Config, command: &Command) -> Result<()> {
    match command {
        Command::Login(args) => login(config, args),
        Command::Logout(_) => logout(config),
        Command::Show(_) => show(config),
    }
}

fn login(config: &Config, args: &Login) -> Result<()> {
    let user = args.user.trim();
    if user.is_empty() {
        anyhow::bail!("User can't be empty");
    }

    config.login(user)?;
    log::info!("Signed in as {user}");
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let mut ledger = config.ledger()?;
    ledger.logout();
    config.logout()
}

fn show(config: &Config) -> Result<()> {
    match config.session()?.user_id() {
        Ok(user) => println!("Signed in as {user}"),
        Err(_) => println!("Not signed in"),
    }
    Ok(())
}
