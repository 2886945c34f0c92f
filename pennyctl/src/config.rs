use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Duration;
use toml::{Table, Value};

use penny::prelude::*;

use crate::cli::{Cli, Commands};

const SESSION_KEY: &str = "session_user";

#[derive(Debug)]
pub struct Config {
    pub dir: PathBuf,
    pub data_dir: PathBuf,
    cli: Cli,
    table: Table,
}

impl Config {
    pub fn try_parse() -> Result<Self> {
        Self::try_parse_from(std::env::args_os())
    }

    pub fn try_parse_from<I, T>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::Parser;

        let cli = Cli::try_parse_from(iter)?;

        let dir = match &cli.config {
            Some(dir) => dir.clone(),
            None => config_home()?,
        };
        let table = match std::fs::read_to_string(dir.join("config.toml")) {
            Ok(content) => content.parse::<Table>()?,
            Err(_) => Table::new(),
        };

        let data_dir = match &cli.data {
            Some(dir) => dir.clone(),
            None => match table.get("data_dir").and_then(Value::as_str) {
                Some(dir) => PathBuf::from(dir),
                None => data_home()?,
            },
        };

        if !data_dir.is_dir() {
            return Err(anyhow!(
                "Data directory is not a dir: {}",
                data_dir.display()
            ));
        }

        Ok(Config {
            dir,
            data_dir,
            cli,
            table,
        })
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.cli.verbose.log_level_filter()
    }

    pub fn command(&self) -> Option<&Commands> {
        self.cli.command.as_ref()
    }

    fn section(&self, name: &str) -> Option<&Table> {
        self.table.get(name).and_then(Value::as_table)
    }

    pub fn database_path(&self) -> PathBuf {
        let db_filename = self
            .section("db")
            .and_then(|db| db.get("filename"))
            .and_then(Value::as_str)
            .unwrap_or("db.penny");

        self.data_dir.join(db_filename)
    }

    pub fn database(&self) -> Result<Database> {
        let mut conn = Database::open(self.database_path())?;
        conn.setup()?;
        Ok(conn)
    }

    /// Minutes each cached list is trusted for, from the `[cache]` section
    pub fn stale_times(&self) -> Result<StaleTimes> {
        let mut stale_times = StaleTimes::default();

        if let Some(cache) = self.section("cache") {
            let minutes = |key: &str| -> Result<Option<Duration>> {
                match cache.get(key) {
                    None => Ok(None),
                    Some(Value::Integer(minutes)) if *minutes >= 0 => {
                        Ok(Some(Duration::minutes(*minutes)))
                    }
                    Some(value) => Err(anyhow!("Invalid value for cache.{key}: {value}")),
                }
            };

            if let Some(duration) = minutes("categories_stale_minutes")? {
                stale_times.categories = duration;
            }
            if let Some(duration) = minutes("transactions_stale_minutes")? {
                stale_times.transactions = duration;
            }
            if let Some(duration) = minutes("recurring_stale_minutes")? {
                stale_times.recurring = duration;
            }
        }

        Ok(stale_times)
    }

    /// Secret expected by `materialize`, `$PENNY_CRON_SECRET` taking
    /// precedence over `cron_secret`
    pub fn cron_secret(&self) -> Option<String> {
        match std::env::var("PENNY_CRON_SECRET") {
            Ok(val) if !val.is_empty() => Some(val),
            _ => self
                .table
                .get("cron_secret")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }

    pub fn session(&self) -> Result<Session> {
        Ok(match self.get(SESSION_KEY)? {
            Some(user) if !user.trim().is_empty() => Session::user(user.trim()),
            _ => Session::anonymous(),
        })
    }

    pub fn login(&self, user: &str) -> Result<()> {
        self.set(SESSION_KEY, user)
    }

    pub fn logout(&self) -> Result<()> {
        self.reset(SESSION_KEY)
    }

    pub fn ledger(&self) -> Result<Ledger<Store>> {
        Ok(Ledger::new(
            Store::new(self.database()?, self.session()?),
            self.stale_times()?,
        ))
    }

    pub fn kvdir(&self) -> Result<PathBuf> {
        let dir = self.dir.join("key_value_store");

        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
        }

        Ok(dir)
    }

    pub fn path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.kvdir()?.join(key))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;

        match path.exists() {
            true => Ok(Some(std::fs::read_to_string(path)?)),
            false => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path(key)?, value)?;
        Ok(())
    }

    pub fn reset(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;

        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn config_home() -> Result<PathBuf> {
    match std::env::var("PENNY_CONFIG") {
        Ok(val) if !val.is_empty() => Ok(PathBuf::from(val)),
        _ => {
            let path = xdg::BaseDirectories::with_prefix("penny")?.get_config_home();
            if !path.exists() {
                std::fs::create_dir_all(&path)?;
            }
            Ok(path)
        }
    }
}

fn data_home() -> Result<PathBuf> {
    match std::env::var("PENNY_DATA") {
        Ok(val) if !val.is_empty() => Ok(PathBuf::from(val)),
        _ => {
            let path = xdg::BaseDirectories::with_prefix("penny")?.get_data_home();
            if !path.exists() {
                std::fs::create_dir_all(&path)?;
            }
            Ok(path)
        }
    }
}
