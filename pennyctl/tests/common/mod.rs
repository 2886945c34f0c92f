use anyhow::Result;
use assert_cmd::Command;
use assert_fs::TempDir;

pub mod prelude {
    pub use super::Env;
    pub use anyhow::Result;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;
    pub use predicates::str;
}

pub struct Env {
    pub conf_dir: TempDir,
    pub data_dir: TempDir,
}

#[allow(unused_macros)]
macro_rules! raw_cmd {
    ($env:ident, $($tail:tt)*) => {
        {
            let mut cmd = $env.command()?;
            raw_cmd!(@args cmd, $($tail)*);
            cmd
        }
    };
    (@args $cmd:ident $(,)?) => {};
    (@args $cmd:ident, --$arg:ident $($tail:tt)*) => {
        $cmd.arg(concat!("--", stringify!($arg)));
        raw_cmd!(@args $cmd, $($tail)*);
    };
    (@args $cmd:ident, $arg:literal $($tail:tt)*) => {
        $cmd.arg(format!("{}", $arg));
        raw_cmd!(@args $cmd, $($tail)*);
    };
    (@args $cmd:ident, $arg:ident $($tail:tt)*) => {
        $cmd.arg(stringify!($arg));
        raw_cmd!(@args $cmd, $($tail)*);
    };
}

#[allow(unused_macros)]
macro_rules! cmd {
    ($env:ident, $($tail:tt)*) => {
        raw_cmd!($env, $($tail)*).assert()
    };
}

impl Env {
    pub fn new() -> Result<Self> {
        Ok(Self {
            conf_dir: TempDir::new()?,
            data_dir: TempDir::new()?,
        })
    }

    /// Environment with a session opened for `user`
    #[allow(dead_code)]
    pub fn signed_in(user: &str) -> Result<Self> {
        let env = Self::new()?;
        env.command()?
            .args(["session", "login", user])
            .assert()
            .success();
        Ok(env)
    }

    pub fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("pennyctl")?;
        cmd.env_remove("PENNY_CRON_SECRET")
            .arg("-C")
            .arg(self.conf_dir.path())
            .arg("-D")
            .arg(self.data_dir.path());
        Ok(cmd)
    }
}
