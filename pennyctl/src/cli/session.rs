use clap::{Args, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Act on behalf of a user
    Login(Login),
    /// End the current session
    Logout(Logout),
    /// Show who is signed in
    Show(Show),
}

#[derive(Args, Clone, Debug)]
pub struct Login {
    /// Identifier of the user
    pub user: String,
}

#[derive(Args, Clone, Debug)]
pub struct Logout {}

#[derive(Args, Clone, Debug)]
pub struct Show {}
