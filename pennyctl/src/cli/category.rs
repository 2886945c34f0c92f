use clap::{Args, Subcommand};

pub const DEFAULT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List categories
    List(List),
    /// Create a new category
    Create(Create),
    /// Update a category
    Update(Update),
    /// Delete a category
    ///
    /// A category still used by transactions is only marked as deleted
    Delete(Delete),
}

#[derive(Args, Clone, Debug)]
pub struct List {
    /// Also show deleted categories
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Clone, Debug)]
pub struct Create {
    /// Name of the new category
    pub name: String,

    /// Whether the category groups income or expenses
    #[arg(short, long, default_value = "expense")]
    pub kind: String,

    /// Color used to display the category, like #ff0000
    #[arg(long, default_value = DEFAULT_COLOR)]
    pub color: String,
}

#[derive(Args, Clone, Debug)]
pub struct Update {
    /// Id of the category
    pub id: String,

    /// New name
    #[arg(long, help_heading = "Changes")]
    pub name: Option<String>,

    /// New color
    #[arg(long, help_heading = "Changes")]
    pub color: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct Delete {
    /// Id of the category
    pub id: String,

    /// Confirm deletion
    #[arg(long)]
    pub confirm: bool,
}
