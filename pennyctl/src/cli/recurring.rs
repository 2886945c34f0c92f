use clap::{ArgGroup, Args, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List recurring transactions
    List(List),
    /// Create a new recurring transaction
    Create(Create),
    /// Pause or resume a recurring transaction
    Toggle(Toggle),
    /// Delete a recurring transaction
    Delete(Delete),
}

#[derive(Args, Clone, Debug)]
pub struct List {}

#[derive(Args, Clone, Debug)]
pub struct Create {
    /// Amount booked each month, a positive whole number
    #[arg(allow_negative_numbers = true)]
    pub amount: String,

    /// Describe the recurring transaction
    #[arg(required = true)]
    pub name: Vec<String>,

    /// Id of the category
    #[arg(short, long, value_name = "ID")]
    pub category: String,

    /// Income or expense, the category's kind by default
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Don't book a transaction for the current month
    #[arg(long)]
    pub no_count_this_month: bool,
}

impl Create {
    pub fn name(&self) -> String {
        self.name.join(" ")
    }
}

#[derive(Args, Clone, Debug)]
#[command(group(ArgGroup::new("state").required(true).args(["active", "inactive"])))]
pub struct Toggle {
    /// Id of the recurring transaction
    pub id: String,

    /// Book it again every month
    #[arg(long)]
    pub active: bool,

    /// Stop booking it
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Args, Clone, Debug)]
pub struct Delete {
    /// Id of the recurring transaction
    pub id: String,

    /// Confirm deletion
    #[arg(long)]
    pub confirm: bool,
}
