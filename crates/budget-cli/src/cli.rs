use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use budget_core::VERSION;

/// Budget Tracker - a local-first personal finance tracker
#[derive(Parser)]
#[command(name = "budget")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the budget store
    #[arg(short, long, global = true, env = "BUDGET_STORE")]
    pub store: Option<String>,

    /// Owner id to scope records by
    #[arg(short, long, global = true, env = "BUDGET_OWNER")]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Base URL of the remote document service
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Bearer token for the remote document service
    #[arg(long)]
    pub remote_token: Option<String>,

    /// Default directory for CSV exports
    #[arg(long)]
    pub export_dir: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Amount (always positive; use --income for money in)
    #[arg(value_name = "AMOUNT")]
    pub amount: String,

    /// What the money was for
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Category id or name
    #[arg(short, long)]
    pub category: String,

    /// Date (ISO-8601 or YYYY-MM-DD, defaults to now)
    #[arg(long)]
    pub date: Option<String>,

    /// Record as income instead of an expense
    #[arg(long)]
    pub income: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Transaction id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// New amount
    #[arg(long)]
    pub amount: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New category id or name
    #[arg(short, long)]
    pub category: Option<String>,

    /// New date (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Mark as income
    #[arg(long, conflicts_with = "expense")]
    pub income: bool,

    /// Mark as expense
    #[arg(long)]
    pub expense: bool,
}

/// Arguments for deleting a record by id
#[derive(Args)]
pub struct DeleteArgs {
    /// Record id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Month to list (YYYY-MM)
    #[arg(long, conflicts_with_all = ["since", "until"])]
    pub month: Option<String>,

    /// Start date (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// End date (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Filter by category id or name
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only income
    #[arg(long, conflicts_with = "expenses")]
    pub income: bool,

    /// Only expenses
    #[arg(long)]
    pub expenses: bool,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set a budget for a category in the current month
    Set(BudgetSetArgs),

    /// Change an existing budget
    Edit(BudgetEditArgs),

    /// Delete a budget
    Delete(DeleteArgs),

    /// List budgets
    List(BudgetListArgs),

    /// Show spending against this month's budgets
    Progress(JsonArgs),
}

#[derive(Args)]
pub struct BudgetSetArgs {
    /// Spending limit
    #[arg(value_name = "AMOUNT")]
    pub amount: String,

    /// Category id or name
    #[arg(short, long)]
    pub category: String,
}

#[derive(Args)]
pub struct BudgetEditArgs {
    /// Budget id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// New spending limit
    #[arg(long)]
    pub amount: Option<String>,

    /// New category id or name
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct BudgetListArgs {
    /// Only budgets for this month (YYYY-MM)
    #[arg(long)]
    pub month: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List(JsonArgs),

    /// Add a category
    Add(CategoryAddArgs),
}

#[derive(Args)]
pub struct CategoryAddArgs {
    /// Category name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Display color (#RRGGBB)
    #[arg(long, default_value = "#9E9E9E")]
    pub color: String,

    /// Icon identifier
    #[arg(long)]
    pub icon: Option<String>,
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Expenses per category for a month
    Spending(SpendingArgs),

    /// Six-month trend of expenses or income
    Trend(TrendArgs),

    /// Income, expenses and budget totals
    Overview(JsonArgs),
}

#[derive(Args)]
pub struct SpendingArgs {
    /// Month to report (YYYY-MM, defaults to the current month)
    #[arg(long)]
    pub month: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TrendArgs {
    /// Trend income instead of expenses
    #[arg(long)]
    pub income: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Shared `--json` flag
#[derive(Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Directory to write the CSV file into
    #[arg(long)]
    pub dir: Option<String>,
}

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the remote profile
    Show(JsonArgs),

    /// Update fields of the remote profile
    Set(ProfileSetArgs),
}

#[derive(Args)]
pub struct ProfileSetArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub avatar_url: Option<String>,

    #[arg(long)]
    pub birthday: Option<String>,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the store and config, seeding default categories
    Init(InitArgs),

    /// Add a transaction
    Add(AddArgs),

    /// Edit a transaction
    Edit(EditArgs),

    /// Delete a transaction
    Delete(DeleteArgs),

    /// List transactions, newest first
    List(ListArgs),

    /// Manage monthly budgets
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Spending reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export transactions to CSV
    Export(ExportArgs),

    /// Pull records from the remote store into the local store
    Sync,

    /// Remote user profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_globals() {
        let cli = Cli::try_parse_from([
            "budget", "--owner", "u1", "add", "50", "Electricity bill", "-c", "Utilities",
        ])
        .unwrap();
        assert_eq!(cli.owner.as_deref(), Some("u1"));
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.amount, "50");
                assert_eq!(args.category, "Utilities");
                assert!(!args.income);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_edit_rejects_income_and_expense_together() {
        let parsed = Cli::try_parse_from(["budget", "edit", "3", "--income", "--expense"]);
        assert!(parsed.is_err());
    }
}
