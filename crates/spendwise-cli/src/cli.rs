//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SpendWise - Track expenses, budgets and spending trends
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Self-hosted personal expense tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendwise.db", global = true)]
    pub db: PathBuf,

    /// Identity to act as (the same string the server resolves callers to)
    #[arg(long, default_value = "local-dev", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print reports as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an access proxy header or an API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage expenses (list, add, delete)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Manage categories (list, add, delete)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage budgets (list, add, delete, status)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Generate spending reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Show a spending tip based on the last seven days
    Tip,
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses, newest first
    List {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: i64,

        /// Only this category (name or ID)
        #[arg(long)]
        category: Option<String>,

        /// Match title or description (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Record an expense
    Add {
        /// Short title (e.g., "Lunch")
        title: String,

        /// Amount spent
        amount: f64,

        /// Category name or ID
        #[arg(short, long)]
        category: String,

        /// Date (YYYY-MM-DD or RFC 3339), defaults to now
        #[arg(long)]
        date: Option<String>,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// Payment method: cash, card, online
        #[arg(long, default_value = "cash")]
        payment_method: String,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a custom category
    Add {
        /// Category name
        name: String,

        /// Optional icon (e.g., "🐶")
        #[arg(long)]
        icon: Option<String>,

        /// Optional color (e.g., "#10b981")
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a custom category (default categories cannot be deleted)
    Delete {
        /// Category name or ID
        category: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets
    List,

    /// Add a budget
    Add {
        /// Budget amount
        amount: f64,

        /// Category name or ID (omit for all spending)
        #[arg(short, long)]
        category: Option<String>,

        /// Budget period: monthly or yearly
        #[arg(long, default_value = "monthly")]
        period: String,

        /// Start date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Alert threshold in percent
        #[arg(long, default_value = "80")]
        threshold: f64,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },

    /// Show spending against each budget
    Status,
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Totals, this month vs last month
    Summary,

    /// Spending per month for a calendar year
    Monthly {
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Spending by category with percentage shares
    Categories {
        /// Time period: this-month, last-month, this-year, last-30-days, last-90-days, all
        #[arg(long, default_value = "all")]
        period: String,

        /// Custom start date (YYYY-MM-DD) - overrides period
        #[arg(long)]
        from: Option<String>,

        /// Custom end date (YYYY-MM-DD) - overrides period
        #[arg(long)]
        to: Option<String>,
    },

    /// Daily spending over the last 30 days
    Trends,
}
