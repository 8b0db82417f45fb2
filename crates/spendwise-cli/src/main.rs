//! SpendWise CLI - Personal expense tracker
//!
//! Usage:
//!   spendwise init                          Initialize database
//!   spendwise expenses add Lunch 12.5 -c Food
//!   spendwise report summary                Spending overview
//!   spendwise serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, &cli.user),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, static_dir.as_deref()).await,
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None => commands::cmd_expenses_list(&db, &user, &commands::ListOptions::default()),
                Some(ExpensesAction::List {
                    limit,
                    page,
                    category,
                    search,
                    from,
                    to,
                }) => commands::cmd_expenses_list(
                    &db,
                    &user,
                    &commands::ListOptions {
                        limit,
                        page,
                        category,
                        search,
                        from,
                        to,
                    },
                ),
                Some(ExpensesAction::Add {
                    title,
                    amount,
                    category,
                    date,
                    description,
                    payment_method,
                    tags,
                }) => commands::cmd_expenses_add(
                    &db,
                    &user,
                    &commands::AddExpense {
                        title,
                        amount,
                        category,
                        date,
                        description,
                        payment_method,
                        tags,
                    },
                ),
                Some(ExpensesAction::Delete { id }) => {
                    commands::cmd_expenses_delete(&db, &user, id)
                }
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db, &user),
                Some(CategoriesAction::Add { name, icon, color }) => {
                    commands::cmd_categories_add(&db, &user, &name, icon, color)
                }
                Some(CategoriesAction::Delete { category }) => {
                    commands::cmd_categories_delete(&db, &user, &category)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&db, &user),
                Some(BudgetsAction::Add {
                    amount,
                    category,
                    period,
                    start,
                    end,
                    threshold,
                }) => commands::cmd_budgets_add(
                    &db,
                    &user,
                    &commands::AddBudget {
                        amount,
                        category,
                        period,
                        start,
                        end,
                        threshold,
                    },
                ),
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&db, &user, id),
                Some(BudgetsAction::Status) => {
                    commands::cmd_budgets_status(&db, &user, cli.json).await
                }
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match report_type {
                ReportType::Summary => commands::cmd_report_summary(&db, &user, cli.json),
                ReportType::Monthly { year } => {
                    commands::cmd_report_monthly(&db, &user, year, cli.json)
                }
                ReportType::Categories { period, from, to } => {
                    let range =
                        commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
                    commands::cmd_report_categories(&db, &user, range, cli.json)
                }
                ReportType::Trends => commands::cmd_report_trends(&db, &user, cli.json),
            }
        }
        Commands::Tip => {
            let db = commands::open_db(&cli.db)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            commands::cmd_tip(&db, &user, cli.json)
        }
    }
}
