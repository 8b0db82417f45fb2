//! Expense command implementations

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use spendwise_core::db::Database;
use spendwise_core::models::{ExpenseFilter, NewExpense, PaymentMethod, User};
use spendwise_core::period::{parse_bound, parse_date_range};

use super::{resolve_category, truncate};

/// Filters and paging for `expenses list`
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: i64,
    pub page: i64,
    pub category: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            page: 1,
            category: None,
            search: None,
            from: None,
            to: None,
        }
    }
}

/// Arguments for `expenses add`
#[derive(Debug, Clone)]
pub struct AddExpense {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: Option<String>,
    pub description: String,
    pub payment_method: String,
    pub tags: Option<String>,
}

pub fn cmd_expenses_list(db: &Database, user: &User, options: &ListOptions) -> Result<()> {
    let category_id = options
        .category
        .as_deref()
        .map(|c| resolve_category(db, user, c).map(|c| c.id))
        .transpose()?;
    let range = parse_date_range(options.from.as_deref(), options.to.as_deref())
        .context("Invalid --from/--to date (use YYYY-MM-DD)")?;

    let filter = ExpenseFilter::new()
        .category_id(category_id)
        .date_range((!range.is_unbounded()).then_some(range))
        .search(options.search.clone());
    let page = db.list_expenses_page(user.id, &filter, options.page, options.limit)?;

    if page.expenses.is_empty() {
        println!("No expenses found. Record one with:");
        println!("  spendwise expenses add Lunch 12.50 --category Food");
        return Ok(());
    }

    let names: HashMap<i64, String> = db
        .list_categories(user.id)?
        .into_iter()
        .map(|c| (c.id, format!("{} {}", c.icon, c.name)))
        .collect();

    println!();
    println!(
        "🧾 Expenses (page {} of {}, {} total)",
        page.current_page, page.total_pages, page.total
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in &page.expenses {
        println!(
            "   [{}] {} │ {:>10} │ {:18} │ {}",
            expense.id,
            expense.date.format("%Y-%m-%d"),
            format!("${:.2}", expense.amount),
            truncate(
                names
                    .get(&expense.category_id)
                    .map(String::as_str)
                    .unwrap_or("?"),
                18
            ),
            truncate(&expense.title, 30)
        );
    }

    Ok(())
}

pub fn cmd_expenses_add(db: &Database, user: &User, args: &AddExpense) -> Result<()> {
    let category = resolve_category(db, user, &args.category)?;
    let payment_method: PaymentMethod = args
        .payment_method
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let date = match args.date.as_deref() {
        Some(s) => parse_bound(s, false).context("Invalid --date (use YYYY-MM-DD)")?,
        None => Utc::now(),
    };
    let tags = args
        .tags
        .as_deref()
        .map(|t| t.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let id = db.create_expense(
        user.id,
        &NewExpense {
            title: args.title.clone(),
            amount: args.amount,
            category_id: category.id,
            date,
            description: args.description.clone(),
            payment_method,
            tags,
        },
    )?;
    db.log_audit(&user.identity, "create", Some("expense"), Some(id), Some("cli"))?;

    println!(
        "✅ Recorded expense #{}: {} ${:.2} ({} {})",
        id, args.title, args.amount, category.icon, category.name
    );

    Ok(())
}

pub fn cmd_expenses_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    let expense = db
        .get_expense(id)?
        .filter(|e| e.user_id == user.id)
        .ok_or_else(|| anyhow::anyhow!("Expense {} not found", id))?;

    db.delete_expense(id)?;
    db.log_audit(&user.identity, "delete", Some("expense"), Some(id), Some("cli"))?;

    println!("🗑️  Deleted expense #{}: {}", id, expense.title);

    Ok(())
}
