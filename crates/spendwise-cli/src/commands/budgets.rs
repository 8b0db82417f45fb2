//! Budget command implementations

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use spendwise_core::db::Database;
use spendwise_core::models::{BudgetPeriod, NewBudget, User};
use spendwise_core::period::parse_bound;

use super::resolve_category;

/// Arguments for `budgets add`
#[derive(Debug, Clone)]
pub struct AddBudget {
    pub amount: f64,
    pub category: Option<String>,
    pub period: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub threshold: f64,
}

/// Display label for a budget's scope
fn scope_labels(db: &Database, user: &User) -> Result<HashMap<i64, String>> {
    Ok(db
        .list_categories(user.id)?
        .into_iter()
        .map(|c| (c.id, format!("{} {}", c.icon, c.name)))
        .collect())
}

fn scope_label(labels: &HashMap<i64, String>, category_id: Option<i64>) -> String {
    match category_id {
        Some(id) => labels.get(&id).cloned().unwrap_or_else(|| "?".to_string()),
        None => "All spending".to_string(),
    }
}

pub fn cmd_budgets_list(db: &Database, user: &User) -> Result<()> {
    let budgets = db.list_budgets(user.id)?;

    if budgets.is_empty() {
        println!("No budgets yet. Add one with:");
        println!("  spendwise budgets add 500 --category Food");
        return Ok(());
    }

    let labels = scope_labels(db, user)?;

    println!();
    println!("🎯 Budgets");
    println!("   ─────────────────────────────────────────────────────────────");

    for budget in budgets {
        println!(
            "   [{}] {:22} │ {:>10} │ {:7} │ alert at {}%",
            budget.id,
            scope_label(&labels, budget.category_id),
            format!("${:.2}", budget.amount),
            budget.period,
            budget.alert_threshold
        );
    }

    Ok(())
}

pub fn cmd_budgets_add(db: &Database, user: &User, args: &AddBudget) -> Result<()> {
    let category_id = args
        .category
        .as_deref()
        .map(|c| resolve_category(db, user, c).map(|c| c.id))
        .transpose()?;
    let period: BudgetPeriod = args.period.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let start_date = match args.start.as_deref() {
        Some(s) => parse_bound(s, false).context("Invalid --start date (use YYYY-MM-DD)")?,
        None => Utc::now(),
    };
    let end_date = args
        .end
        .as_deref()
        .map(|s| parse_bound(s, true))
        .transpose()
        .context("Invalid --end date (use YYYY-MM-DD)")?;

    let id = db.create_budget(
        user.id,
        &NewBudget {
            category_id,
            amount: args.amount,
            period,
            start_date,
            end_date,
            alert_threshold: args.threshold,
        },
    )?;
    db.log_audit(&user.identity, "create", Some("budget"), Some(id), Some("cli"))?;

    println!(
        "✅ Created {} budget #{}: ${:.2}",
        period, id, args.amount
    );

    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    db.get_budget(id)?
        .filter(|b| b.user_id == user.id)
        .ok_or_else(|| anyhow::anyhow!("Budget {} not found", id))?;

    db.delete_budget(id)?;
    db.log_audit(&user.identity, "delete", Some("budget"), Some(id), Some("cli"))?;

    println!("🗑️  Deleted budget #{}", id);

    Ok(())
}

pub async fn cmd_budgets_status(db: &Database, user: &User, json: bool) -> Result<()> {
    let statuses = db
        .budget_status_report(user.id, Utc::now())
        .await
        .context("Failed to evaluate budgets")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No budgets to evaluate.");
        return Ok(());
    }

    println!();
    println!("📏 Budget Status");
    println!("   ─────────────────────────────────────────────────────────────");

    for status in statuses {
        let flag = if status.is_over_budget {
            "\x1b[31mOVER\x1b[0m"
        } else if status.is_near_limit {
            "\x1b[33mNEAR\x1b[0m"
        } else {
            "\x1b[32mOK\x1b[0m"
        };
        let used = status
            .percentage_used
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {:22} │ {:>10} of {:>10} │ {:>5} │ {}",
            status
                .category
                .as_ref()
                .map(|c| format!("{} {}", c.icon, c.name))
                .unwrap_or_else(|| "All spending".to_string()),
            format!("${:.2}", status.spent),
            format!("${:.2}", status.budget.amount),
            used,
            flag
        );
    }

    Ok(())
}
