//! Report command implementations

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::Serialize;
use spendwise_core::db::Database;
use spendwise_core::models::{DateRange, User};
use spendwise_core::period::{parse_date_range, Period};

/// Resolve a period name, or explicit --from/--to dates, to a date window.
/// Returns `None` when the window is unbounded.
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
) -> Result<Option<DateRange>> {
    let range = if custom_from.is_some() || custom_to.is_some() {
        parse_date_range(custom_from, custom_to)
            .context("Invalid --from/--to date format (use YYYY-MM-DD)")?
    } else {
        let period: Period = period.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        period.range(Utc::now())
    };

    Ok((!range.is_unbounded()).then_some(range))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn cmd_report_summary(db: &Database, user: &User, json: bool) -> Result<()> {
    let summary = db.summary_report(user.id, Utc::now())?;

    if json {
        return print_json(&summary);
    }

    let change = if summary.monthly_change > 0.0 {
        format!("\x1b[31m▲ {:.1}%\x1b[0m", summary.monthly_change)
    } else if summary.monthly_change < 0.0 {
        format!("\x1b[32m▼ {:.1}%\x1b[0m", summary.monthly_change.abs())
    } else {
        "  0.0%".to_string()
    };

    println!();
    println!("📊 Spending Summary");
    println!("   ─────────────────────────────");
    println!("   Total spent:      ${:.2}", summary.total_expenses);
    println!("   Transactions:     {}", summary.total_transactions);
    println!("   This month:       ${:.2}", summary.monthly_total);
    println!("   vs last month:    {}", change);
    println!("   Average expense:  ${:.2}", summary.average_transaction);

    Ok(())
}

pub fn cmd_report_monthly(db: &Database, user: &User, year: Option<i32>, json: bool) -> Result<()> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    let buckets = db.monthly_report(user.id, year)?;

    if json {
        return print_json(&buckets);
    }

    println!();
    println!("📅 Monthly Spending - {}", year);
    println!("   ─────────────────────────────────────────────────────────────");

    let max_total = buckets.iter().map(|b| b.total).fold(0.0_f64, f64::max);

    for bucket in &buckets {
        let bar_len = if max_total > 0.0 {
            ((bucket.total / max_total) * 30.0) as usize
        } else {
            0
        };
        println!(
            "   {} │ {:>10} │ {:>4} │ {}",
            bucket.month,
            format!("${:.2}", bucket.total),
            bucket.count,
            "█".repeat(bar_len)
        );
    }

    let total: f64 = buckets.iter().map(|b| b.total).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: ${:.2}", total);

    Ok(())
}

pub fn cmd_report_categories(
    db: &Database,
    user: &User,
    range: Option<DateRange>,
    json: bool,
) -> Result<()> {
    let stats = db.category_report(user.id, range)?;

    if json {
        return print_json(&stats);
    }

    println!();
    println!("🥧 Spending by Category");
    println!("   ─────────────────────────────────────────────────────────────");

    if stats.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    println!(
        "   {:22} │ {:>10} │ {:>4} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ───────────────────────┼────────────┼──────┼───────");

    for stat in &stats {
        println!(
            "   {:22} │ {:>10} │ {:>3}% │ {:>5}",
            format!("{} {}", stat.category.icon, stat.category.name),
            format!("${:.2}", stat.total),
            stat.percentage,
            stat.count
        );
    }

    Ok(())
}

pub fn cmd_report_trends(db: &Database, user: &User, json: bool) -> Result<()> {
    let points = db.trends_report(user.id, Utc::now())?;

    if json {
        return print_json(&points);
    }

    println!();
    println!("📈 Daily Spending (last 30 days)");
    println!("   ─────────────────────────────────────────────────────────────");

    if points.is_empty() {
        println!("   No spending in the last 30 days.");
        return Ok(());
    }

    let max_total = points.iter().map(|p| p.total).fold(0.0_f64, f64::max);

    for point in &points {
        let bar_len = if max_total > 0.0 {
            ((point.total / max_total) * 30.0) as usize
        } else {
            0
        };
        println!(
            "   {} │ {:>10} │ {:>3} │ {}",
            point.date,
            format!("${:.2}", point.total),
            point.count,
            "█".repeat(bar_len)
        );
    }

    Ok(())
}
