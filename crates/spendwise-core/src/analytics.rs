//! Spending aggregation
//!
//! Pure computations over already-fetched expenses. All bucketing uses UTC
//! calendar boundaries, and every function is deterministic given `now`.
//!
//! - [`summary`] - all-time totals plus this month vs last month
//! - [`monthly_breakdown`] - twelve calendar buckets for one year
//! - [`category_wise`] - per-category totals with integer shares
//! - [`trends`] - per-day totals over the trailing 30 days

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::models::{
    Category, CategoryRef, CategoryStat, DateRange, Expense, MonthlyBucket, SummaryStats,
    TrendPoint,
};
use crate::period::{month_start, previous_month};

/// Abbreviated month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Length of the trend window
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Round to one decimal place, half away from zero
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Integer share of `part` in `whole`; 0 when `whole` is not positive
pub(crate) fn share_percent(part: f64, whole: f64) -> i64 {
    if whole > 0.0 {
        (part / whole * 100.0).round() as i64
    } else {
        0
    }
}

/// Overall statistics, comparing the current month against the whole previous month
pub fn summary(expenses: &[Expense], now: DateTime<Utc>) -> SummaryStats {
    let this_month = month_start(now);
    let last_month = previous_month(now);

    let mut total = 0.0;
    let mut monthly_total = 0.0;
    let mut last_month_total = 0.0;

    for e in expenses {
        total += e.amount;
        if e.date >= this_month {
            monthly_total += e.amount;
        } else if e.date >= last_month {
            last_month_total += e.amount;
        }
    }

    let count = expenses.len() as i64;
    let monthly_change = if last_month_total > 0.0 {
        round_one_decimal((monthly_total - last_month_total) / last_month_total * 100.0)
    } else {
        0.0
    };

    SummaryStats {
        total_expenses: total,
        total_transactions: count,
        monthly_total,
        monthly_change,
        average_transaction: if count > 0 { total / count as f64 } else { 0.0 },
    }
}

/// Twelve buckets for `year`, in calendar order. Expenses from other years are ignored.
pub fn monthly_breakdown(expenses: &[Expense], year: i32) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = MONTH_NAMES
        .iter()
        .map(|name| MonthlyBucket {
            month: (*name).to_string(),
            total: 0.0,
            count: 0,
        })
        .collect();

    for e in expenses.iter().filter(|e| e.date.year() == year) {
        let bucket = &mut buckets[e.date.month0() as usize];
        bucket.total += e.amount;
        bucket.count += 1;
    }

    buckets
}

/// Per-category totals within an optional window.
///
/// Categories with no spending are dropped. Results are sorted by total,
/// descending; ties keep the order of `categories`.
pub fn category_wise(
    expenses: &[Expense],
    categories: &[Category],
    range: Option<&DateRange>,
) -> Vec<CategoryStat> {
    let mut sums: HashMap<i64, (f64, i64)> = HashMap::new();
    for e in expenses {
        if range.map_or(true, |r| r.contains(&e.date)) {
            let entry = sums.entry(e.category_id).or_insert((0.0, 0));
            entry.0 += e.amount;
            entry.1 += 1;
        }
    }

    let mut stats: Vec<CategoryStat> = categories
        .iter()
        .filter_map(|c| {
            let (total, count) = sums.get(&c.id).copied()?;
            (total > 0.0).then(|| CategoryStat {
                category: CategoryRef::from(c),
                total,
                count,
                percentage: 0,
            })
        })
        .collect();

    let grand_total: f64 = stats.iter().map(|s| s.total).sum();
    for stat in &mut stats {
        stat.percentage = share_percent(stat.total, grand_total);
    }

    // sort_by is stable
    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats
}

/// Daily totals for the trailing 30 days, oldest first. Days without spending are omitted.
pub fn trends(expenses: &[Expense], now: DateTime<Utc>) -> Vec<TrendPoint> {
    let since = now - Duration::days(TREND_WINDOW_DAYS);

    let mut days: BTreeMap<String, (f64, i64)> = BTreeMap::new();
    for e in expenses.iter().filter(|e| e.date >= since) {
        let entry = days
            .entry(e.date.format("%Y-%m-%d").to_string())
            .or_insert((0.0, 0));
        entry.0 += e.amount;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (total, count))| TrendPoint { date, total, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn expense(amount: f64, category_id: i64, date: DateTime<Utc>) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            title: "test".to_string(),
            amount,
            category_id,
            date,
            description: String::new(),
            payment_method: PaymentMethod::Cash,
            tags: vec![],
            created_at: date,
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            user_id: 1,
            name: name.to_string(),
            icon: "📁".to_string(),
            color: "#6366f1".to_string(),
            is_default: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_empty() {
        let stats = summary(&[], at(2024, 3, 15));
        assert_eq!(stats.total_expenses, 0.0);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.monthly_total, 0.0);
        assert_eq!(stats.monthly_change, 0.0);
        assert_eq!(stats.average_transaction, 0.0);
    }

    #[test]
    fn test_summary_month_over_month() {
        let now = at(2024, 3, 15);
        let expenses = vec![
            expense(150.0, 1, at(2024, 3, 2)),
            expense(100.0, 1, at(2024, 2, 1)),
            expense(50.0, 1, at(2024, 2, 29)),
            expense(40.0, 1, at(2023, 12, 25)),
        ];

        let stats = summary(&expenses, now);
        assert_eq!(stats.total_expenses, 340.0);
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.monthly_total, 150.0);
        // 150 vs 150 last month
        assert_eq!(stats.monthly_change, 0.0);
        assert_eq!(stats.average_transaction, 85.0);
    }

    #[test]
    fn test_summary_change_rounding() {
        let now = at(2024, 3, 15);
        let expenses = vec![
            expense(100.0, 1, at(2024, 3, 1)),
            expense(30.0, 1, at(2024, 2, 10)),
        ];
        // (100 - 30) / 30 * 100 = 233.333...
        assert_eq!(summary(&expenses, now).monthly_change, 233.3);

        let drop = vec![
            expense(10.0, 1, at(2024, 3, 1)),
            expense(30.0, 1, at(2024, 2, 10)),
        ];
        assert_eq!(summary(&drop, now).monthly_change, -66.7);
    }

    #[test]
    fn test_summary_no_previous_month() {
        let expenses = vec![expense(25.0, 1, at(2024, 3, 3))];
        let stats = summary(&expenses, at(2024, 3, 15));
        assert_eq!(stats.monthly_change, 0.0);
        assert_eq!(stats.monthly_total, 25.0);
    }

    #[test]
    fn test_summary_january_compares_december() {
        let expenses = vec![
            expense(20.0, 1, at(2024, 1, 5)),
            expense(10.0, 1, at(2023, 12, 31)),
        ];
        assert_eq!(summary(&expenses, at(2024, 1, 10)).monthly_change, 100.0);
    }

    #[test]
    fn test_monthly_breakdown_single_expense() {
        let expenses = vec![expense(15.0, 1, at(2024, 3, 5))];
        let buckets = monthly_breakdown(&expenses, 2024);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].month, "Jan");
        assert_eq!(buckets[11].month, "Dec");
        assert_eq!(buckets[2].total, 15.0);
        assert_eq!(buckets[2].count, 1);
        for (i, b) in buckets.iter().enumerate() {
            if i != 2 {
                assert_eq!(b.total, 0.0);
                assert_eq!(b.count, 0);
            }
        }
    }

    #[test]
    fn test_monthly_breakdown_ignores_other_years() {
        let expenses = vec![
            expense(15.0, 1, at(2023, 3, 5)),
            expense(5.0, 1, at(2025, 1, 1)),
        ];
        let buckets = monthly_breakdown(&expenses, 2024);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_category_wise_shares_and_order() {
        let categories = vec![category(1, "Food"), category(2, "Transport"), category(3, "Bills")];
        let expenses = vec![
            expense(30.0, 1, at(2024, 3, 1)),
            expense(20.0, 1, at(2024, 3, 2)),
            expense(10.0, 2, at(2024, 3, 3)),
        ];

        let stats = category_wise(&expenses, &categories, None);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category.name, "Food");
        assert_eq!(stats[0].total, 50.0);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 83);
        assert_eq!(stats[1].category.name, "Transport");
        assert_eq!(stats[1].percentage, 17);
    }

    #[test]
    fn test_category_wise_ties_keep_category_order() {
        let categories = vec![category(1, "A"), category(2, "B"), category(3, "C")];
        let expenses = vec![
            expense(10.0, 3, at(2024, 3, 1)),
            expense(10.0, 2, at(2024, 3, 1)),
            expense(10.0, 1, at(2024, 3, 1)),
        ];

        let names: Vec<String> = category_wise(&expenses, &categories, None)
            .into_iter()
            .map(|s| s.category.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_category_wise_inclusive_range() {
        let categories = vec![category(1, "Food")];
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        let expenses = vec![
            expense(5.0, 1, start),
            expense(7.0, 1, end),
            expense(100.0, 1, at(2024, 4, 1)),
        ];

        let range = DateRange::between(start, end);
        let stats = category_wise(&expenses, &categories, Some(&range));
        assert_eq!(stats[0].total, 12.0);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 100);
    }

    #[test]
    fn test_category_wise_drops_zero_totals() {
        let categories = vec![category(1, "Food"), category(2, "Gifts")];
        let expenses = vec![expense(0.0, 2, at(2024, 3, 1)), expense(4.0, 1, at(2024, 3, 1))];

        let stats = category_wise(&expenses, &categories, None);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].category.id, 1);
        assert!(category_wise(&[], &categories, None).is_empty());
    }

    #[test]
    fn test_trends_window_and_order() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let expenses = vec![
            expense(5.0, 1, Utc.with_ymd_and_hms(2024, 3, 30, 8, 0, 0).unwrap()),
            expense(3.0, 1, Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()),
            expense(2.0, 1, Utc.with_ymd_and_hms(2024, 3, 30, 22, 0, 0).unwrap()),
            // 31 days before now
            expense(99.0, 1, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()),
        ];

        let points = trends(&expenses, now);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2024-03-02");
        assert_eq!(points[0].total, 3.0);
        assert_eq!(points[1].date, "2024-03-30");
        assert_eq!(points[1].total, 7.0);
        assert_eq!(points[1].count, 2);
    }

    #[test]
    fn test_trends_window_start_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let edge = now - Duration::days(TREND_WINDOW_DAYS);
        let points = trends(&[expense(1.0, 1, edge)], now);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2024-03-01");
    }
}
