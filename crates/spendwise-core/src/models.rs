//! Domain models for SpendWise

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default icon for categories created without one
pub const DEFAULT_CATEGORY_ICON: &str = "📁";

/// Default color for categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#6366f1";

/// Default budget alert threshold (percent)
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// A user, identified by the identity string an upstream proxy or API key resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// E-mail address, "api-key", or "local-dev"
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Online => "Online",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "online" => Ok(Self::Online),
            _ => Err(format!(
                "Unknown payment method: {} (valid: Cash, Card, Online)",
                s
            )),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ========== Categories ==========

/// A spending category owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Seeded at user creation; cannot be deleted
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// A new category (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Partial update for a category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// The slice of a category carried inside aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
        }
    }
}

/// Categories seeded for every new user: (name, icon, color)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Food", "🍔", "#ef4444"),
    ("Transport", "🚗", "#3b82f6"),
    ("Shopping", "🛒", "#8b5cf6"),
    ("Entertainment", "🎮", "#ec4899"),
    ("Bills", "💡", "#f59e0b"),
    ("Health", "⚕️", "#10b981"),
    ("Others", "📝", "#6366f1"),
];

// ========== Expenses ==========

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Always non-negative
    pub amount: f64,
    pub category_id: i64,
    /// When the money was spent (UTC)
    pub date: DateTime<Utc>,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A new expense (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category_id: i64,
    pub date: DateTime<Utc>,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub tags: Vec<String>,
}

/// Partial update for an expense
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category_id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub tags: Option<Vec<String>>,
}

/// Trim tags, drop empty ones, and remove duplicates (first occurrence wins)
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// An inclusive time window; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Window with both bounds set
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Window open at the end
    pub fn since(start: DateTime<Utc>) -> Self {
        Self::new(Some(start), None)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| *at >= s) && self.end.map_or(true, |e| *at <= e)
    }
}

/// Criteria for reading a user's expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category_id: Option<i64>,
    pub date_range: Option<DateRange>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_id(mut self, id: Option<i64>) -> Self {
        self.category_id = id;
        self
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    pub fn search(mut self, query: Option<String>) -> Self {
        self.search = query;
        self
    }

    /// In-memory evaluation, mirroring the SQL built by the database layer
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(cid) = self.category_id {
            if expense.category_id != cid {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains(&expense.date) {
                return false;
            }
        }
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !expense.title.to_lowercase().contains(&q)
                && !expense.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        true
    }
}

/// One page of an expense listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

// ========== Budgets ==========

/// Recurrence cycle of a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!(
                "Unknown budget period: {} (valid: monthly, yearly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A spending limit, either for one category or for all spending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    /// None = applies to all spending
    pub category_id: Option<i64>,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Percent of the budget at which `is_near_limit` trips, in [0, 100]
    pub alert_threshold: f64,
    pub created_at: DateTime<Utc>,
}

/// A new budget (before DB insertion)
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: Option<i64>,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub alert_threshold: f64,
}

/// Partial update for a budget. Nested options clear the field when `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub category_id: Option<Option<i64>>,
    pub amount: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub alert_threshold: Option<f64>,
}

// ========== Aggregates ==========

/// Overall spending statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// All-time total
    pub total_expenses: f64,
    pub total_transactions: i64,
    /// Spending since the start of the current month
    pub monthly_total: f64,
    /// Percent change vs the previous calendar month, one decimal
    pub monthly_change: f64,
    pub average_transaction: f64,
}

/// Spending in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// Abbreviated month name ("Jan".."Dec")
    pub month: String,
    pub total: f64,
    pub count: i64,
}

/// Spending in one category with its share of the grand total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: CategoryRef,
    pub total: f64,
    pub count: i64,
    /// Integer percent of the grand total
    pub percentage: i64,
}

/// Spending on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// ISO day, "YYYY-MM-DD"
    pub date: String,
    pub total: f64,
    pub count: i64,
}

/// Consumption of one budget over its evaluation window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// The budget's category; None for an all-spending budget
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub spent: f64,
    /// May be negative
    pub remaining: f64,
    /// None when the budget amount is zero
    pub percentage_used: Option<i64>,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
}

/// A rule-based spending suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartTip {
    pub message: String,
    pub suggestion: String,
    pub icon: String,
    /// Dominant category name; None for the onboarding tip
    pub category: Option<String>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expense(title: &str, description: &str, category_id: i64, day: u32) -> Expense {
        Expense {
            id: 1,
            user_id: 1,
            title: title.to_string(),
            amount: 10.0,
            category_id,
            date: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            description: description.to_string(),
            payment_method: PaymentMethod::Cash,
            tags: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("ONLINE".parse::<PaymentMethod>().unwrap(), PaymentMethod::Online);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_budget_period_serde() {
        let json = serde_json::to_string(&BudgetPeriod::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
        assert_eq!("Monthly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Monthly);
    }

    #[test]
    fn test_display_honors_width() {
        assert_eq!(format!("[{:7}]", BudgetPeriod::Yearly), "[yearly ]");
        assert_eq!(format!("[{:>6}]", PaymentMethod::Card), "[  Card]");
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " lunch ".to_string(),
            "".to_string(),
            "work".to_string(),
            "lunch".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["lunch", "work"]);
    }

    #[test]
    fn test_date_range_bounds_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        let range = DateRange::between(start, end);
        assert!(range.contains(&start));
        assert!(range.contains(&end));
        assert!(!range.contains(&(end + chrono::Duration::seconds(1))));
        assert!(DateRange::default().contains(&start));
    }

    #[test]
    fn test_filter_matches() {
        let e = expense("Groceries", "weekly SHOP", 3, 10);

        assert!(ExpenseFilter::new().matches(&e));
        assert!(ExpenseFilter::new().category_id(Some(3)).matches(&e));
        assert!(!ExpenseFilter::new().category_id(Some(4)).matches(&e));
        assert!(ExpenseFilter::new()
            .search(Some("shop".to_string()))
            .matches(&e));
        assert!(!ExpenseFilter::new()
            .search(Some("fuel".to_string()))
            .matches(&e));

        let may_first_week = DateRange::between(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 7, 23, 59, 59).unwrap(),
        );
        assert!(!ExpenseFilter::new()
            .date_range(Some(may_first_week))
            .matches(&e));
    }

    #[test]
    fn test_smart_tip_omits_missing_percentage() {
        let tip = SmartTip {
            message: "m".to_string(),
            suggestion: "s".to_string(),
            icon: "i".to_string(),
            category: None,
            amount: 0.0,
            percentage: None,
        };
        let json = serde_json::to_value(&tip).unwrap();
        assert!(json.get("percentage").is_none());
        assert!(json["category"].is_null());
    }
}
