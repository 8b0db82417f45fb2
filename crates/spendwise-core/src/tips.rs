//! Rule-based spending tips
//!
//! Looks at the last seven days of spending, finds the category that took the
//! most money, and renders a canned suggestion for it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::analytics::share_percent;
use crate::models::{Category, Expense, SmartTip, DEFAULT_CATEGORY_ICON};

/// Length of the tip window
pub const TIP_WINDOW_DAYS: i64 = 7;

/// Group name for expenses whose category cannot be resolved
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A canned tip for one category name. `{amount}` is replaced with whole dollars.
struct TipTemplate {
    category: &'static str,
    message: &'static str,
    suggestion: &'static str,
    icon: &'static str,
}

const TIP_TEMPLATES: &[TipTemplate] = &[
    TipTemplate {
        category: "Food",
        message: "You've spent ${amount} on food this week. Switch to home cooking and afford that concert ticket!",
        suggestion: "Set Meal Prep Goal",
        icon: "🍔",
    },
    TipTemplate {
        category: "Transport",
        message: "You've spent ${amount} on transport this week. Consider carpooling or public transit to save more!",
        suggestion: "Set Transport Budget",
        icon: "🚗",
    },
    TipTemplate {
        category: "Shopping",
        message: "Shopping total: ${amount} this week! Create a wishlist and wait 24h before buying to avoid impulse purchases.",
        suggestion: "Set Shopping Limit",
        icon: "🛒",
    },
    TipTemplate {
        category: "Entertainment",
        message: "Entertainment spending at ${amount}! Look for free events or student discounts to enjoy more for less.",
        suggestion: "Find Free Events",
        icon: "🎮",
    },
    TipTemplate {
        category: "Bills",
        message: "Bills: ${amount} this week. Review subscriptions - you might be paying for services you don't use!",
        suggestion: "Review Subscriptions",
        icon: "💡",
    },
    TipTemplate {
        category: "Health",
        message: "Health expenses: ${amount}. Great investment! Consider preventive care to reduce future costs.",
        suggestion: "Set Wellness Goal",
        icon: "⚕️",
    },
    TipTemplate {
        category: "Others",
        message: "Miscellaneous spending: ${amount}. Track specific categories to identify savings opportunities!",
        suggestion: "Categorize Better",
        icon: "📝",
    },
];

/// Tip shown when there is nothing to analyze
pub fn onboarding_tip() -> SmartTip {
    SmartTip {
        message: "Start tracking your expenses to get personalized tips! 🎯".to_string(),
        suggestion: "Add your first expense to begin your savings journey.".to_string(),
        icon: "💡".to_string(),
        category: None,
        amount: 0.0,
        percentage: None,
    }
}

fn whole_dollars(amount: f64) -> String {
    format!("{}", amount.round())
}

/// Spending grouped under one category name
#[derive(Debug)]
struct CategorySpend {
    name: String,
    icon: String,
    total: f64,
    count: i64,
}

/// Build the tip for the dominant category of the last seven days
pub fn smart_tip(expenses: &[Expense], categories: &[Category], now: DateTime<Utc>) -> SmartTip {
    let since = now - Duration::days(TIP_WINDOW_DAYS);
    let by_id: HashMap<i64, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    // Vec keeps first-seen order; the index map finds existing groups
    let mut groups: Vec<CategorySpend> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut window_total = 0.0;

    for e in expenses.iter().filter(|e| e.date >= since) {
        let (name, icon) = match by_id.get(&e.category_id) {
            Some(c) => (c.name.as_str(), c.icon.as_str()),
            None => (UNCATEGORIZED, DEFAULT_CATEGORY_ICON),
        };

        let slot = match index.get(name) {
            Some(&i) => i,
            None => {
                groups.push(CategorySpend {
                    name: name.to_string(),
                    icon: icon.to_string(),
                    total: 0.0,
                    count: 0,
                });
                index.insert(name.to_string(), groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].total += e.amount;
        groups[slot].count += 1;
        window_total += e.amount;
    }

    let Some(first) = groups.first() else {
        return onboarding_tip();
    };

    let mut top = first;
    for group in &groups[1..] {
        if group.total > top.total {
            top = group;
        }
    }

    tracing::debug!(
        category = %top.name,
        total = top.total,
        count = top.count,
        "Dominant category for smart tip"
    );

    render(top, window_total)
}

fn render(top: &CategorySpend, window_total: f64) -> SmartTip {
    let percentage = share_percent(top.total, window_total);
    let amount = whole_dollars(top.total);

    let (message, suggestion, icon) =
        match TIP_TEMPLATES.iter().find(|t| t.category == top.name) {
            Some(t) => (
                t.message.replace("{amount}", &amount),
                t.suggestion.to_string(),
                t.icon.to_string(),
            ),
            None => (
                format!(
                    "Your {} spending is ${} ({}% of total). Consider setting a budget to save more!",
                    top.name, amount, percentage
                ),
                "Set Budget Goal".to_string(),
                top.icon.clone(),
            ),
        };

    SmartTip {
        message,
        suggestion,
        icon,
        category: Some(top.name.clone()),
        amount: top.total,
        percentage: Some(percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn category(id: i64, name: &str, icon: &str) -> Category {
        Category {
            id,
            user_id: 1,
            name: name.to_string(),
            icon: icon.to_string(),
            color: "#000000".to_string(),
            is_default: false,
            created_at: now(),
        }
    }

    fn expense(amount: f64, category_id: i64, days_ago: i64) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            title: "t".to_string(),
            amount,
            category_id,
            date: now() - Duration::days(days_ago),
            description: String::new(),
            payment_method: PaymentMethod::Card,
            tags: vec![],
            created_at: now(),
        }
    }

    #[test]
    fn test_onboarding_tip_when_window_empty() {
        let categories = vec![category(1, "Food", "🍔")];
        // Only an expense older than the window
        let tip = smart_tip(&[expense(40.0, 1, 8)], &categories, now());
        assert_eq!(tip, onboarding_tip());
        assert_eq!(tip.category, None);
        assert_eq!(tip.amount, 0.0);
        assert!(tip.percentage.is_none());
    }

    #[test]
    fn test_food_dominates() {
        let categories = vec![category(1, "Food", "🍔"), category(2, "Transport", "🚗")];
        let expenses = vec![expense(30.0, 1, 1), expense(20.0, 1, 2), expense(10.0, 2, 3)];

        let tip = smart_tip(&expenses, &categories, now());
        assert_eq!(tip.category.as_deref(), Some("Food"));
        assert_eq!(tip.amount, 50.0);
        assert_eq!(tip.percentage, Some(83));
        assert_eq!(tip.suggestion, "Set Meal Prep Goal");
        assert_eq!(tip.icon, "🍔");
        assert!(tip.message.contains("$50"));
    }

    #[test]
    fn test_unknown_category_uses_generic_template() {
        let categories = vec![category(5, "Pets", "🐶"), category(1, "Food", "🍔")];
        let expenses = vec![expense(60.4, 5, 1), expense(20.0, 1, 1)];

        let tip = smart_tip(&expenses, &categories, now());
        assert_eq!(
            tip.message,
            "Your Pets spending is $60 (75% of total). Consider setting a budget to save more!"
        );
        assert_eq!(tip.suggestion, "Set Budget Goal");
        assert_eq!(tip.icon, "🐶");
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let categories = vec![category(1, "Food", "🍔"), category(2, "Bills", "💡")];
        let expenses = vec![expense(25.0, 2, 1), expense(25.0, 1, 2)];

        let tip = smart_tip(&expenses, &categories, now());
        assert_eq!(tip.category.as_deref(), Some("Bills"));
        assert_eq!(tip.percentage, Some(50));
    }

    #[test]
    fn test_unresolved_category_grouped_as_uncategorized() {
        let categories = vec![category(1, "Food", "🍔")];
        let expenses = vec![expense(5.0, 1, 1), expense(70.0, 99, 1), expense(5.0, 98, 2)];

        let tip = smart_tip(&expenses, &categories, now());
        assert_eq!(tip.category.as_deref(), Some(UNCATEGORIZED));
        assert_eq!(tip.amount, 75.0);
        assert_eq!(tip.icon, DEFAULT_CATEGORY_ICON);
        assert_eq!(tip.percentage, Some(94));
    }

    #[test]
    fn test_whole_dollar_rounding() {
        assert_eq!(whole_dollars(12.5), "13");
        assert_eq!(whole_dollars(12.49), "12");
        assert_eq!(whole_dollars(0.0), "0");
    }
}
