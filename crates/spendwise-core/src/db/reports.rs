//! Spending reports and analytics
//!
//! Each report fetches one user's records and hands them to the pure
//! aggregation code in [`crate::analytics`], [`crate::budget_status`] and
//! [`crate::tips`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::Database;
use crate::analytics::{self, TREND_WINDOW_DAYS};
use crate::budget_status::{self, ExpenseSource};
use crate::error::{Error, Result};
use crate::models::*;
use crate::period::year_bounds;
use crate::tips::{self, TIP_WINDOW_DAYS};

impl Database {
    /// All-time totals plus this month vs last month
    pub fn summary_report(&self, user_id: i64, now: DateTime<Utc>) -> Result<SummaryStats> {
        let expenses = self.find_expenses(user_id, &ExpenseFilter::new())?;
        Ok(analytics::summary(&expenses, now))
    }

    /// Twelve monthly buckets for a calendar year
    pub fn monthly_report(&self, user_id: i64, year: i32) -> Result<Vec<MonthlyBucket>> {
        let (start, end) = year_bounds(year)?;
        let filter = ExpenseFilter::new().date_range(Some(DateRange::between(start, end)));
        let expenses = self.find_expenses(user_id, &filter)?;
        Ok(analytics::monthly_breakdown(&expenses, year))
    }

    /// Per-category totals and shares, optionally within a window
    pub fn category_report(
        &self,
        user_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<CategoryStat>> {
        let categories = self.list_categories(user_id)?;
        let filter = ExpenseFilter::new().date_range(range);
        let expenses = self.find_expenses(user_id, &filter)?;
        Ok(analytics::category_wise(&expenses, &categories, range.as_ref()))
    }

    /// Daily totals over the trailing 30 days
    pub fn trends_report(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<TrendPoint>> {
        let since = now - Duration::days(TREND_WINDOW_DAYS);
        let filter = ExpenseFilter::new().date_range(Some(DateRange::since(since)));
        let expenses = self.find_expenses(user_id, &filter)?;
        Ok(analytics::trends(&expenses, now))
    }

    /// Consumption and alert flags for each of the user's budgets
    pub async fn budget_status_report(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetStatus>> {
        let db = self.clone();
        let (budgets, categories) = tokio::task::spawn_blocking(move || {
            Ok::<_, Error>((db.list_budgets(user_id)?, db.list_categories(user_id)?))
        })
        .await??;
        debug!(user_id, budgets = budgets.len(), "Evaluating budgets");

        let mut statuses = budget_status::evaluate(budgets, Arc::new(self.clone()), now).await?;
        for status in &mut statuses {
            status.category = status
                .budget
                .category_id
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(CategoryRef::from);
        }
        Ok(statuses)
    }

    /// Suggestion based on the last seven days of spending
    pub fn smart_tip_report(&self, user_id: i64, now: DateTime<Utc>) -> Result<SmartTip> {
        let since = now - Duration::days(TIP_WINDOW_DAYS);
        let filter = ExpenseFilter::new().date_range(Some(DateRange::since(since)));
        let expenses = self.find_expenses(user_id, &filter)?;
        let categories = self.list_categories(user_id)?;
        Ok(tips::smart_tip(&expenses, &categories, now))
    }
}

#[async_trait]
impl ExpenseSource for Database {
    async fn find_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let db = self.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || Database::find_expenses(&db, user_id, &filter)).await?
    }
}
