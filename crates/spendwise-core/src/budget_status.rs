//! Budget consumption and alert evaluation
//!
//! Each budget is evaluated against its own window: the current calendar
//! month for monthly budgets, otherwise the budget's start date through its
//! end date (or now). Expense queries go through [`ExpenseSource`] so the
//! evaluator can run against the database or an in-memory fixture.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::analytics::share_percent;
use crate::error::Result;
use crate::models::{Budget, BudgetPeriod, BudgetStatus, DateRange, Expense, ExpenseFilter};
use crate::period::{month_end, month_start};

/// Read access to a user's expenses
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// All of the user's expenses matching `filter`
    async fn find_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>>;
}

/// The window a budget is measured over at `now`
pub fn budget_window(budget: &Budget, now: DateTime<Utc>) -> DateRange {
    match budget.period {
        // Monthly budgets ignore their own dates
        BudgetPeriod::Monthly => DateRange::between(month_start(now), month_end(now)),
        BudgetPeriod::Yearly => {
            DateRange::between(budget.start_date, budget.end_date.unwrap_or(now))
        }
    }
}

/// Derive a status from a budget and the amount spent in its window
pub fn status_for(budget: Budget, spent: f64) -> BudgetStatus {
    let remaining = budget.amount - spent;
    let is_over_budget = spent > budget.amount;

    // Alert on the unrounded ratio; only the reported percentage is rounded
    let (percentage_used, is_near_limit) = if budget.amount > 0.0 {
        let raw = spent / budget.amount * 100.0;
        (
            Some(share_percent(spent, budget.amount)),
            raw >= budget.alert_threshold,
        )
    } else {
        (None, is_over_budget)
    };

    BudgetStatus {
        budget,
        category: None,
        spent,
        remaining,
        percentage_used,
        is_over_budget,
        is_near_limit,
    }
}

async fn evaluate_one<S>(budget: Budget, source: Arc<S>, now: DateTime<Utc>) -> Result<BudgetStatus>
where
    S: ExpenseSource + ?Sized,
{
    let filter = ExpenseFilter::new()
        .category_id(budget.category_id)
        .date_range(Some(budget_window(&budget, now)));

    let expenses = source.find_expenses(budget.user_id, &filter).await?;
    let spent: f64 = expenses.iter().map(|e| e.amount).sum();

    debug!(
        budget_id = budget.id,
        spent,
        matched = expenses.len(),
        "Evaluated budget"
    );

    Ok(status_for(budget, spent))
}

/// Evaluate every budget concurrently.
///
/// Results keep the order of `budgets`. The first failure is returned and
/// the remaining evaluations are cancelled.
pub async fn evaluate<S>(
    budgets: Vec<Budget>,
    source: Arc<S>,
    now: DateTime<Utc>,
) -> Result<Vec<BudgetStatus>>
where
    S: ExpenseSource + ?Sized + 'static,
{
    let handles: Vec<JoinHandle<Result<BudgetStatus>>> = budgets
        .into_iter()
        .map(|budget| tokio::spawn(evaluate_one(budget, Arc::clone(&source), now)))
        .collect();

    let mut statuses = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(handle) = pending.next() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(join_err.into()),
        };
        match outcome {
            Ok(status) => statuses.push(status),
            Err(e) => {
                warn!("Budget evaluation failed: {}", e);
                for rest in pending {
                    rest.abort();
                }
                return Err(e);
            }
        }
    }

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::PaymentMethod;
    use chrono::{Duration, TimeZone};
    use std::time::Duration as StdDuration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn budget(id: i64, amount: f64, category_id: Option<i64>, period: BudgetPeriod) -> Budget {
        Budget {
            id,
            user_id: 1,
            category_id,
            amount,
            period,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
            alert_threshold: 80.0,
            created_at: now(),
        }
    }

    fn expense(user_id: i64, amount: f64, category_id: i64, date: DateTime<Utc>) -> Expense {
        Expense {
            id: 0,
            user_id,
            title: "t".to_string(),
            amount,
            category_id,
            date,
            description: String::new(),
            payment_method: PaymentMethod::Cash,
            tags: vec![],
            created_at: date,
        }
    }

    struct MemorySource {
        expenses: Vec<Expense>,
    }

    #[async_trait]
    impl ExpenseSource for MemorySource {
        async fn find_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
            Ok(self
                .expenses
                .iter()
                .filter(|e| e.user_id == user_id && filter.matches(e))
                .cloned()
                .collect())
        }
    }

    /// Fails for one category, and answers earlier categories more slowly
    struct FlakySource {
        fail_category: Option<i64>,
    }

    #[async_trait]
    impl ExpenseSource for FlakySource {
        async fn find_expenses(&self, _user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
            let cid = filter.category_id.unwrap_or(0);
            tokio::time::sleep(StdDuration::from_millis((5 - cid.min(5)) as u64 * 10)).await;
            if Some(cid) == self.fail_category {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "store offline",
                )));
            }
            Ok(vec![expense(1, cid as f64, cid, now())])
        }
    }

    #[tokio::test]
    async fn test_over_budget_monthly() {
        let source = Arc::new(MemorySource {
            expenses: vec![
                expense(1, 150.0, 1, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()),
                expense(1, 100.0, 1, Utc.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap()),
                // Outside the current month
                expense(1, 500.0, 1, Utc.with_ymd_and_hms(2024, 5, 31, 23, 0, 0).unwrap()),
                // Other category
                expense(1, 70.0, 2, Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()),
            ],
        });

        let statuses = evaluate(vec![budget(1, 200.0, Some(1), BudgetPeriod::Monthly)], source, now())
            .await
            .unwrap();

        let s = &statuses[0];
        assert_eq!(s.spent, 250.0);
        assert_eq!(s.remaining, -50.0);
        assert_eq!(s.percentage_used, Some(125));
        assert!(s.is_over_budget);
        assert!(s.is_near_limit);
    }

    #[tokio::test]
    async fn test_overall_budget_counts_all_categories() {
        let source = Arc::new(MemorySource {
            expenses: vec![
                expense(1, 30.0, 1, now() - Duration::days(1)),
                expense(1, 30.0, 2, now() - Duration::days(2)),
                // Another user's spending is never counted
                expense(2, 900.0, 1, now()),
            ],
        });

        let statuses = evaluate(vec![budget(1, 100.0, None, BudgetPeriod::Monthly)], source, now())
            .await
            .unwrap();

        assert_eq!(statuses[0].spent, 60.0);
        assert_eq!(statuses[0].percentage_used, Some(60));
        assert!(!statuses[0].is_near_limit);
        assert!(!statuses[0].is_over_budget);
    }

    #[tokio::test]
    async fn test_yearly_budget_uses_own_window() {
        let mut b = budget(1, 1000.0, None, BudgetPeriod::Yearly);
        b.start_date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        b.end_date = Some(Utc.with_ymd_and_hms(2024, 4, 30, 23, 59, 59).unwrap());

        let source = Arc::new(MemorySource {
            expenses: vec![
                expense(1, 400.0, 1, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()),
                expense(1, 450.0, 1, Utc.with_ymd_and_hms(2024, 4, 30, 23, 59, 59).unwrap()),
                expense(1, 999.0, 1, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            ],
        });

        let statuses = evaluate(vec![b], source, now()).await.unwrap();
        assert_eq!(statuses[0].spent, 850.0);
        assert_eq!(statuses[0].percentage_used, Some(85));
        assert!(statuses[0].is_near_limit);
        assert!(!statuses[0].is_over_budget);
    }

    #[test]
    fn test_zero_amount_budget() {
        let untouched = status_for(budget(1, 0.0, None, BudgetPeriod::Monthly), 0.0);
        assert_eq!(untouched.percentage_used, None);
        assert!(!untouched.is_over_budget);
        assert!(!untouched.is_near_limit);

        let spent = status_for(budget(1, 0.0, None, BudgetPeriod::Monthly), 5.0);
        assert_eq!(spent.percentage_used, None);
        assert!(spent.is_over_budget);
        assert!(spent.is_near_limit);
        assert_eq!(spent.remaining, -5.0);

        let json = serde_json::to_value(&spent).unwrap();
        assert!(json["percentage_used"].is_null());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut b = budget(1, 100.0, None, BudgetPeriod::Monthly);
        b.alert_threshold = 50.0;
        assert!(status_for(b.clone(), 50.0).is_near_limit);
        assert!(!status_for(b, 49.0).is_near_limit);
    }

    #[test]
    fn test_threshold_uses_unrounded_share() {
        let b = budget(1, 100.0, None, BudgetPeriod::Monthly);

        let s = status_for(b.clone(), 79.6);
        assert_eq!(s.percentage_used, Some(80));
        assert!(!s.is_near_limit);

        assert!(status_for(b, 80.0).is_near_limit);
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let budgets = (1..=4)
            .map(|cid| budget(cid, 10.0, Some(cid), BudgetPeriod::Monthly))
            .collect();
        let source = Arc::new(FlakySource { fail_category: None });

        let statuses = evaluate(budgets, source, now()).await.unwrap();
        let ids: Vec<i64> = statuses.iter().map(|s| s.budget.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(statuses[2].spent, 3.0);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let budgets = (1..=3)
            .map(|cid| budget(cid, 10.0, Some(cid), BudgetPeriod::Monthly))
            .collect();
        let source = Arc::new(FlakySource {
            fail_category: Some(2),
        });

        let err = evaluate(budgets, source, now()).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_input_error());
    }

    #[tokio::test]
    async fn test_no_budgets() {
        let source = Arc::new(MemorySource { expenses: vec![] });
        assert!(evaluate(vec![], source, now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accepts_trait_object() {
        let source: Arc<dyn ExpenseSource> = Arc::new(MemorySource { expenses: vec![] });
        let statuses = evaluate(vec![budget(1, 50.0, None, BudgetPeriod::Monthly)], source, now())
            .await
            .unwrap();
        assert_eq!(statuses[0].spent, 0.0);
        assert_eq!(statuses[0].percentage_used, Some(0));
    }
}
