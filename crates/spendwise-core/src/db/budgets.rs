//! Budget operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetUpdate, NewBudget};

const BUDGET_COLUMNS: &str =
    "id, user_id, category_id, amount, period, start_date, end_date, alert_threshold, created_at";

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidInput("Budget cannot be negative".to_string()));
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(Error::InvalidInput(format!(
            "Alert threshold must be between 0 and 100, got {}",
            threshold
        )));
    }
    Ok(())
}

fn check_dates(start: &DateTime<Utc>, end: Option<&DateTime<Utc>>) -> Result<()> {
    if let Some(end) = end {
        if end < start {
            return Err(Error::InvalidInput(
                "Budget end date is before its start date".to_string(),
            ));
        }
    }
    Ok(())
}

fn check_category(conn: &DbConn, user_id: i64, category_id: Option<i64>) -> Result<()> {
    let Some(cid) = category_id else {
        return Ok(());
    };
    let owner: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM categories WHERE id = ?",
            params![cid],
            |row| row.get(0),
        )
        .optional()?;
    if owner != Some(user_id) {
        return Err(Error::InvalidInput(format!("Unknown category {}", cid)));
    }
    Ok(())
}

impl Database {
    /// List a user's budgets, oldest first
    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ? ORDER BY id",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![user_id], |row| Self::row_to_budget(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
                params![id],
                |row| Self::row_to_budget(row),
            )
            .optional()?;
        Ok(budget)
    }

    /// Create a budget for a user, returning its ID
    pub fn create_budget(&self, user_id: i64, budget: &NewBudget) -> Result<i64> {
        check_amount(budget.amount)?;
        check_threshold(budget.alert_threshold)?;
        check_dates(&budget.start_date, budget.end_date.as_ref())?;

        let conn = self.conn()?;
        check_category(&conn, user_id, budget.category_id)?;

        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category_id, amount, period, start_date, end_date, alert_threshold)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                budget.category_id,
                budget.amount,
                budget.period.as_str(),
                format_datetime(&budget.start_date),
                budget.end_date.as_ref().map(format_datetime),
                budget.alert_threshold,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Apply a partial update to a budget
    pub fn update_budget(&self, id: i64, update: &BudgetUpdate) -> Result<()> {
        let existing = self
            .get_budget(id)?
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))?;
        let conn = self.conn()?;

        let start = update.start_date.unwrap_or(existing.start_date);
        let end = update.end_date.unwrap_or(existing.end_date);
        check_dates(&start, end.as_ref())?;

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(cid) = update.category_id {
            check_category(&conn, existing.user_id, cid)?;
            updates.push("category_id = ?");
            values.push(Box::new(cid));
        }
        if let Some(amount) = update.amount {
            check_amount(amount)?;
            updates.push("amount = ?");
            values.push(Box::new(amount));
        }
        if let Some(period) = update.period {
            updates.push("period = ?");
            values.push(Box::new(period.as_str()));
        }
        if let Some(start_date) = update.start_date {
            updates.push("start_date = ?");
            values.push(Box::new(format_datetime(&start_date)));
        }
        if let Some(end_date) = update.end_date {
            updates.push("end_date = ?");
            values.push(Box::new(end_date.as_ref().map(format_datetime)));
        }
        if let Some(threshold) = update.alert_threshold {
            check_threshold(threshold)?;
            updates.push("alert_threshold = ?");
            values.push(Box::new(threshold));
        }

        if updates.is_empty() {
            return Ok(());
        }

        values.push(Box::new(id));
        let sql = format!("UPDATE budgets SET {} WHERE id = ?", updates.join(", "));
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Ok(())
    }

    /// Delete a budget
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }
        Ok(())
    }

    fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        let period: String = row.get(4)?;
        let start_date: String = row.get(5)?;
        let end_date: Option<String> = row.get(6)?;
        let created_at: String = row.get(8)?;

        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            amount: row.get(3)?,
            period: period.parse().unwrap_or_default(),
            start_date: parse_datetime(&start_date),
            end_date: end_date.as_deref().map(parse_datetime),
            alert_threshold: row.get(7)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
