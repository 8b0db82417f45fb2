//! Expense operations

use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{
    normalize_tags, Expense, ExpenseFilter, ExpensePage, ExpenseUpdate, NewExpense,
};

/// Largest page size accepted by [`Database::list_expenses_page`]
pub const MAX_PAGE_SIZE: i64 = 1000;

const EXPENSE_COLUMNS: &str = "e.id, e.user_id, e.title, e.amount, e.category_id, e.date, \
     e.description, e.payment_method, e.tags, e.created_at";

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Expense title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(())
}

/// Expenses may only reference categories of the same user
fn check_category_owner(conn: &DbConn, user_id: i64, category_id: i64) -> Result<()> {
    let owner: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM categories WHERE id = ?",
            params![category_id],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        Some(uid) if uid == user_id => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "Unknown category {}",
            category_id
        ))),
    }
}

impl Database {
    /// All of a user's expenses matching a filter, newest first
    pub fn find_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let built = filter.build(user_id);

        let sql = format!(
            "SELECT {} FROM expenses e {} {}",
            EXPENSE_COLUMNS, built.where_clause, built.order_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let params_refs = built.params_refs();

        let expenses = stmt
            .query_map(params_refs.as_slice(), |row| Self::row_to_expense(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count a user's expenses matching a filter
    pub fn count_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<i64> {
        let conn = self.conn()?;
        let built = filter.build(user_id);
        let params_refs = built.params_refs();
        let count: i64 =
            conn.query_row(&built.build_count_query(), params_refs.as_slice(), |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// One page of a user's expenses (1-based page number), newest first
    pub fn list_expenses_page(
        &self,
        user_id: i64,
        filter: &ExpenseFilter,
        page: i64,
        limit: i64,
    ) -> Result<ExpensePage> {
        if page < 1 {
            return Err(Error::InvalidInput("Page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let total = self.count_expenses(user_id, filter)?;

        let conn = self.conn()?;
        let built = filter.build(user_id);
        let sql = format!(
            "SELECT {} FROM expenses e {} {} LIMIT ? OFFSET ?",
            EXPENSE_COLUMNS, built.where_clause, built.order_clause
        );
        let mut all_params = built.into_params();
        all_params.push(Box::new(limit));
        all_params.push(Box::new((page - 1) * limit));
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            all_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params_refs.as_slice(), |row| Self::row_to_expense(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ExpensePage {
            expenses,
            total,
            total_pages: (total + limit - 1) / limit,
            current_page: page,
        })
    }

    /// Get an expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses e WHERE e.id = ?", EXPENSE_COLUMNS),
                params![id],
                |row| Self::row_to_expense(row),
            )
            .optional()?;
        Ok(expense)
    }

    /// Record an expense for a user, returning its ID
    pub fn create_expense(&self, user_id: i64, expense: &NewExpense) -> Result<i64> {
        let title = clean_title(&expense.title)?;
        check_amount(expense.amount)?;

        let conn = self.conn()?;
        check_category_owner(&conn, user_id, expense.category_id)?;

        let tags = serde_json::to_string(&normalize_tags(&expense.tags))?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, title, amount, category_id, date, description, payment_method, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                title,
                expense.amount,
                expense.category_id,
                format_datetime(&expense.date),
                expense.description.trim(),
                expense.payment_method.as_str(),
                tags,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Apply a partial update to an expense
    pub fn update_expense(&self, id: i64, update: &ExpenseUpdate) -> Result<()> {
        let existing = self
            .get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;
        let conn = self.conn()?;

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = update.title {
            updates.push("title = ?");
            values.push(Box::new(clean_title(title)?));
        }
        if let Some(amount) = update.amount {
            check_amount(amount)?;
            updates.push("amount = ?");
            values.push(Box::new(amount));
        }
        if let Some(cid) = update.category_id {
            check_category_owner(&conn, existing.user_id, cid)?;
            updates.push("category_id = ?");
            values.push(Box::new(cid));
        }
        if let Some(date) = update.date {
            updates.push("date = ?");
            values.push(Box::new(format_datetime(&date)));
        }
        if let Some(ref description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description.trim().to_string()));
        }
        if let Some(method) = update.payment_method {
            updates.push("payment_method = ?");
            values.push(Box::new(method.as_str()));
        }
        if let Some(ref tags) = update.tags {
            updates.push("tags = ?");
            values.push(Box::new(serde_json::to_string(&normalize_tags(tags))?));
        }

        if updates.is_empty() {
            return Ok(());
        }

        values.push(Box::new(id));
        let sql = format!("UPDATE expenses SET {} WHERE id = ?", updates.join(", "));
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Ok(())
    }

    /// Delete an expense
    pub fn delete_expense(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }

    fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let date: String = row.get(5)?;
        let payment_method: String = row.get(7)?;
        let tags: String = row.get(8)?;
        let created_at: String = row.get(9)?;

        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            amount: row.get(3)?,
            category_id: row.get(4)?,
            date: parse_datetime(&date),
            description: row.get(6)?,
            payment_method: payment_method.parse().unwrap_or_default(),
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            created_at: parse_datetime(&created_at),
        })
    }
}
