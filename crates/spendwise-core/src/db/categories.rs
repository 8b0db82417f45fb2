//! Category operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    Category, CategoryUpdate, NewCategory, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
};

const CATEGORY_COLUMNS: &str = "id, user_id, name, icon, color, is_default, created_at";

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Category name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Blank strings fall back to the default
fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl Database {
    /// List a user's categories, sorted by name
    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ? ORDER BY name, id",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![user_id], |row| Self::row_to_category(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                params![id],
                |row| Self::row_to_category(row),
            )
            .optional()?;
        Ok(category)
    }

    /// Create a category for a user, returning its ID
    pub fn create_category(&self, user_id: i64, category: &NewCategory) -> Result<i64> {
        let name = clean_name(&category.name)?;
        let icon = or_default(category.icon.as_deref(), DEFAULT_CATEGORY_ICON);
        let color = or_default(category.color.as_deref(), DEFAULT_CATEGORY_COLOR);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (user_id, name, icon, color, is_default) VALUES (?, ?, ?, ?, 0)",
            params![user_id, name, icon, color],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Apply a partial update to a category
    pub fn update_category(&self, id: i64, update: &CategoryUpdate) -> Result<()> {
        let conn = self.conn()?;

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = update.name {
            updates.push("name = ?");
            values.push(Box::new(clean_name(name)?));
        }
        if let Some(ref icon) = update.icon {
            updates.push("icon = ?");
            values.push(Box::new(or_default(Some(icon), DEFAULT_CATEGORY_ICON)));
        }
        if let Some(ref color) = update.color {
            updates.push("color = ?");
            values.push(Box::new(or_default(Some(color), DEFAULT_CATEGORY_COLOR)));
        }

        if updates.is_empty() {
            return if self.get_category(id)?.is_some() {
                Ok(())
            } else {
                Err(Error::NotFound(format!("Category {}", id)))
            };
        }

        values.push(Box::new(id));
        let sql = format!("UPDATE categories SET {} WHERE id = ?", updates.join(", "));
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let changed = conn.execute(&sql, params_refs.as_slice())?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }

    /// Delete a category. Default categories and categories still used by expenses are kept.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let category = self
            .get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))?;

        if category.is_default {
            return Err(Error::InvalidInput(
                "Cannot delete default categories".to_string(),
            ));
        }

        let conn = self.conn()?;
        let in_use: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if in_use > 0 {
            return Err(Error::Conflict(format!(
                "Category '{}' is used by {} expense(s)",
                category.name, in_use
            )));
        }

        conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        Ok(())
    }

    pub(crate) fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        let created_at: String = row.get(6)?;
        Ok(Category {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            is_default: row.get(5)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
