//! SQL construction for expense filters
//!
//! Turns an [`ExpenseFilter`] into a WHERE clause plus parameters so listing,
//! counting and report queries share the same conditions.

use crate::models::ExpenseFilter;

use super::format_datetime;

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword; always scoped to one user
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: &'static str,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl ExpenseFilter {
    /// Build the filter components for one user's expenses (table alias `e`)
    pub fn build(&self, user_id: i64) -> FilterResult {
        let mut conditions = vec!["e.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(cid) = self.category_id {
            conditions.push("e.category_id = ?".to_string());
            params.push(Box::new(cid));
        }

        if let Some(range) = &self.date_range {
            if let Some(start) = range.start {
                conditions.push("e.date >= ?".to_string());
                params.push(Box::new(format_datetime(&start)));
            }
            if let Some(end) = range.end {
                conditions.push("e.date <= ?".to_string());
                params.push(Box::new(format_datetime(&end)));
            }
        }

        // Search filter (title and description)
        if let Some(q) = self.search.as_deref() {
            if !q.trim().is_empty() {
                conditions.push(
                    "(e.title LIKE ? ESCAPE '\\' OR e.description LIKE ? ESCAPE '\\')"
                        .to_string(),
                );
                let pattern = format!("%{}%", escape_like(q.trim()));
                params.push(Box::new(pattern.clone()));
                params.push(Box::new(pattern));
            }
        }

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            order_clause: "ORDER BY e.date DESC, e.id DESC",
            params,
        }
    }
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM expenses e {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Take the parameter vector to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_user_scope_always_present() {
        let result = ExpenseFilter::new().build(7);
        assert_eq!(result.where_clause, "WHERE e.user_id = ?");
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_all_conditions() {
        let range = DateRange::between(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
        );
        let result = ExpenseFilter::new()
            .category_id(Some(3))
            .date_range(Some(range))
            .search(Some(" coffee ".to_string()))
            .build(1);

        assert!(result.where_clause.contains("e.category_id = ?"));
        assert!(result.where_clause.contains("e.date >= ?"));
        assert!(result.where_clause.contains("e.date <= ?"));
        assert!(result.where_clause.contains("LIKE ? ESCAPE"));
        // user, category, start, end, two search patterns
        assert_eq!(result.params.len(), 6);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("coffee"), "coffee");
    }

    #[test]
    fn test_open_ended_range_and_blank_search() {
        let range = DateRange::since(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let result = ExpenseFilter::new()
            .date_range(Some(range))
            .search(Some("   ".to_string()))
            .build(1);

        assert!(result.where_clause.contains("e.date >= ?"));
        assert!(!result.where_clause.contains("e.date <= ?"));
        assert!(!result.where_clause.contains("LIKE"));
        assert_eq!(result.params.len(), 2);
        assert!(result.build_count_query().starts_with("SELECT COUNT(*) FROM expenses e WHERE"));
    }
}
