//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, resolve_user, resolve_category)
//! - `expenses` - Expense commands (list, add, delete)
//! - `categories` - Category commands (list, add, delete)
//! - `budgets` - Budget commands (list, add, delete, status)
//! - `reports` - Report generation commands
//! - `serve` - Web server command
//! - `tips` - Smart tip command

pub mod budgets;
pub mod categories;
pub mod core;
pub mod expenses;
pub mod reports;
pub mod serve;
pub mod tips;

// Re-export command functions for main.rs
pub use budgets::*;
pub use categories::*;
pub use core::*;
pub use expenses::*;
pub use reports::*;
pub use serve::*;
pub use tips::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
