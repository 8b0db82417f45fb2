//! SpendWise Core Library
//!
//! Shared functionality for the SpendWise expense tracker:
//! - Database access and migrations
//! - Spending aggregation (summary, monthly, per-category, daily trends)
//! - Budget consumption and alert evaluation
//! - Rule-based smart tips
//! - UTC calendar windows and report periods

pub mod analytics;
pub mod budget_status;
pub mod db;
pub mod error;
pub mod models;
pub mod period;
pub mod tips;

pub use budget_status::ExpenseSource;
pub use db::{AuditEntry, Database, MAX_PAGE_SIZE};
pub use error::{Error, Result};
pub use period::Period;
