//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_user` / `resolve_category` - Name lookups shared by commands
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_core::db::Database;
use spendwise_core::models::{Category, User};

/// Open (and migrate) the database at the given path
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Map an identity to its user row, creating it with default categories on first use
pub fn resolve_user(db: &Database, identity: &str) -> Result<User> {
    db.ensure_user(identity)
        .with_context(|| format!("Failed to load user '{}'", identity))
}

/// Find one of the user's categories by ID or case-insensitive name
pub fn resolve_category(db: &Database, user: &User, name_or_id: &str) -> Result<Category> {
    let categories = db.list_categories(user.id)?;

    if let Ok(id) = name_or_id.parse::<i64>() {
        if let Some(category) = categories.iter().find(|c| c.id == id) {
            return Ok(category.clone());
        }
    }

    categories
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name_or_id.trim()))
        .ok_or_else(|| anyhow::anyhow!("Category '{}' not found", name_or_id))
}

pub fn cmd_init(db_path: &Path, identity: &str) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    let user = resolve_user(&db, identity)?;
    let categories = db.list_categories(user.id)?;
    println!(
        "   User '{}' ready with {} categories",
        user.identity,
        categories.len()
    );

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: spendwise expenses add Lunch 12.50 --category Food");
    println!("  2. Start web UI: spendwise serve");

    Ok(())
}
