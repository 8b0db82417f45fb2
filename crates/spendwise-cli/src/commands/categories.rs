//! Category command implementations

use anyhow::Result;
use spendwise_core::db::Database;
use spendwise_core::models::{NewCategory, User};

use super::resolve_category;

pub fn cmd_categories_list(db: &Database, user: &User) -> Result<()> {
    let categories = db.list_categories(user.id)?;

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────────────");

    for category in categories {
        let marker = if category.is_default { "" } else { " (custom)" };
        println!(
            "   [{}] {} {} {}{}",
            category.id, category.icon, category.name, category.color, marker
        );
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    user: &User,
    name: &str,
    icon: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let id = db.create_category(
        user.id,
        &NewCategory {
            name: name.to_string(),
            icon,
            color,
        },
    )?;
    db.log_audit(&user.identity, "create", Some("category"), Some(id), Some(name))?;

    println!("✅ Created category #{}: {}", id, name);

    Ok(())
}

pub fn cmd_categories_delete(db: &Database, user: &User, name_or_id: &str) -> Result<()> {
    let category = resolve_category(db, user, name_or_id)?;

    db.delete_category(category.id)?;
    db.log_audit(
        &user.identity,
        "delete",
        Some("category"),
        Some(category.id),
        Some(&category.name),
    )?;

    println!("🗑️  Deleted category: {}", category.name);

    Ok(())
}
