//! Smart tip command

use anyhow::Result;
use chrono::Utc;
use spendwise_core::db::Database;
use spendwise_core::models::User;

pub fn cmd_tip(db: &Database, user: &User, json: bool) -> Result<()> {
    let tip = db.smart_tip_report(user.id, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tip)?);
        return Ok(());
    }

    println!();
    println!("{} {}", tip.icon, tip.message);
    println!("   👉 {}", tip.suggestion);

    Ok(())
}
