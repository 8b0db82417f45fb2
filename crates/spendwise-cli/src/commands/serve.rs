//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_server::{parse_list, ServerConfig};

use super::open_db;

/// Comma-separated bearer keys accepted by the API
pub const API_KEYS_ENV: &str = "SPENDWISE_API_KEYS";

/// Comma-separated origins allowed by CORS
pub const ALLOWED_ORIGINS_ENV: &str = "SPENDWISE_ALLOWED_ORIGINS";

/// Build the server configuration from flags and environment values
pub fn server_config(no_auth: bool, api_keys: &str, allowed_origins: &str) -> ServerConfig {
    ServerConfig {
        require_auth: !no_auth,
        allowed_origins: parse_list(allowed_origins),
        api_keys: parse_list(api_keys),
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting SpendWise web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = server_config(
        no_auth,
        &std::env::var(API_KEYS_ENV).unwrap_or_default(),
        &std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default(),
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: access proxy header");
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                config.api_keys.len(),
                API_KEYS_ENV
            );
        }
    }
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} ({})",
            config.allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    spendwise_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
