//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

pub mod analytics;
pub mod audit;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod tips;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use expenses::*;
pub use tips::*;

/// Read and decode a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}
