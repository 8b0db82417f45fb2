//! Smart tip handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::Utc;

use crate::{current_user, AppError, AppState};
use spendwise_core::models::SmartTip;

/// GET /api/tips/smart - One suggestion from the last week of spending
pub async fn get_smart_tip(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SmartTip>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let tip = state.db.smart_tip_report(user.id, Utc::now())?;

    state.db.log_audit(
        &identity,
        "smart_tip",
        Some("tip"),
        None,
        tip.category.as_deref(),
    )?;

    Ok(Json(tip))
}
