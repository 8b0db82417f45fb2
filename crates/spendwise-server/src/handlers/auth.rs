//! Authentication-related handlers

use std::sync::Arc;

use axum::extract::Request;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::{current_user, AppError, AppState, API_KEY_IDENTITY, LOCAL_DEV_IDENTITY};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The caller's email or identifier
    pub user: String,
    /// Internal user ID the identity maps to
    pub user_id: i64,
    /// How the user was authenticated
    pub auth_method: String,
}

/// Response for the /api/health endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/me - Get the current user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MeResponse>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let auth_method = if identity == API_KEY_IDENTITY {
        "api_key"
    } else if identity == LOCAL_DEV_IDENTITY {
        "none"
    } else {
        "access_proxy"
    };

    Ok(Json(MeResponse {
        user: identity,
        user_id: user.id,
        auth_method: auth_method.to_string(),
    }))
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
