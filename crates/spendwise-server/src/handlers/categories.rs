//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::read_json;
use crate::{current_user, ensure_owner, AppError, AppState, SuccessResponse};
use spendwise_core::models::{Category, CategoryUpdate, NewCategory};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// GET /api/categories - List the caller's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Category>>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let categories = state.db.list_categories(user.id)?;

    state.db.log_audit(
        &identity,
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// POST /api/categories - Create a custom category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: CreateCategoryRequest = read_json(request).await?;

    let id = state.db.create_category(
        user.id,
        &NewCategory {
            name: req.name,
            icon: req.icon,
            color: req.color,
        },
    )?;

    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::internal("Category not found after creation"))?;

    state.db.log_audit(
        &identity,
        "create",
        Some("category"),
        Some(id),
        Some(&category.name),
    )?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id - Rename or restyle a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;
    let req: UpdateCategoryRequest = read_json(request).await?;

    let existing = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    ensure_owner(&user, existing.user_id)?;

    state.db.update_category(
        id,
        &CategoryUpdate {
            name: req.name,
            icon: req.icon,
            color: req.color,
        },
    )?;

    state
        .db
        .log_audit(&identity, "update", Some("category"), Some(id), None)?;

    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a custom category
///
/// Default categories and categories still referenced by expenses are refused.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let (identity, user) = current_user(&state, request.headers())?;

    let existing = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    ensure_owner(&user, existing.user_id)?;

    state.db.delete_category(id)?;

    state.db.log_audit(
        &identity,
        "delete",
        Some("category"),
        Some(id),
        Some(&existing.name),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
