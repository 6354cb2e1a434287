//! User Routes
//!
//! - POST /user - Register a user

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{RegisterUserRequest, UserSummary};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::Role;

/// POST /user
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    let Json(req) = payload?;
    validate_register_request(&req)?;

    let user = state
        .insert_user(req)
        .await
        .ok_or_else(|| ApiError::Conflict("El correo ya está registrado".to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

fn validate_register_request(req: &RegisterUserRequest) -> ApiResult<()> {
    let required = [
        ("user_name", &req.user_name),
        ("last_name", &req.last_name),
        ("email", &req.email),
        ("password", &req.password),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation(format!("Invalid email: {}", req.email)));
    }
    if req.role.parse::<Role>().is_err() {
        return Err(ApiError::Validation(format!("Unknown role: {}", req.role)));
    }
    Ok(())
}
