//! Auth Routes
//!
//! - POST /auth - Exchange email and password for a bearer token

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{LoginRequest, LoginResponseBody};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// POST /auth
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponseBody>> {
    let Json(req) = payload?;

    let (access_token, user) = state
        .authenticate(&req.email, &req.password)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Credenciales inválidas".to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponseBody {
        access_token,
        user: user.into(),
    }))
}
