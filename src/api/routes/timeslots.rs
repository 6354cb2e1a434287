//! Timeslot Routes
//!
//! - POST /timeslots - Store one availability interval
//! - GET /timeslots - List stored intervals

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::TimeslotListResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::{AppState, StoredTimeslot};
use crate::schedule::TimeslotRequest;

/// POST /timeslots
///
/// Times must be `HH:MM` and the end must come after the start.
pub async fn create_timeslot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TimeslotRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredTimeslot>)> {
    let Json(req) = payload?;

    if req.end_time <= req.start_time {
        return Err(ApiError::Validation(format!(
            "endTime {} must be after startTime {}",
            req.end_time, req.start_time
        )));
    }

    let stored = state.add_timeslot(req).await;
    tracing::info!(
        id = %stored.id,
        day = %stored.request.day_of_week,
        start = %stored.request.start_time,
        end = %stored.request.end_time,
        "Timeslot created"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /timeslots
pub async fn list_timeslots(State(state): State<Arc<AppState>>) -> Json<TimeslotListResponse> {
    let timeslots = state.timeslots().await;
    Json(TimeslotListResponse {
        count: timeslots.len(),
        timeslots,
    })
}
