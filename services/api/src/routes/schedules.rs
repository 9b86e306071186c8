//! Schedule handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use common::token::AuthUser;
use tracing::{info, warn};

use super::message;
use crate::{
    access,
    error::{ApiError, ApiResult},
    models::{
        CreatedResponse,
        schedule::{ScheduleRequest, ScheduleView},
    },
    repositories::WriteOutcome,
    state::AppState,
    validation,
};

/// Every schedule the caller may see
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let schedules = state.schedule_repository.list_visible(&user.id).await?;

    let views: Vec<ScheduleView> = schedules.into_iter().map(ScheduleView::from).collect();
    Ok(Json(views))
}

/// One schedule, with the group name when it is group-scoped
pub async fn get_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let schedule = state
        .schedule_repository
        .find_for_viewer(id, &user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Schedule not found".to_string()))?;

    if !access::can_view_schedule(&schedule, &user.id) {
        warn!("User {} denied read access to schedule {}", user.id, id);
        return Err(ApiError::Forbidden(
            "You do not have access to this schedule".to_string(),
        ));
    }

    Ok(Json(ScheduleView::from(schedule)))
}

/// Create a schedule owned by the caller
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = validation::validate_schedule(payload).map_err(ApiError::BadRequest)?;

    match state.schedule_repository.create(&user.id, &input).await? {
        WriteOutcome::Applied(id) => Ok(Json(CreatedResponse { id })),
        WriteOutcome::Forbidden => Err(not_a_member()),
        other => Err(unexpected(other)),
    }
}

/// Replace a schedule; owner only
pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = validation::validate_schedule(payload).map_err(ApiError::BadRequest)?;

    match state.schedule_repository.update(id, &user.id, &input).await? {
        WriteOutcome::Applied(()) => Ok(message("Schedule updated")),
        WriteOutcome::NotFound => Err(ApiError::NotFound("Schedule not found".to_string())),
        WriteOutcome::Forbidden => Err(ApiError::Forbidden(
            "Only the owner can change this schedule, within groups they belong to".to_string(),
        )),
        other => Err(unexpected(other)),
    }
}

/// Delete a schedule; owner only
pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    match state.schedule_repository.delete(id, &user.id).await? {
        WriteOutcome::Applied(()) => {
            info!("User {} deleted schedule {}", user.id, id);
            Ok(message("Schedule deleted"))
        }
        WriteOutcome::NotFound => Err(ApiError::NotFound("Schedule not found".to_string())),
        WriteOutcome::Forbidden => Err(ApiError::Forbidden(
            "Only the owner can delete this schedule".to_string(),
        )),
        other => Err(unexpected(other)),
    }
}

fn not_a_member() -> ApiError {
    ApiError::Forbidden("You are not a member of this group".to_string())
}

fn unexpected<T: std::fmt::Debug>(outcome: WriteOutcome<T>) -> ApiError {
    ApiError::Internal(format!("Unexpected schedule write outcome: {:?}", outcome))
}
