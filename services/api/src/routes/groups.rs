//! Group (team) handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use common::token::AuthUser;
use serde_json::json;
use tracing::{info, warn};

use super::message;
use crate::{
    error::{ApiError, ApiResult},
    invite,
    models::group::{
        ColorRequest, CreateGroupRequest, CreateGroupResponse, GroupSummary, JoinGroupRequest,
        UpdateGroupRequest,
    },
    repositories::{WriteOutcome, group::INVITE_CODE_CONSTRAINT},
    state::AppState,
    validation,
};

/// Groups the caller belongs to
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let groups = state.group_repository.list_for_user(&user.id).await?;

    let groups: Vec<GroupSummary> = groups.into_iter().map(GroupSummary::for_viewer).collect();
    Ok(Json(groups))
}

/// Create a group led by the caller
///
/// A fresh invite code is drawn for every attempt; only a clash on the
/// invite code constraint is retried.
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let group = validation::validate_new_group(payload.name, payload.description)
        .map_err(ApiError::BadRequest)?;

    for attempt in 1..=invite::MAX_INVITE_CODE_ATTEMPTS {
        let invite_code = invite::generate();

        match state
            .group_repository
            .create_with_leader(&group, &invite_code, &user.id)
            .await
        {
            Ok(id) => return Ok(Json(CreateGroupResponse { id, invite_code })),
            Err(e) if e.is_conflict_on(INVITE_CODE_CONSTRAINT) => {
                warn!(
                    "Invite code collision on attempt {}/{}",
                    attempt,
                    invite::MAX_INVITE_CODE_ATTEMPTS
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::CodeGenerationExhausted)
}

/// Group detail; the invite code is only shown to the leader
pub async fn get_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let group = state
        .group_repository
        .find_for_member(id, &user.id)
        .await?
        .ok_or_else(not_a_member)?;

    Ok(Json(group.for_viewer()))
}

/// Rename or re-describe a group; leader only
pub async fn update_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(name) = &payload.name {
        validation::validate_group_name(name).map_err(ApiError::BadRequest)?;
    }

    let outcome = state
        .group_repository
        .update_info(
            id,
            &user.id,
            payload.name.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    match outcome {
        WriteOutcome::Applied(()) => Ok(message("Group updated")),
        WriteOutcome::Forbidden => Err(leader_only()),
        other => Err(unexpected(other)),
    }
}

/// Delete a group with its memberships and schedules; leader only
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    match state.group_repository.delete(id, &user.id).await? {
        WriteOutcome::Applied(()) => Ok(message("Group deleted")),
        WriteOutcome::Forbidden => Err(leader_only()),
        other => Err(unexpected(other)),
    }
}

/// Join a group with its invite code
pub async fn join_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<JoinGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let code = invite::normalize(&payload.invite_code).map_err(ApiError::BadRequest)?;

    match state.group_repository.join(&code, &user.id).await? {
        WriteOutcome::Applied(group_id) => Ok(Json(json!({
            "message": "Joined group",
            "groupId": group_id,
        }))),
        WriteOutcome::NotFound => Err(ApiError::NotFound("Invalid invite code".to_string())),
        WriteOutcome::AlreadyExists => Err(ApiError::Conflict(
            "You are already a member of this group".to_string(),
        )),
        other => Err(unexpected(other)),
    }
}

/// Change the caller's own display color in a group
pub async fn update_color(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ColorRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_color(&payload.color).map_err(ApiError::BadRequest)?;

    if state
        .group_repository
        .update_color(id, &user.id, &payload.color)
        .await?
    {
        Ok(message("Color updated"))
    } else {
        Err(ApiError::NotFound("Membership not found".to_string()))
    }
}

/// Leave a group
pub async fn leave_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    match state.group_repository.leave(id, &user.id).await? {
        WriteOutcome::Applied(()) => Ok(message("Left group")),
        WriteOutcome::NotFound => Err(ApiError::NotFound("Membership not found".to_string())),
        WriteOutcome::Invalid(reason) => Err(ApiError::BadRequest(reason.to_string())),
        other => Err(unexpected(other)),
    }
}

/// Members of a group, visible to its members only
pub async fn list_members(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let members = state
        .group_repository
        .members(id, &user.id)
        .await?
        .ok_or_else(not_a_member)?;

    Ok(Json(members))
}

/// Remove a member by membership id; leader only
pub async fn kick_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, member_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    match state.group_repository.kick(id, member_id, &user.id).await? {
        WriteOutcome::Applied(()) => {
            info!("Member {} removed from group {}", member_id, id);
            Ok(message("Member removed"))
        }
        WriteOutcome::Forbidden => Err(leader_only()),
        WriteOutcome::NotFound => Err(ApiError::NotFound("Member not found".to_string())),
        WriteOutcome::Invalid(reason) => Err(ApiError::BadRequest(reason.to_string())),
        other => Err(unexpected(other)),
    }
}

fn not_a_member() -> ApiError {
    ApiError::Forbidden("You are not a member of this group".to_string())
}

fn leader_only() -> ApiError {
    ApiError::Forbidden("Only the group leader can do this".to_string())
}

fn unexpected<T: std::fmt::Debug>(outcome: WriteOutcome<T>) -> ApiError {
    ApiError::Internal(format!("Unexpected group write outcome: {:?}", outcome))
}
