use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::{self, Principal, Resource};
use crate::errors::{AppError, AppResult};
use crate::models::team::{
    AssignMentorRequest, TeamDetailResponse, TeamListResponse, TeamMutationResponse,
    UpdateApprovalRequest,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamDetailsQuery {
    pub team_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/teams",
    tag = "Teams",
    responses((status = 200, description = "Teams visible to the caller", body = TeamListResponse))
)]
pub async fn list_teams(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<TeamListResponse>> {
    let scope = authz::read_scope(&principal, Resource::Teams);
    let teams = aggregate::teams_in_scope(&state.pool, &scope).await?;
    let teams = aggregate::team_summaries(&state.pool, teams).await;

    Ok(Json(TeamListResponse { teams }))
}

#[utoipa::path(
    get,
    path = "/teams/details",
    tag = "Teams",
    params(TeamDetailsQuery),
    responses(
        (status = 200, description = "Team aggregate", body = TeamDetailResponse),
        (status = 404, description = "Team not found")
    )
)]
pub async fn team_details(
    State(state): State<AppState>,
    _principal: Principal,
    Query(query): Query<TeamDetailsQuery>,
) -> AppResult<Json<TeamDetailResponse>> {
    let team_id = query
        .team_id
        .ok_or_else(|| AppError::validation("Team ID is required"))?;

    let detail = aggregate::team_detail(&state.pool, team_id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/teams/update-approval",
    tag = "Teams",
    request_body = UpdateApprovalRequest,
    responses(
        (status = 200, description = "Approval updated", body = TeamMutationResponse),
        (status = 403, description = "Not an HOD of the team's department")
    )
)]
pub async fn update_approval(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<UpdateApprovalRequest>,
) -> AppResult<Json<TeamMutationResponse>> {
    let team = aggregate::fetch_team(&state.pool, payload.team_id).await?;
    authz::ensure_can_approve_team(&principal, &team.department)?;

    // Re-setting the same decision is accepted; the operation is idempotent.
    sqlx::query("UPDATE teams SET is_approved = ? WHERE team_id = ?")
        .bind(payload.is_approved)
        .bind(payload.team_id)
        .execute(&state.pool)
        .await?;

    let team = aggregate::fetch_team(&state.pool, payload.team_id).await?;
    let verdict = if payload.is_approved { "approved" } else { "rejected" };

    tracing::info!(team_id = %payload.team_id, verdict, "team approval updated");

    Ok(Json(TeamMutationResponse {
        message: format!("Team {verdict} successfully"),
        team,
    }))
}

#[utoipa::path(
    patch,
    path = "/teams/assign-mentor",
    tag = "Teams",
    request_body = AssignMentorRequest,
    responses(
        (status = 200, description = "Mentor assigned", body = TeamMutationResponse),
        (status = 403, description = "Team outside the caller's scope")
    )
)]
pub async fn assign_mentor(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<AssignMentorRequest>,
) -> AppResult<Json<TeamMutationResponse>> {
    if payload.mentor_id.is_empty() {
        return Err(AppError::validation("Team ID and mentor ID are required"));
    }

    let team = aggregate::fetch_team(&state.pool, payload.team_id).await?;
    authz::ensure_can_assign_mentor(&principal, &team.department, &team.section)?;

    if aggregate::staff_name(&state.pool, &payload.mentor_id).await.is_none() {
        return Err(AppError::not_found("Mentor staff member not found"));
    }

    sqlx::query("UPDATE teams SET mentor = ? WHERE team_id = ?")
        .bind(&payload.mentor_id)
        .bind(payload.team_id)
        .execute(&state.pool)
        .await?;

    let team = aggregate::fetch_team(&state.pool, payload.team_id).await?;

    tracing::info!(team_id = %payload.team_id, mentor = %payload.mentor_id, "mentor assigned");

    Ok(Json(TeamMutationResponse {
        message: "Mentor assigned successfully".to_string(),
        team,
    }))
}
