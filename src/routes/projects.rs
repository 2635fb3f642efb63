use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::{self, Principal, Resource};
use crate::errors::{AppError, AppResult};
use crate::models::project::{
    ProjectApprovalRequest, ProjectDetailResponse, ProjectListResponse, ProjectMutationResponse,
};
use crate::workflow;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectDetailsQuery {
    pub project_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    responses((status = 200, description = "Projects visible to the caller", body = ProjectListResponse))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ProjectListResponse>> {
    let scope = authz::read_scope(&principal, Resource::Projects);
    let projects = aggregate::projects_in_scope(&state.pool, &scope).await?;
    let projects = aggregate::project_summaries(&state.pool, projects).await;

    Ok(Json(ProjectListResponse { projects }))
}

#[utoipa::path(
    get,
    path = "/projects/details",
    tag = "Projects",
    params(ProjectDetailsQuery),
    responses(
        (status = 200, description = "Project aggregate", body = ProjectDetailResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn project_details(
    State(state): State<AppState>,
    _principal: Principal,
    Query(query): Query<ProjectDetailsQuery>,
) -> AppResult<Json<ProjectDetailResponse>> {
    let project_id = query
        .project_id
        .ok_or_else(|| AppError::validation("Project ID is required"))?;

    let detail = aggregate::project_detail(&state.pool, project_id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/projects/approve-mentors",
    tag = "Projects",
    request_body = ProjectApprovalRequest,
    responses(
        (status = 200, description = "Mentor approval updated", body = ProjectMutationResponse),
        (status = 403, description = "Caller is not the team's mentor")
    )
)]
pub async fn approve_mentors(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ProjectApprovalRequest>,
) -> AppResult<Json<ProjectMutationResponse>> {
    authz::ensure_mentor_role(&principal)?;

    let project = aggregate::fetch_project(&state.pool, payload.project_id).await?;
    let team = aggregate::fetch_team(&state.pool, project.team_id).await?;
    authz::ensure_mentor_of_project_team(&principal, team.mentor.as_deref())?;

    sqlx::query("UPDATE projects SET is_approved = ? WHERE project_id = ?")
        .bind(payload.approved)
        .bind(payload.project_id)
        .execute(&state.pool)
        .await?;

    let project = aggregate::fetch_project(&state.pool, payload.project_id).await?;
    let verdict = if payload.approved { "approved" } else { "unapproved" };

    tracing::info!(project_id = %payload.project_id, verdict, "mentor approval updated");

    Ok(Json(ProjectMutationResponse {
        message: format!("Project {verdict} successfully"),
        project,
    }))
}

#[utoipa::path(
    patch,
    path = "/projects/approve-hod",
    tag = "Projects",
    request_body = ProjectApprovalRequest,
    responses(
        (status = 200, description = "HOD approval updated", body = ProjectMutationResponse),
        (status = 400, description = "Mentor approval missing"),
        (status = 403, description = "Caller is not an HOD of the team's department")
    )
)]
pub async fn approve_hod(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ProjectApprovalRequest>,
) -> AppResult<Json<ProjectMutationResponse>> {
    let project = aggregate::fetch_project(&state.pool, payload.project_id).await?;
    let team = aggregate::fetch_team(&state.pool, project.team_id).await?;

    authz::ensure_can_hod_approve(&principal, &team.department)?;
    // Final approval is gated on a standing mentor approval.
    workflow::ensure_hod_gate(project.is_approved)?;

    sqlx::query("UPDATE projects SET is_hod_approved = ? WHERE project_id = ?")
        .bind(payload.approved)
        .bind(payload.project_id)
        .execute(&state.pool)
        .await?;

    let project = aggregate::fetch_project(&state.pool, payload.project_id).await?;
    let verdict = if payload.approved { "approved" } else { "unapproved" };

    tracing::info!(project_id = %payload.project_id, verdict, "hod approval updated");

    Ok(Json(ProjectMutationResponse {
        message: format!("Project {verdict} by HOD successfully"),
        project,
    }))
}
