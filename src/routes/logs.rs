use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::{self, Principal, Role};
use crate::errors::{AppError, AppResult};
use crate::models::log::{
    Log, LogApproveRequest, LogMutationResponse, PendingLog, PendingLogsResponse, StudentLog,
    StudentLogsResponse, StudentListResponse,
};
use crate::models::student::Student;
use crate::workflow;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentLogsQuery {
    pub student_id: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/logs/approve",
    tag = "Logs",
    request_body = LogApproveRequest,
    responses(
        (status = 200, description = "Log decision recorded", body = LogMutationResponse),
        (status = 403, description = "Caller is not the team's mentor")
    )
)]
pub async fn approve_log(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<LogApproveRequest>,
) -> AppResult<Json<LogMutationResponse>> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can approve logs"));
    }

    let log = aggregate::fetch_log(&state.pool, payload.log_id).await?;
    let team = aggregate::fetch_team(&state.pool, log.team_id).await?;
    authz::ensure_log_approver(&principal, team.mentor.as_deref())?;

    // One decision per log; retrying the same decision is a no-op.
    workflow::ensure_log_transition(log.mentor_approved, payload.approved)?;

    match &payload.comments {
        Some(comments) => {
            sqlx::query("UPDATE logs SET mentor_approved = ?, comments = ? WHERE id = ?")
                .bind(payload.approved)
                .bind(comments)
                .bind(payload.log_id)
                .execute(&state.pool)
                .await?;
        }
        None => {
            sqlx::query("UPDATE logs SET mentor_approved = ? WHERE id = ?")
                .bind(payload.approved)
                .bind(payload.log_id)
                .execute(&state.pool)
                .await?;
        }
    }

    let log = aggregate::fetch_log(&state.pool, payload.log_id).await?;
    let verdict = if payload.approved { "approved" } else { "rejected" };

    tracing::info!(log_id = %payload.log_id, verdict, "log decision recorded");

    Ok(Json(LogMutationResponse {
        message: format!("Log {verdict} successfully"),
        log,
    }))
}

#[utoipa::path(
    get,
    path = "/logs/pending",
    tag = "Logs",
    responses(
        (status = 200, description = "Logs awaiting a decision", body = PendingLogsResponse),
        (status = 403, description = "Caller is not a project mentor")
    )
)]
pub async fn pending_logs(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<PendingLogsResponse>> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can view pending logs"));
    }

    let team_ids = aggregate::mentored_team_ids(&state.pool, &principal.staff_id).await?;
    if team_ids.is_empty() {
        return Ok(Json(PendingLogsResponse { logs: Vec::new() }));
    }

    let logs = sqlx::query_as::<_, Log>(
        "SELECT id, student_id, team_id, date, expected_task, completed_task, comments, mentor_approved, created_at \
         FROM logs WHERE team_id IN (SELECT team_id FROM teams WHERE mentor = ?) \
         AND mentor_approved IS NULL ORDER BY created_at DESC",
    )
    .bind(&principal.staff_id)
    .fetch_all(&state.pool)
    .await?;

    let mut pending = Vec::with_capacity(logs.len());
    for log in logs {
        let student_name = aggregate::student_name(&state.pool, &log.student_id)
            .await
            .unwrap_or_else(|| "Unknown Student".to_string());
        let (team_topic, team_code) = team_context(&state.pool, log.team_id).await;

        pending.push(PendingLog {
            id: log.id,
            created_at: log.created_at,
            date: log.date,
            expected_task: log.expected_task,
            completed_task: log.completed_task,
            comments: log.comments,
            student_id: log.student_id,
            student_name,
            team_id: log.team_id,
            team_topic,
            team_code,
        });
    }

    Ok(Json(PendingLogsResponse { logs: pending }))
}

#[utoipa::path(
    get,
    path = "/logs/student",
    tag = "Logs",
    params(StudentLogsQuery),
    responses(
        (status = 200, description = "One student's log history", body = StudentLogsResponse),
        (status = 403, description = "Caller is not a project mentor")
    )
)]
pub async fn student_logs(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<StudentLogsQuery>,
) -> AppResult<Json<StudentLogsResponse>> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can view student logs"));
    }

    let student_id = query
        .student_id
        .ok_or_else(|| AppError::validation("Student ID is required"))?;

    let logs = sqlx::query_as::<_, Log>(
        "SELECT id, student_id, team_id, date, expected_task, completed_task, comments, mentor_approved, created_at \
         FROM logs WHERE student_id = ? \
         AND team_id IN (SELECT team_id FROM teams WHERE mentor = ?) ORDER BY date DESC",
    )
    .bind(&student_id)
    .bind(&principal.staff_id)
    .fetch_all(&state.pool)
    .await?;

    let student = aggregate::student_record(&state.pool, &student_id)
        .await
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    let mut history = Vec::with_capacity(logs.len());
    for log in logs {
        let (team_topic, team_code) = team_context(&state.pool, log.team_id).await;
        history.push(StudentLog {
            id: log.id,
            created_at: log.created_at,
            date: log.date,
            expected_task: log.expected_task,
            completed_task: log.completed_task,
            comments: log.comments,
            mentor_approved: log.mentor_approved,
            team_id: log.team_id,
            team_topic,
            team_code,
        });
    }

    Ok(Json(StudentLogsResponse {
        student,
        logs: history,
    }))
}

#[utoipa::path(
    get,
    path = "/logs/students",
    tag = "Logs",
    responses(
        (status = 200, description = "Students with logs in the mentor's teams", body = StudentListResponse),
        (status = 403, description = "Caller is not a project mentor")
    )
)]
pub async fn students_with_logs(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<StudentListResponse>> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can view their students"));
    }

    let team_ids = aggregate::mentored_team_ids(&state.pool, &principal.staff_id).await?;
    if team_ids.is_empty() {
        return Ok(Json(StudentListResponse { students: Vec::new() }));
    }

    let students = sqlx::query_as::<_, Student>(
        "SELECT student_id, name, register_number, department, section, team_id, created_at \
         FROM students WHERE student_id IN \
         (SELECT DISTINCT student_id FROM logs WHERE team_id IN \
          (SELECT team_id FROM teams WHERE mentor = ?)) ORDER BY name",
    )
    .bind(&principal.staff_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(StudentListResponse { students }))
}

async fn team_context(pool: &SqlitePool, team_id: Uuid) -> (Option<String>, Option<String>) {
    let result = sqlx::query_as::<_, (String, String)>(
        "SELECT topic, code FROM teams WHERE team_id = ?",
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some((topic, code))) => (Some(topic), Some(code)),
        Ok(None) => (None, None),
        Err(err) => {
            tracing::warn!(%team_id, error = %err, "team context lookup failed");
            (None, None)
        }
    }
}
