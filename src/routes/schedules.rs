use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::{self, Principal, Resource, Role};
use crate::errors::AppResult;
use crate::models::schedule::{
    Schedule, ScheduleCreateRequest, ScheduleCreateResponse, ScheduleListResponse,
};
use crate::utils::utc_now;
use crate::workflow;

#[utoipa::path(
    get,
    path = "/schedules",
    tag = "Schedules",
    responses((status = 200, description = "Schedules visible to the caller", body = ScheduleListResponse))
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ScheduleListResponse>> {
    let scope = authz::read_scope(&principal, Resource::Schedules);
    let schedules = aggregate::schedules_in_scope(&state.pool, &scope).await?;

    Ok(Json(ScheduleListResponse { schedules }))
}

#[utoipa::path(
    post,
    path = "/schedules/create",
    tag = "Schedules",
    request_body = ScheduleCreateRequest,
    responses(
        (status = 201, description = "Schedule created, reviews fanned out", body = ScheduleCreateResponse),
        (status = 403, description = "Caller may not schedule for this department")
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ScheduleCreateRequest>,
) -> AppResult<(StatusCode, Json<ScheduleCreateResponse>)> {
    workflow::validate_stage(&payload.stage)?;
    workflow::validate_schedule_window(payload.start, payload.end)?;
    authz::ensure_can_create_schedule(&principal, &payload.department)?;

    let schedule_id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO project_review (id, stage, department, start_date, end_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(schedule_id)
    .bind(&payload.stage)
    .bind(&payload.department)
    .bind(payload.start)
    .bind(payload.end)
    .bind(now)
    .execute(&state.pool)
    .await?;

    // Eligible teams: approved, in the target department; advisors without
    // the HOD role only reach their own section.
    let advisor_section = if !principal.has_role(Role::Hod) {
        principal.section.clone()
    } else {
        None
    };

    let teams: Vec<(Uuid, String)> = match &advisor_section {
        Some(section) => {
            sqlx::query_as(
                "SELECT team_id, section FROM teams \
                 WHERE department = ? AND section = ? AND is_approved = 1",
            )
            .bind(&payload.department)
            .bind(section)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT team_id, section FROM teams WHERE department = ? AND is_approved = 1",
            )
            .bind(&payload.department)
            .fetch_all(&state.pool)
            .await?
        }
    };

    let mut reviews_created = 0usize;
    for (team_id, section) in &teams {
        sqlx::query(
            "INSERT INTO reviews (id, team_id, stage, department, section, is_completed, completed_on, result, marks, created_at) \
             VALUES (?, ?, ?, ?, ?, 0, NULL, NULL, NULL, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(team_id)
        .bind(&payload.stage)
        .bind(&payload.department)
        .bind(section)
        .bind(now)
        .execute(&state.pool)
        .await?;
        reviews_created += 1;
    }

    let schedule = Schedule {
        id: schedule_id,
        stage: payload.stage,
        department: payload.department,
        start_date: payload.start,
        end_date: payload.end,
        created_at: now,
    };

    let message = if teams.is_empty() {
        "Schedule created successfully, but no approved teams found in this department".to_string()
    } else {
        "Schedule and review entries created successfully".to_string()
    };

    tracing::info!(
        schedule_id = %schedule_id,
        teams_scheduled = teams.len(),
        "schedule created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ScheduleCreateResponse {
            message,
            schedule,
            teams_scheduled: teams.len(),
            reviews_created,
        }),
    ))
}
