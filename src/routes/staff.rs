use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Principal, Role, RoleSet};
use crate::errors::{AppError, AppResult};
use crate::models::staff::{
    AvailableStaff, DbStaff, Staff, StaffCreateRequest, StaffCreateResponse,
};
use crate::utils::{hash_password, utc_now};

/// A mentor is considered available while they supervise fewer teams than
/// this.
const MAX_TEAMS_PER_MENTOR: i64 = 2;

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableStaffResponse {
    pub staff: Vec<AvailableStaff>,
}

#[utoipa::path(
    post,
    path = "/staff/create",
    tag = "Staff",
    request_body = StaffCreateRequest,
    responses(
        (status = 201, description = "Staff account created", body = StaffCreateResponse),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_staff(
    State(state): State<AppState>,
    // Any authenticated session may create staff accounts; no role gate is
    // enforced here.
    _principal: Principal,
    Json(payload): Json<StaffCreateRequest>,
) -> AppResult<(StatusCode, Json<StaffCreateResponse>)> {
    if payload.name.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Missing required fields"));
    }

    let roles = parse_role(&payload.role)?;

    if (roles.contains(Role::Hod) || roles.contains(Role::ClassAdvisor))
        && payload.department.is_none()
    {
        return Err(AppError::validation(
            "Department is required for HOD and CLASS_ADVISOR roles",
        ));
    }
    if roles.contains(Role::ClassAdvisor) && payload.section.is_none() {
        return Err(AppError::validation("Section is required for CLASS_ADVISOR role"));
    }
    if roles.contains(Role::ProjectMentor) && payload.domain.is_none() {
        return Err(AppError::validation("Domain is required for PROJECT_MENTOR role"));
    }

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM staffs WHERE email = ?")
        .bind(&payload.email)
        .fetch_one(&state.pool)
        .await?;
    if existing > 0 {
        return Err(AppError::conflict("Email already in use"));
    }

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4();
    let staff_id = new_staff_code(id);
    let now = utc_now();

    sqlx::query(
        "INSERT INTO staffs (id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&staff_id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(password_hash)
    .bind(&payload.role)
    .bind(&payload.department)
    .bind(&payload.section)
    .bind(&payload.domain)
    .bind(payload.ie_allocated)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let staff = Staff {
        id,
        staff_id,
        name: payload.name,
        email: payload.email,
        role: payload.role,
        department: payload.department,
        section: payload.section,
        domain: payload.domain,
        ie_allocated: payload.ie_allocated,
    };

    tracing::info!(staff_id = %staff.staff_id, role = %staff.role, "staff account created");

    Ok((
        StatusCode::CREATED,
        Json(StaffCreateResponse {
            message: "Staff account created successfully".to_string(),
            staff,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/staff/available",
    tag = "Staff",
    responses((status = 200, description = "Mentors with capacity", body = AvailableStaffResponse))
)]
pub async fn available_staff(
    State(state): State<AppState>,
    _principal: Principal,
) -> AppResult<Json<AvailableStaffResponse>> {
    let counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT mentor, COUNT(1) FROM teams WHERE mentor IS NOT NULL GROUP BY mentor",
    )
    .fetch_all(&state.pool)
    .await?;
    let counts: HashMap<String, i64> = counts.into_iter().collect();

    let all_staff = sqlx::query_as::<_, DbStaff>(
        "SELECT id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at \
         FROM staffs ORDER BY name",
    )
    .fetch_all(&state.pool)
    .await?;

    let staff = all_staff
        .into_iter()
        .map(|row| {
            let team_count = counts.get(&row.staff_id).copied().unwrap_or(0);
            AvailableStaff {
                staff: row.into(),
                team_count,
            }
        })
        .filter(|entry| entry.team_count < MAX_TEAMS_PER_MENTOR)
        .collect();

    Ok(Json(AvailableStaffResponse { staff }))
}

/// Every role token must be recognized; an empty or unknown role string is
/// rejected before the account exists.
fn parse_role(raw: &str) -> AppResult<RoleSet> {
    let known = raw
        .split('+')
        .all(|token| matches!(token.trim(), "HOD" | "CLASS_ADVISOR" | "PROJECT_MENTOR"));
    if raw.is_empty() || !known {
        return Err(AppError::validation("Invalid role"));
    }
    Ok(RoleSet::parse(raw))
}

fn new_staff_code(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("ST{}", simple[..8].to_uppercase())
}
