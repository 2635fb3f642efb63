use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::staff::{DbStaff, LoginRequest, LoginResponse, Staff};
use crate::session::{self, SessionData};
use crate::utils::verify_password;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "staffId")]
    pub staff_id: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub session: SessionInfo,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let staff = sqlx::query_as::<_, DbStaff>(
        "SELECT id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at \
         FROM staffs WHERE email = ?",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::unauthenticated("Invalid credentials"))?;

    if !verify_password(&payload.password, &staff.password_hash)? {
        return Err(AppError::unauthenticated("Invalid credentials"));
    }

    let user: Staff = staff.into();
    let session_data = SessionData::for_staff(&user);
    let jar = session::issue(jar, &session_data)?;

    tracing::info!(staff_id = %user.staff_id, "staff logged in");

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        session::clear(jar),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No active session")
    )
)]
pub async fn current_session(principal: Principal) -> AppResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse {
        message: "Session retrieved successfully".to_string(),
        session: SessionInfo {
            user_id: principal.user_id,
            staff_id: principal.staff_id,
            email: principal.email,
            role: principal.role,
            department: principal.department,
            section: principal.section,
        },
    }))
}
