use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::{Principal, RoleSet};
use crate::errors::AppError;
use crate::models::staff::Staff;

pub const SESSION_COOKIE: &str = "session";

/// Serialized session payload carried in the http-only `session` cookie.
/// The cookie is a plain JSON struct trusted as-is; lifetime is bounded by
/// browser-session cookie semantics (no max-age is set), the `expires` field
/// is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user_id: Uuid,
    pub staff_id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    pub expires: DateTime<Utc>,
}

impl SessionData {
    pub fn for_staff(staff: &Staff) -> Self {
        Self {
            user_id: staff.id,
            staff_id: staff.staff_id.clone(),
            email: staff.email.clone(),
            role: staff.role.clone(),
            department: staff.department.clone(),
            section: staff.section.clone(),
            expires: Utc::now() + Duration::hours(24),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            staff_id: self.staff_id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            roles: RoleSet::parse(&self.role),
            department: self.department.clone(),
            section: self.section.clone(),
        }
    }
}

/// Add the session cookie to the jar after a successful login.
pub fn issue(jar: CookieJar, data: &SessionData) -> Result<CookieJar, AppError> {
    let payload = serde_json::to_string(data)
        .map_err(|err| AppError::internal(format!("failed to serialize session: {err}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, payload))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build();

    Ok(jar.add(cookie))
}

pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| AppError::unauthenticated("Unauthorized"))?;

        let data: SessionData = serde_json::from_str(cookie.value())
            .map_err(|_| AppError::unauthenticated("Invalid session"))?;

        Ok(data.principal())
    }
}
