use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Full staff row as stored. Only ever converted into [`Staff`] before
/// leaving the service; the password hash must not be serialized.
#[derive(Debug, Clone, FromRow)]
pub struct DbStaff {
    pub id: Uuid,
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department: Option<String>,
    pub section: Option<String>,
    pub domain: Option<String>,
    pub ie_allocated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public staff projection: id, name, email, role, staff_id, department,
/// section plus the mentor-specific fields. No credential material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Staff {
    pub id: Uuid,
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub section: Option<String>,
    pub domain: Option<String>,
    pub ie_allocated: bool,
}

impl From<DbStaff> for Staff {
    fn from(value: DbStaff) -> Self {
        Staff {
            id: value.id,
            staff_id: value.staff_id,
            name: value.name,
            email: value.email,
            role: value.role,
            department: value.department,
            section: value.section,
            domain: value.domain,
            ie_allocated: value.ie_allocated,
        }
    }
}

/// Staff row annotated with how many teams the member currently mentors.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableStaff {
    #[serde(flatten)]
    pub staff: Staff,
    pub team_count: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffCreateRequest {
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[schema(example = "grace@college.edu")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
    #[schema(example = "CLASS_ADVISOR+PROJECT_MENTOR")]
    pub role: String,
    #[schema(example = "CSE")]
    pub department: Option<String>,
    #[schema(example = "B")]
    pub section: Option<String>,
    #[schema(example = "Machine Learning")]
    pub domain: Option<String>,
    #[serde(default)]
    pub ie_allocated: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "grace@college.edu")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: Staff,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffCreateResponse {
    pub message: String,
    pub staff: Staff,
}
