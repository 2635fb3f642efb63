use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Students are owned by the enrollment system; this service only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub register_number: String,
    pub department: String,
    pub section: String,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
