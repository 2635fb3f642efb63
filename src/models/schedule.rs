use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A review window for one department. Stored in `project_review`; creating
/// one fans out a review row per approved team in scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: Uuid,
    pub stage: String,
    pub department: String,
    #[serde(rename = "start")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleListResponse {
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleCreateRequest {
    #[schema(example = "Review 1")]
    pub stage: String,
    #[schema(example = "CSE")]
    pub department: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCreateResponse {
    pub message: String,
    pub schedule: Schedule,
    pub teams_scheduled: usize,
    pub reviews_created: usize,
}
