use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::student::Student;

/// Daily activity log written by a student. Only the owning team's mentor
/// may decide `mentor_approved`, and only once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Log {
    pub id: Uuid,
    pub student_id: String,
    pub team_id: Uuid,
    pub date: NaiveDate,
    pub expected_task: String,
    pub completed_task: String,
    pub comments: Option<String>,
    pub mentor_approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Pending-approval list row, flattened with student and team context.
#[derive(Debug, Serialize, ToSchema)]
pub struct PendingLog {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub expected_task: String,
    pub completed_task: String,
    pub comments: Option<String>,
    pub student_id: String,
    pub student_name: String,
    pub team_id: Uuid,
    pub team_topic: Option<String>,
    pub team_code: Option<String>,
}

/// Per-student history row for the mentor's log view.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentLog {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub expected_task: String,
    pub completed_task: String,
    pub comments: Option<String>,
    pub mentor_approved: Option<bool>,
    pub team_id: Uuid,
    pub team_topic: Option<String>,
    pub team_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingLogsResponse {
    pub logs: Vec<PendingLog>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentLogsResponse {
    pub student: Student,
    pub logs: Vec<StudentLog>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogApproveRequest {
    pub log_id: Uuid,
    pub approved: bool,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogMutationResponse {
    pub message: String,
    pub log: Log,
}
