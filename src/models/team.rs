use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::review::Review;
use crate::models::schedule::Schedule;
use crate::models::staff::Staff;
use crate::models::student::Student;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub topic: String,
    pub code: String,
    pub department: String,
    pub section: String,
    pub team_lead: Option<String>,
    pub mentor: Option<String>,
    /// null = pending, true = approved, false = rejected.
    pub is_approved: Option<bool>,
    pub current_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List row: team plus resolved display names. A dangling mentor or team
/// lead reference leaves the name null.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,
    pub mentor_name: Option<String>,
    pub team_lead_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamListResponse {
    pub teams: Vec<TeamSummary>,
}

/// Aggregate for the team-details view. Secondary lookups degrade to null;
/// only the team itself is required.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamDetailResponse {
    pub team: Team,
    #[serde(rename = "teamLead")]
    pub team_lead: Option<Student>,
    pub mentor: Option<Staff>,
    pub reviews: Vec<Review>,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateApprovalRequest {
    pub team_id: Uuid,
    pub is_approved: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignMentorRequest {
    pub team_id: Uuid,
    pub mentor_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMutationResponse {
    pub message: String,
    pub team: Team,
}
