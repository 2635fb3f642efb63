use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::review::Review;
use crate::models::staff::Staff;
use crate::models::student::Student;
use crate::models::team::Team;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    pub project_id: Uuid,
    pub title: String,
    pub team_id: Uuid,
    /// Theme tags, stored as a JSON array column.
    #[schema(value_type = Vec<String>)]
    pub theme: Json<Vec<String>>,
    /// Mentor-level approval; precondition for the HOD gate.
    pub is_approved: Option<bool>,
    pub is_hod_approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// List row: project plus the team context the dashboards key on.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub team_department: Option<String>,
    pub team_section: Option<String>,
    pub team_lead_name: Option<String>,
    pub mentor_name: Option<String>,
    pub mentor_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetailResponse {
    pub project: Project,
    pub team: Option<Team>,
    #[serde(rename = "teamLead")]
    pub team_lead: Option<Student>,
    pub mentor: Option<Staff>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectApprovalRequest {
    pub project_id: Uuid,
    pub approved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectMutationResponse {
    pub message: String,
    pub project: Project,
}
