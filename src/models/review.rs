use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Named checkpoints in the evaluation calendar. Schedules (and the reviews
/// they fan out) must use one of these.
pub const STAGES: [&str; 4] = ["Review 1", "Review 2", "Review 3", "Final Review"];

/// Evaluation labels offered to reviewers.
pub const RESULTS: [&str; 5] = [
    "Excellent",
    "Good",
    "Satisfactory",
    "Needs Improvement",
    "Unsatisfactory",
];

pub const MAX_MARKS: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub team_id: Uuid,
    pub stage: String,
    pub department: String,
    pub section: Option<String>,
    pub is_completed: bool,
    /// Stamped on first completion, preserved on later edits.
    pub completed_on: Option<DateTime<Utc>>,
    pub result: Option<String>,
    pub marks: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReviewAttachment {
    pub id: Uuid,
    pub review_id: Uuid,
    pub name: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReviewTemplate {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub stage: String,
    pub created_at: DateTime<Utc>,
}

/// Dashboard list row: review plus team context and its attachments.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub id: Uuid,
    pub team_id: Uuid,
    pub stage: String,
    pub department: String,
    pub is_completed: bool,
    pub completed_on: Option<DateTime<Utc>>,
    pub result: Option<String>,
    pub marks: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub team_topic: Option<String>,
    pub team_code: Option<String>,
    pub team_section: Option<String>,
    pub team_lead_id: Option<String>,
    pub team_lead_name: Option<String>,
    pub attachments: Vec<ReviewAttachment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewUpdateRequest {
    pub review_id: Uuid,
    #[schema(example = "Good")]
    pub result: Option<String>,
    #[schema(example = 85)]
    pub marks: Option<i64>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewMutationResponse {
    pub message: String,
    pub review: Review,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TemplateCreateRequest {
    #[schema(example = "Review 1 rubric")]
    pub name: String,
    #[schema(example = "https://files.example.edu/rubric.pdf")]
    pub link: String,
    #[schema(example = "Review 1")]
    pub stage: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateCreateResponse {
    pub message: String,
    pub template: ReviewTemplate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<ReviewTemplate>,
}
