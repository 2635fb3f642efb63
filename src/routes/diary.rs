use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::Principal;
use crate::diary::{build_document, DiaryData, DiaryDocument};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiaryGenerateRequest {
    #[serde(rename = "teamId")]
    pub team_id: Option<Uuid>,
}

/// Aggregated diary payload plus the assembled document. The client renders
/// the document tables into a PDF.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryResponse {
    #[serde(flatten)]
    pub data: DiaryData,
    pub document: DiaryDocument,
}

#[utoipa::path(
    post,
    path = "/diary/generate",
    tag = "Diary",
    request_body = DiaryGenerateRequest,
    responses(
        (status = 200, description = "Diary payload and document", body = DiaryResponse),
        (status = 404, description = "Team not found")
    )
)]
pub async fn generate_diary(
    State(state): State<AppState>,
    _principal: Principal,
    Json(payload): Json<DiaryGenerateRequest>,
) -> AppResult<Json<DiaryResponse>> {
    let team_id = payload
        .team_id
        .ok_or_else(|| AppError::validation("Team ID is required"))?;

    let data = aggregate::diary_data(&state.pool, team_id).await?;
    let document = build_document(&data);

    Ok(Json(DiaryResponse { data, document }))
}
