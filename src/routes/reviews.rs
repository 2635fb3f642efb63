use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::aggregate;
use crate::app::AppState;
use crate::authz::{self, Principal, Resource};
use crate::errors::{AppError, AppResult};
use crate::models::review::{
    ReviewListResponse, ReviewMutationResponse, ReviewTemplate, ReviewUpdateRequest,
    TemplateCreateRequest, TemplateCreateResponse, TemplateListResponse, RESULTS,
};
use crate::utils::utc_now;
use crate::workflow;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemplateQuery {
    pub stage: Option<String>,
}

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    responses((status = 200, description = "Reviews visible to the caller", body = ReviewListResponse))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ReviewListResponse>> {
    let scope = authz::read_scope(&principal, Resource::Reviews);
    let reviews = aggregate::reviews_in_scope(&state.pool, &scope).await?;
    let reviews = aggregate::review_summaries(&state.pool, reviews).await;

    Ok(Json(ReviewListResponse { reviews }))
}

#[utoipa::path(
    patch,
    path = "/reviews/update",
    tag = "Reviews",
    request_body = ReviewUpdateRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewMutationResponse),
        (status = 403, description = "Caller may not evaluate this review")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ReviewUpdateRequest>,
) -> AppResult<Json<ReviewMutationResponse>> {
    let review = aggregate::fetch_review(&state.pool, payload.review_id).await?;
    let team = aggregate::fetch_team(&state.pool, review.team_id).await?;
    authz::ensure_review_evaluator(&principal, team.mentor.as_deref())?;

    if let Some(result) = &payload.result {
        if !RESULTS.contains(&result.as_str()) {
            return Err(AppError::validation(format!(
                "Unknown evaluation result: {result}"
            )));
        }
    }
    if let Some(marks) = payload.marks {
        workflow::validate_marks(marks)?;
    }

    let result = payload.result.or(review.result);
    let marks = payload.marks.or(review.marks);
    let is_completed = payload.is_completed.unwrap_or(review.is_completed);
    // The completion stamp survives re-evaluation.
    let completed_on = workflow::completion_stamp(review.completed_on, is_completed, utc_now());

    sqlx::query(
        "UPDATE reviews SET result = ?, marks = ?, is_completed = ?, completed_on = ? WHERE id = ?",
    )
    .bind(&result)
    .bind(marks)
    .bind(is_completed)
    .bind(completed_on)
    .bind(payload.review_id)
    .execute(&state.pool)
    .await?;

    let review = aggregate::fetch_review(&state.pool, payload.review_id).await?;

    tracing::info!(review_id = %payload.review_id, is_completed, "review updated");

    Ok(Json(ReviewMutationResponse {
        message: "Review updated successfully".to_string(),
        review,
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/templates",
    tag = "Reviews",
    params(TemplateQuery),
    responses((status = 200, description = "Review templates", body = TemplateListResponse))
)]
pub async fn list_templates(
    State(state): State<AppState>,
    _principal: Principal,
    Query(query): Query<TemplateQuery>,
) -> AppResult<Json<TemplateListResponse>> {
    let templates = match &query.stage {
        Some(stage) => {
            sqlx::query_as::<_, ReviewTemplate>(
                "SELECT id, name, link, stage, created_at FROM review_templates \
                 WHERE stage = ? ORDER BY created_at DESC",
            )
            .bind(stage)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ReviewTemplate>(
                "SELECT id, name, link, stage, created_at FROM review_templates \
                 ORDER BY created_at DESC",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(TemplateListResponse { templates }))
}

#[utoipa::path(
    post,
    path = "/reviews/templates",
    tag = "Reviews",
    request_body = TemplateCreateRequest,
    responses(
        (status = 201, description = "Template saved", body = TemplateCreateResponse),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn create_template(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<TemplateCreateRequest>,
) -> AppResult<(StatusCode, Json<TemplateCreateResponse>)> {
    authz::ensure_can_upload_template(&principal)?;

    if payload.name.is_empty() || payload.link.is_empty() {
        return Err(AppError::validation("Missing required fields"));
    }
    workflow::validate_stage(&payload.stage)?;

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO review_templates (id, name, link, stage, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.link)
    .bind(&payload.stage)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let template = ReviewTemplate {
        id,
        name: payload.name,
        link: payload.link,
        stage: payload.stage,
        created_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(TemplateCreateResponse {
            message: "Template saved successfully".to_string(),
            template,
        }),
    ))
}
