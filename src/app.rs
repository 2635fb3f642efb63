use axum::http::Method;
use axum::routing::{get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::routes::{auth, diary, health, logs, projects, reviews, schedules, staff, teams};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let state = AppState::new(pool);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current_session));

    let team_routes = Router::new()
        .route("/", get(teams::list_teams))
        .route("/details", get(teams::team_details))
        .route("/update-approval", patch(teams::update_approval))
        .route("/assign-mentor", patch(teams::assign_mentor));

    let project_routes = Router::new()
        .route("/", get(projects::list_projects))
        .route("/details", get(projects::project_details))
        .route("/approve-mentors", patch(projects::approve_mentors))
        .route("/approve-hod", patch(projects::approve_hod));

    let review_routes = Router::new()
        .route("/", get(reviews::list_reviews))
        .route("/update", patch(reviews::update_review))
        .route(
            "/templates",
            get(reviews::list_templates).post(reviews::create_template),
        );

    let schedule_routes = Router::new()
        .route("/", get(schedules::list_schedules))
        .route("/create", post(schedules::create_schedule));

    let log_routes = Router::new()
        .route("/approve", patch(logs::approve_log))
        .route("/pending", get(logs::pending_logs))
        .route("/student", get(logs::student_logs))
        .route("/students", get(logs::students_with_logs));

    let staff_routes = Router::new()
        .route("/create", post(staff::create_staff))
        .route("/available", get(staff::available_staff));

    let diary_routes = Router::new().route("/generate", post(diary::generate_diary));

    let router = Router::new()
        .route("/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/teams", team_routes)
        .nest("/projects", project_routes)
        .nest("/reviews", review_routes)
        .nest("/schedules", schedule_routes)
        .nest("/logs", log_routes)
        .nest("/staff", staff_routes)
        .nest("/diary", diary_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
