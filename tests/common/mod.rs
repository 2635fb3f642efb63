#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

use mentor_portal::create_app;
use mentor_portal::utils::hash_password;

pub const PASSWORD: &str = "password123";

/// Fresh temp-dir database, migrated, with the full router on top. Keep the
/// TempDir alive for the duration of the test.
pub async fn setup() -> Result<(TempDir, SqlitePool, Router)> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");

    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    let app = create_app(pool.clone()).await?;
    Ok((dir, pool, app))
}

pub async fn seed_staff(
    pool: &SqlitePool,
    staff_id: &str,
    name: &str,
    email: &str,
    role: &str,
    department: Option<&str>,
    section: Option<&str>,
) -> Result<()> {
    let password_hash = hash_password(PASSWORD).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO staffs (id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(staff_id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(department)
    .bind(section)
    .bind(if role.contains("PROJECT_MENTOR") { Some("General") } else { None })
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_student(
    pool: &SqlitePool,
    student_id: &str,
    name: &str,
    register_number: &str,
    department: &str,
    section: &str,
    team_id: Option<Uuid>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO students (student_id, name, register_number, department, section, team_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(student_id)
    .bind(name)
    .bind(register_number)
    .bind(department)
    .bind(section)
    .bind(team_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_team(
    pool: &SqlitePool,
    team_id: Uuid,
    topic: &str,
    code: &str,
    department: &str,
    section: &str,
    team_lead: Option<&str>,
    mentor: Option<&str>,
    is_approved: Option<bool>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO teams (team_id, topic, code, department, section, team_lead, mentor, is_approved, current_status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?)",
    )
    .bind(team_id)
    .bind(topic)
    .bind(code)
    .bind(department)
    .bind(section)
    .bind(team_lead)
    .bind(mentor)
    .bind(is_approved)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_project(
    pool: &SqlitePool,
    project_id: Uuid,
    title: &str,
    team_id: Uuid,
    is_approved: Option<bool>,
    is_hod_approved: Option<bool>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO projects (project_id, title, team_id, theme, is_approved, is_hod_approved, created_at) \
         VALUES (?, ?, ?, '[]', ?, ?, ?)",
    )
    .bind(project_id)
    .bind(title)
    .bind(team_id)
    .bind(is_approved)
    .bind(is_hod_approved)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_review(
    pool: &SqlitePool,
    review_id: Uuid,
    team_id: Uuid,
    stage: &str,
    department: &str,
    section: Option<&str>,
    marks: Option<i64>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO reviews (id, team_id, stage, department, section, is_completed, completed_on, result, marks, created_at) \
         VALUES (?, ?, ?, ?, ?, 0, NULL, NULL, ?, ?)",
    )
    .bind(review_id)
    .bind(team_id)
    .bind(stage)
    .bind(department)
    .bind(section)
    .bind(marks)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_log(
    pool: &SqlitePool,
    log_id: Uuid,
    student_id: &str,
    team_id: Uuid,
    date: NaiveDate,
    completed_task: &str,
    mentor_approved: Option<bool>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO logs (id, student_id, team_id, date, expected_task, completed_task, comments, mentor_approved, created_at) \
         VALUES (?, ?, ?, ?, 'planned work', ?, NULL, ?, ?)",
    )
    .bind(log_id)
    .bind(student_id)
    .bind(team_id)
    .bind(date)
    .bind(completed_task)
    .bind(mentor_approved)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Log in through the API and return the `session=...` cookie pair to send
/// on subsequent requests.
pub async fn login(app: &Router, email: &str) -> Result<String> {
    let body = json!({ "email": email, "password": PASSWORD });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;

    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK, "login should succeed");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .context("login response missing session cookie")?
        .to_str()?;

    let pair = set_cookie
        .split(';')
        .next()
        .context("malformed set-cookie header")?;
    Ok(pair.to_string())
}

pub async fn get_json(app: &Router, uri: &str, cookie: &str) -> Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())?;

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: Value,
) -> Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))?;

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}
