mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use common::{
    seed_log, seed_project, seed_review, seed_staff, seed_student, seed_team, send_json, setup,
};

#[tokio::test]
async fn diary_for_a_populated_team_assembles_all_sections() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST104", "Mentor Two", "mentor2@college.edu", "PROJECT_MENTOR", None, None)
        .await?;

    let team_id = Uuid::new_v4();
    seed_team(
        &pool,
        team_id,
        "Crop Yield Prediction",
        "T-07",
        "CSE",
        "B",
        Some("21CS101"),
        Some("ST104"),
        Some(true),
    )
    .await?;
    seed_student(&pool, "21CS101", "Asha", "7101", "CSE", "B", Some(team_id)).await?;
    seed_student(&pool, "21CS102", "Vikram", "7102", "CSE", "B", Some(team_id)).await?;
    seed_project(&pool, Uuid::new_v4(), "Yield Forecasting Platform", team_id, Some(true), None)
        .await?;

    let day1 = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2025, 2, 4).unwrap();
    seed_log(&pool, Uuid::new_v4(), "21CS101", team_id, day1, "collected dataset", Some(true))
        .await?;
    seed_log(&pool, Uuid::new_v4(), "21CS102", team_id, day2, "cleaned dataset", None).await?;

    seed_review(&pool, Uuid::new_v4(), team_id, "Review 1", "CSE", Some("B"), Some(80)).await?;
    seed_review(&pool, Uuid::new_v4(), team_id, "Review 2", "CSE", Some("B"), Some(90)).await?;

    let mentor = common::login(&app, "mentor2@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "POST",
        "/diary/generate",
        &mentor,
        json!({"teamId": team_id}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Aggregated payload.
    assert_eq!(body["team"]["topic"], "Crop Yield Prediction");
    assert_eq!(body["students"].as_array().unwrap().len(), 2);
    assert_eq!(body["mentor"]["name"], "Mentor Two");
    assert_eq!(body["project"]["title"], "Yield Forecasting Platform");
    // Narrative order: logs ascending by date.
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs[0]["completed_task"], "collected dataset");
    assert_eq!(logs[1]["completed_task"], "cleaned dataset");

    // Document structure.
    let document = &body["document"];
    assert_eq!(document["project_title"], "Yield Forecasting Platform");
    let sections = document["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 7);
    assert_eq!(sections[0]["title"], "I. Team Members");
    assert_eq!(sections[6]["title"], "VII. Review & Internal Mark");

    // Attendance matrix: Asha present on day 1 only.
    let attendance = &sections[2];
    assert_eq!(attendance["rows"][0][1], "P");
    assert_eq!(attendance["rows"][0][2], "");
    assert_eq!(attendance["rows"][1][2], "P");

    // Marks summary: mean of 80 and 90.
    let marks = &sections[6];
    assert_eq!(marks["rows"][0][5], "85");

    Ok(())
}

#[tokio::test]
async fn diary_for_an_empty_team_still_has_every_section() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST100", "Head CSE", "hod@college.edu", "HOD", Some("CSE"), None).await?;

    let team_id = Uuid::new_v4();
    seed_team(&pool, team_id, "Fresh Team", "T-99", "CSE", "A", None, None, None).await?;

    let hod = common::login(&app, "hod@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "POST",
        "/diary/generate",
        &hod,
        json!({"teamId": team_id}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    assert!(body["project"].is_null());
    assert!(body["mentor"].is_null());
    assert!(body["logs"].as_array().unwrap().is_empty());

    let sections = body["document"]["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 7);
    // Blank placeholder rows keep the tables printable.
    assert!(sections[1]["rows"].as_array().unwrap().len() >= 8);
    assert!(sections[4]["rows"].as_array().unwrap().len() >= 9);
    assert!(sections[5]["rows"].as_array().unwrap().len() >= 9);

    // The document falls back to the team topic for its title.
    assert_eq!(body["document"]["project_title"], "Fresh Team");

    Ok(())
}

#[tokio::test]
async fn diary_requires_a_team_id_and_an_existing_team() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST100", "Head CSE", "hod@college.edu", "HOD", Some("CSE"), None).await?;

    let hod = common::login(&app, "hod@college.edu").await?;

    let (status, body) = send_json(&app, "POST", "/diary/generate", &hod, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Team ID is required");

    let (status, _body) = send_json(
        &app,
        "POST",
        "/diary/generate",
        &hod,
        json!({"teamId": Uuid::new_v4()}),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
