mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{seed_project, seed_staff, seed_team, send_json, setup};

#[tokio::test]
async fn only_hods_approve_teams_in_their_department() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST100", "Head CSE", "hod@college.edu", "HOD", Some("CSE"), None).await?;
    seed_staff(
        &pool,
        "ST101",
        "Advisor B",
        "advisor@college.edu",
        "CLASS_ADVISOR",
        Some("CSE"),
        Some("B"),
    )
    .await?;

    let cse_team = Uuid::new_v4();
    let ece_team = Uuid::new_v4();
    seed_team(&pool, cse_team, "topic", "C1", "CSE", "B", None, None, None).await?;
    seed_team(&pool, ece_team, "topic", "E1", "ECE", "A", None, None, None).await?;

    // Advisors may not decide approvals at all.
    let advisor = common::login(&app, "advisor@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/teams/update-approval",
        &advisor,
        json!({"team_id": cse_team, "is_approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only HODs can approve or reject teams");

    let hod = common::login(&app, "hod@college.edu").await?;

    // Out-of-department team is rejected.
    let (status, _body) = send_json(
        &app,
        "PATCH",
        "/teams/update-approval",
        &hod,
        json!({"team_id": ece_team, "is_approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // In-department approval succeeds and is idempotent.
    for _ in 0..2 {
        let (status, body) = send_json(
            &app,
            "PATCH",
            "/teams/update-approval",
            &hod,
            json!({"team_id": cse_team, "is_approved": true}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["team"]["is_approved"], true);
    }

    Ok(())
}

#[tokio::test]
async fn hod_approval_requires_mentor_approval_first() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST100", "Head CSE", "hod@college.edu", "HOD", Some("CSE"), None).await?;
    seed_staff(
        &pool,
        "ST104",
        "Mentor Two",
        "mentor2@college.edu",
        "PROJECT_MENTOR",
        None,
        None,
    )
    .await?;

    let team_id = Uuid::new_v4();
    seed_team(&pool, team_id, "topic", "T1", "CSE", "B", None, Some("ST104"), Some(true)).await?;
    let project_id = Uuid::new_v4();
    seed_project(&pool, project_id, "Yield Forecasting", team_id, None, None).await?;

    let hod = common::login(&app, "hod@college.edu").await?;

    // Gate closed while mentor approval is absent.
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-hod",
        &hod,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Project must have mentor approval before HOD approval"
    );

    // Mentor approves first.
    let mentor = common::login(&app, "mentor2@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-mentors",
        &mentor,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["is_approved"], true);

    // Gate now open for the HOD.
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-hod",
        &hod,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["is_hod_approved"], true);

    Ok(())
}

#[tokio::test]
async fn hod_gate_fails_even_after_explicit_mentor_rejection() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST100", "Head CSE", "hod@college.edu", "HOD", Some("CSE"), None).await?;

    let team_id = Uuid::new_v4();
    seed_team(&pool, team_id, "topic", "T1", "CSE", "B", None, None, Some(true)).await?;
    let project_id = Uuid::new_v4();
    seed_project(&pool, project_id, "Rejected Project", team_id, Some(false), None).await?;

    let hod = common::login(&app, "hod@college.edu").await?;
    let (status, _body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-hod",
        &hod,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn mentor_approval_is_limited_to_the_teams_mentor() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(
        &pool,
        "ST104",
        "Mentor Two",
        "mentor2@college.edu",
        "PROJECT_MENTOR",
        None,
        None,
    )
    .await?;
    seed_staff(
        &pool,
        "ST105",
        "Mentor Three",
        "mentor3@college.edu",
        "PROJECT_MENTOR",
        None,
        None,
    )
    .await?;

    let team_id = Uuid::new_v4();
    seed_team(&pool, team_id, "topic", "T1", "CSE", "B", None, Some("ST104"), Some(true)).await?;
    let project_id = Uuid::new_v4();
    seed_project(&pool, project_id, "Some Project", team_id, None, None).await?;

    // A different mentor is rejected even though they hold the role.
    let other = common::login(&app, "mentor3@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-mentors",
        &other,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not the mentor of this project's team");

    Ok(())
}

#[tokio::test]
async fn hod_approval_is_scoped_to_their_department() -> Result<()> {
    let (_dir, pool, app) = setup().await?;
    seed_staff(&pool, "ST106", "Head ECE", "hod.ece@college.edu", "HOD", Some("ECE"), None).await?;

    let team_id = Uuid::new_v4();
    seed_team(&pool, team_id, "topic", "T1", "CSE", "B", None, None, Some(true)).await?;
    let project_id = Uuid::new_v4();
    seed_project(&pool, project_id, "CSE Project", team_id, Some(true), None).await?;

    let hod_ece = common::login(&app, "hod.ece@college.edu").await?;
    let (status, body) = send_json(
        &app,
        "PATCH",
        "/projects/approve-hod",
        &hod_ece,
        json!({"project_id": project_id, "approved": true}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only approve projects in your department");

    Ok(())
}
