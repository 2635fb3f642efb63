//! Composed views over the relational store.
//!
//! Every aggregate resolves foreign references with secondary lookups: a
//! missing referenced row becomes a null field, never an error. Only the
//! primary entity lookup is fatal to a request. List queries take the
//! [`Scope`] produced by the policy layer, so no endpoint re-states a filter
//! rule.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::Scope;
use crate::diary::DiaryData;
use crate::errors::{AppError, AppResult};
use crate::models::log::Log;
use crate::models::project::{Project, ProjectDetailResponse, ProjectSummary};
use crate::models::review::{Review, ReviewAttachment, ReviewSummary};
use crate::models::schedule::Schedule;
use crate::models::staff::{DbStaff, Staff};
use crate::models::student::Student;
use crate::models::team::{Team, TeamDetailResponse, TeamSummary};

const TEAM_COLUMNS: &str =
    "team_id, topic, code, department, section, team_lead, mentor, is_approved, current_status, created_at";
const PROJECT_COLUMNS: &str =
    "project_id, title, team_id, theme, is_approved, is_hod_approved, created_at";
const REVIEW_COLUMNS: &str =
    "id, team_id, stage, department, section, is_completed, completed_on, result, marks, created_at";
const STAFF_COLUMNS: &str =
    "id, staff_id, name, email, password_hash, role, department, section, domain, ie_allocated, created_at, updated_at";

pub async fn teams_in_scope(pool: &SqlitePool, scope: &Scope) -> AppResult<Vec<Team>> {
    let teams = match scope {
        Scope::Department(department) => {
            sqlx::query_as::<_, Team>(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams WHERE department = ? ORDER BY created_at DESC"
            ))
            .bind(department)
            .fetch_all(pool)
            .await?
        }
        Scope::DepartmentSection(department, section) => {
            sqlx::query_as::<_, Team>(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams WHERE department = ? AND section = ? ORDER BY created_at DESC"
            ))
            .bind(department)
            .bind(section)
            .fetch_all(pool)
            .await?
        }
        Scope::Mentor(staff_id) => {
            sqlx::query_as::<_, Team>(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams WHERE mentor = ? ORDER BY created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::MentorDepartments(staff_id) => {
            sqlx::query_as::<_, Team>(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams WHERE department IN \
                 (SELECT DISTINCT department FROM teams WHERE mentor = ?) ORDER BY created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::Nothing => Vec::new(),
    };

    Ok(teams)
}

pub async fn projects_in_scope(pool: &SqlitePool, scope: &Scope) -> AppResult<Vec<Project>> {
    let select = "SELECT p.project_id, p.title, p.team_id, p.theme, p.is_approved, p.is_hod_approved, p.created_at \
         FROM projects p JOIN teams t ON t.team_id = p.team_id";

    let projects = match scope {
        Scope::Department(department) => {
            sqlx::query_as::<_, Project>(&format!(
                "{select} WHERE t.department = ? ORDER BY p.created_at DESC"
            ))
            .bind(department)
            .fetch_all(pool)
            .await?
        }
        Scope::DepartmentSection(department, section) => {
            sqlx::query_as::<_, Project>(&format!(
                "{select} WHERE t.department = ? AND t.section = ? ORDER BY p.created_at DESC"
            ))
            .bind(department)
            .bind(section)
            .fetch_all(pool)
            .await?
        }
        Scope::Mentor(staff_id) => {
            sqlx::query_as::<_, Project>(&format!(
                "{select} WHERE t.mentor = ? ORDER BY p.created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::MentorDepartments(staff_id) => {
            sqlx::query_as::<_, Project>(&format!(
                "{select} WHERE t.department IN \
                 (SELECT DISTINCT department FROM teams WHERE mentor = ?) ORDER BY p.created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::Nothing => Vec::new(),
    };

    Ok(projects)
}

pub async fn reviews_in_scope(pool: &SqlitePool, scope: &Scope) -> AppResult<Vec<Review>> {
    let reviews = match scope {
        Scope::Department(department) => {
            sqlx::query_as::<_, Review>(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE department = ? ORDER BY created_at DESC"
            ))
            .bind(department)
            .fetch_all(pool)
            .await?
        }
        Scope::DepartmentSection(department, section) => {
            sqlx::query_as::<_, Review>(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE department = ? AND section = ? ORDER BY created_at DESC"
            ))
            .bind(department)
            .bind(section)
            .fetch_all(pool)
            .await?
        }
        Scope::Mentor(staff_id) => {
            sqlx::query_as::<_, Review>(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE team_id IN \
                 (SELECT team_id FROM teams WHERE mentor = ?) ORDER BY created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::MentorDepartments(staff_id) => {
            sqlx::query_as::<_, Review>(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE department IN \
                 (SELECT DISTINCT department FROM teams WHERE mentor = ?) ORDER BY created_at DESC"
            ))
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::Nothing => Vec::new(),
    };

    Ok(reviews)
}

pub async fn schedules_in_scope(pool: &SqlitePool, scope: &Scope) -> AppResult<Vec<Schedule>> {
    let schedules = match scope {
        Scope::Department(department) | Scope::DepartmentSection(department, _) => {
            sqlx::query_as::<_, Schedule>(
                "SELECT id, stage, department, start_date, end_date, created_at \
                 FROM project_review WHERE department = ? ORDER BY created_at DESC",
            )
            .bind(department)
            .fetch_all(pool)
            .await?
        }
        Scope::Mentor(staff_id) | Scope::MentorDepartments(staff_id) => {
            sqlx::query_as::<_, Schedule>(
                "SELECT id, stage, department, start_date, end_date, created_at \
                 FROM project_review WHERE department IN \
                 (SELECT DISTINCT department FROM teams WHERE mentor = ?) ORDER BY created_at DESC",
            )
            .bind(staff_id)
            .fetch_all(pool)
            .await?
        }
        Scope::Nothing => Vec::new(),
    };

    Ok(schedules)
}

pub async fn fetch_team(pool: &SqlitePool, team_id: Uuid) -> AppResult<Team> {
    sqlx::query_as::<_, Team>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?"
    ))
    .bind(team_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Team not found"))
}

pub async fn fetch_project(pool: &SqlitePool, project_id: Uuid) -> AppResult<Project> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?"
    ))
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Project not found"))
}

pub async fn fetch_review(pool: &SqlitePool, review_id: Uuid) -> AppResult<Review> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"
    ))
    .bind(review_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Review not found"))
}

pub async fn fetch_log(pool: &SqlitePool, log_id: Uuid) -> AppResult<Log> {
    sqlx::query_as::<_, Log>(
        "SELECT id, student_id, team_id, date, expected_task, completed_task, comments, mentor_approved, created_at \
         FROM logs WHERE id = ?",
    )
    .bind(log_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Log not found"))
}

/// Resolve a staff member by code into the public projection. Missing rows
/// and lookup failures both come back as `None`.
pub async fn staff_projection(pool: &SqlitePool, staff_id: &str) -> Option<Staff> {
    let result = sqlx::query_as::<_, DbStaff>(&format!(
        "SELECT {STAFF_COLUMNS} FROM staffs WHERE staff_id = ?"
    ))
    .bind(staff_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(row) => row.map(Staff::from),
        Err(err) => {
            tracing::warn!(staff_id, error = %err, "staff lookup failed");
            None
        }
    }
}

pub async fn staff_name(pool: &SqlitePool, staff_id: &str) -> Option<String> {
    let result = sqlx::query_scalar::<_, String>("SELECT name FROM staffs WHERE staff_id = ?")
        .bind(staff_id)
        .fetch_optional(pool)
        .await;

    match result {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!(staff_id, error = %err, "staff name lookup failed");
            None
        }
    }
}

pub async fn student_record(pool: &SqlitePool, student_id: &str) -> Option<Student> {
    let result = sqlx::query_as::<_, Student>(
        "SELECT student_id, name, register_number, department, section, team_id, created_at \
         FROM students WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(row) => row,
        Err(err) => {
            tracing::warn!(student_id, error = %err, "student lookup failed");
            None
        }
    }
}

pub async fn student_name(pool: &SqlitePool, student_id: &str) -> Option<String> {
    let result = sqlx::query_scalar::<_, String>("SELECT name FROM students WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(pool)
        .await;

    match result {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!(student_id, error = %err, "student name lookup failed");
            None
        }
    }
}

/// Attach mentor and team-lead names to a page of teams.
pub async fn team_summaries(pool: &SqlitePool, teams: Vec<Team>) -> Vec<TeamSummary> {
    let mut summaries = Vec::with_capacity(teams.len());
    for team in teams {
        let mentor_name = match &team.mentor {
            Some(mentor) => staff_name(pool, mentor).await,
            None => None,
        };
        let team_lead_name = match &team.team_lead {
            Some(lead) => student_name(pool, lead).await,
            None => None,
        };
        summaries.push(TeamSummary {
            team,
            mentor_name,
            team_lead_name,
        });
    }
    summaries
}

pub async fn team_detail(pool: &SqlitePool, team_id: Uuid) -> AppResult<TeamDetailResponse> {
    let team = fetch_team(pool, team_id).await?;

    let team_lead = match &team.team_lead {
        Some(lead) => student_record(pool, lead).await,
        None => None,
    };
    let mentor = match &team.mentor {
        Some(mentor) => staff_projection(pool, mentor).await,
        None => None,
    };

    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE team_id = ? ORDER BY created_at DESC"
    ))
    .bind(team_id)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|err| {
        tracing::warn!(%team_id, error = %err, "team reviews lookup failed");
        Vec::new()
    });

    let schedules = sqlx::query_as::<_, Schedule>(
        "SELECT id, stage, department, start_date, end_date, created_at \
         FROM project_review WHERE department = ? ORDER BY created_at DESC",
    )
    .bind(&team.department)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|err| {
        tracing::warn!(%team_id, error = %err, "team schedules lookup failed");
        Vec::new()
    });

    Ok(TeamDetailResponse {
        team,
        team_lead,
        mentor,
        reviews,
        schedules,
    })
}

/// Attach team context to a page of projects.
pub async fn project_summaries(pool: &SqlitePool, projects: Vec<Project>) -> Vec<ProjectSummary> {
    let mut summaries = Vec::with_capacity(projects.len());
    for project in projects {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?"
        ))
        .bind(project.team_id)
        .fetch_optional(pool)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(project_id = %project.project_id, error = %err, "project team lookup failed");
            None
        });

        let (team_department, team_section, team_lead_name, mentor_name, mentor_id) = match &team {
            Some(team) => {
                let team_lead_name = match &team.team_lead {
                    Some(lead) => student_name(pool, lead).await,
                    None => None,
                };
                let mentor_name = match &team.mentor {
                    Some(mentor) => staff_name(pool, mentor).await,
                    None => None,
                };
                (
                    Some(team.department.clone()),
                    Some(team.section.clone()),
                    team_lead_name,
                    mentor_name,
                    team.mentor.clone(),
                )
            }
            None => (None, None, None, None, None),
        };

        summaries.push(ProjectSummary {
            project,
            team_department,
            team_section,
            team_lead_name,
            mentor_name,
            mentor_id,
        });
    }
    summaries
}

pub async fn project_detail(
    pool: &SqlitePool,
    project_id: Uuid,
) -> AppResult<ProjectDetailResponse> {
    let project = fetch_project(pool, project_id).await?;

    let team = sqlx::query_as::<_, Team>(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?"
    ))
    .bind(project.team_id)
    .fetch_optional(pool)
    .await
    .unwrap_or_else(|err| {
        tracing::warn!(%project_id, error = %err, "project team lookup failed");
        None
    });

    let mut team_lead = None;
    let mut mentor = None;
    let mut reviews = Vec::new();

    if let Some(team) = &team {
        if let Some(lead) = &team.team_lead {
            team_lead = student_record(pool, lead).await;
        }
        if let Some(mentor_id) = &team.mentor {
            mentor = staff_projection(pool, mentor_id).await;
        }
        reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE team_id = ? ORDER BY created_at DESC"
        ))
        .bind(team.team_id)
        .fetch_all(pool)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%project_id, error = %err, "project reviews lookup failed");
            Vec::new()
        });
    }

    Ok(ProjectDetailResponse {
        project,
        team,
        team_lead,
        mentor,
        reviews,
    })
}

/// Attach team context and attachments to a page of reviews.
pub async fn review_summaries(pool: &SqlitePool, reviews: Vec<Review>) -> Vec<ReviewSummary> {
    let mut summaries = Vec::with_capacity(reviews.len());
    for review in reviews {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?"
        ))
        .bind(review.team_id)
        .fetch_optional(pool)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(review_id = %review.id, error = %err, "review team lookup failed");
            None
        });

        let (team_topic, team_code, team_section, team_lead_id) = match &team {
            Some(team) => (
                Some(team.topic.clone()),
                Some(team.code.clone()),
                Some(team.section.clone()),
                team.team_lead.clone(),
            ),
            None => (None, None, None, None),
        };

        let team_lead_name = match &team_lead_id {
            Some(lead) => student_name(pool, lead).await,
            None => None,
        };

        let attachments = sqlx::query_as::<_, ReviewAttachment>(
            "SELECT id, review_id, name, link, created_at FROM review_attachments \
             WHERE review_id = ? ORDER BY created_at DESC",
        )
        .bind(review.id)
        .fetch_all(pool)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(review_id = %review.id, error = %err, "attachments lookup failed");
            Vec::new()
        });

        summaries.push(ReviewSummary {
            id: review.id,
            team_id: review.team_id,
            stage: review.stage,
            department: review.department,
            is_completed: review.is_completed,
            completed_on: review.completed_on,
            result: review.result,
            marks: review.marks,
            created_at: review.created_at,
            team_topic,
            team_code,
            team_section,
            team_lead_id,
            team_lead_name,
            attachments,
        });
    }
    summaries
}

pub async fn mentored_team_ids(pool: &SqlitePool, staff_id: &str) -> AppResult<Vec<Uuid>> {
    Ok(
        sqlx::query_scalar::<_, Uuid>("SELECT team_id FROM teams WHERE mentor = ?")
            .bind(staff_id)
            .fetch_all(pool)
            .await?,
    )
}

/// Everything the diary builder needs, fetched in narrative order: logs by
/// date ascending, reviews by creation ascending. The project is optional.
pub async fn diary_data(pool: &SqlitePool, team_id: Uuid) -> AppResult<DiaryData> {
    let team = fetch_team(pool, team_id).await?;

    let students = sqlx::query_as::<_, Student>(
        "SELECT student_id, name, register_number, department, section, team_id, created_at \
         FROM students WHERE team_id = ? ORDER BY register_number",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    let team_lead = match &team.team_lead {
        Some(lead) => student_record(pool, lead).await,
        None => None,
    };
    let mentor = match &team.mentor {
        Some(mentor) => staff_projection(pool, mentor).await,
        None => None,
    };

    let logs = sqlx::query_as::<_, Log>(
        "SELECT id, student_id, team_id, date, expected_task, completed_task, comments, mentor_approved, created_at \
         FROM logs WHERE team_id = ? ORDER BY date ASC",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE team_id = ? ORDER BY created_at ASC"
    ))
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    let project = sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE team_id = ?"
    ))
    .bind(team_id)
    .fetch_optional(pool)
    .await
    .unwrap_or_else(|err| {
        tracing::warn!(%team_id, error = %err, "diary project lookup failed");
        None
    });

    Ok(DiaryData {
        team,
        students,
        team_lead,
        mentor,
        logs,
        reviews,
        project,
    })
}
