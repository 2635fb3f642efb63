//! Project-diary document assembly.
//!
//! [`build_document`] is a pure function over [`DiaryData`]: no I/O, no
//! clock. The client renders the returned tables into a PDF; the header
//! graphic is fetched by the renderer, which falls back to the text lines
//! when the image cannot be loaded.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::log::Log;
use crate::models::project::Project;
use crate::models::review::Review;
use crate::models::staff::Staff;
use crate::models::student::Student;
use crate::models::team::Team;

pub const HEADER_IMAGE_URL: &str = "https://ik.imagekit.io/rdunkpgr8/image.png";
pub const DOC_REF: &str = "KITE/IQAC/PW/06";

const ACTION_PLAN_ROWS: usize = 8;
const MIN_MEMBER_ROWS: usize = 5;
const MIN_ATTENDANCE_ROWS: usize = 5;
const MIN_PROGRESS_ROWS: usize = 9;
const MIN_FEEDBACK_ROWS: usize = 9;
const MARKS_REVIEW_COUNT: usize = 3;

/// Aggregated inputs for one team's diary. Logs are ordered by date
/// ascending and reviews by creation ascending before they reach the
/// builder.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryData {
    pub team: Team,
    pub students: Vec<Student>,
    #[serde(rename = "teamLead")]
    pub team_lead: Option<Student>,
    pub mentor: Option<Staff>,
    pub logs: Vec<Log>,
    pub reviews: Vec<Review>,
    pub project: Option<Project>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiarySection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryHeader {
    pub image_url: String,
    /// Rendered instead of the image when the asset fetch fails.
    pub fallback_lines: Vec<String>,
    pub doc_ref: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiaryDocument {
    pub header: DiaryHeader,
    pub title: String,
    pub department: String,
    pub year_sem_sec: String,
    pub project_title: String,
    pub sections: Vec<DiarySection>,
    pub signatories: Vec<String>,
}

/// Assemble the fixed seven-section diary. Every section is present even
/// when its backing data is empty; tables are padded with blank rows to
/// their minimum size.
pub fn build_document(data: &DiaryData) -> DiaryDocument {
    let project_title = data
        .project
        .as_ref()
        .map(|project| project.title.clone())
        .unwrap_or_else(|| data.team.topic.clone());

    let sections = vec![
        team_members_section(data),
        action_plan_section(),
        attendance_section(data, "III. Attendance by Supervisor", true),
        attendance_section(
            data,
            "IV. Attendance by External Supervisor (If Applicable)",
            false,
        ),
        progress_section(data),
        feedback_section(data),
        marks_section(data),
    ];

    DiaryDocument {
        header: DiaryHeader {
            image_url: HEADER_IMAGE_URL.to_string(),
            fallback_lines: vec![
                "KGiSL Institute of Technology".to_string(),
                "(An Autonomous Institution)".to_string(),
                "Affiliated to Anna University, Approved by AICTE".to_string(),
            ],
            doc_ref: DOC_REF.to_string(),
        },
        title: "PROJECT DIARY".to_string(),
        department: data.team.department.clone(),
        year_sem_sec: data.team.section.clone(),
        project_title,
        sections,
        signatories: vec![
            "Project Supervisor".to_string(),
            "Project Coordinator".to_string(),
            "HoD".to_string(),
        ],
    }
}

fn team_members_section(data: &DiaryData) -> DiarySection {
    let headers = string_row(&[
        "S.NO.",
        "REG.NO.",
        "STUDENT NAME",
        "INTERNAL SUPERVISOR",
        "EXTERNAL SUPERVISOR (If Applicable)",
    ]);

    let mentor_name = data
        .mentor
        .as_ref()
        .map(|mentor| mentor.name.clone())
        .unwrap_or_default();

    let mut rows: Vec<Vec<String>> = data
        .students
        .iter()
        .enumerate()
        .map(|(index, student)| {
            vec![
                (index + 1).to_string(),
                student.register_number.clone(),
                student.name.clone(),
                // The supervisor is listed once, against the first member.
                if index == 0 { mentor_name.clone() } else { String::new() },
                String::new(),
            ]
        })
        .collect();

    pad_rows(&mut rows, MIN_MEMBER_ROWS, headers.len());

    DiarySection {
        title: "I. Team Members".to_string(),
        headers,
        rows,
    }
}

fn action_plan_section() -> DiarySection {
    let headers = string_row(&[
        "S.NO.",
        "MAJOR ACTIVITIES",
        "TARGET DATE",
        "ACTUAL DATE",
        "REASON FOR DELAY (If Any)",
        "REMARKS",
        "SIGNATURE OF THE SUPERVISOR",
    ]);

    let mut rows = Vec::new();
    pad_rows(&mut rows, ACTION_PLAN_ROWS, headers.len());

    DiarySection {
        title: "II. Action Plan".to_string(),
        headers,
        rows,
    }
}

fn attendance_section(data: &DiaryData, title: &str, mark_presence: bool) -> DiarySection {
    let dates: Vec<NaiveDate> = data
        .logs
        .iter()
        .map(|log| log.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut headers = vec!["STUDENT NAME".to_string()];
    headers.extend(dates.iter().map(|date| format_date(*date)));

    let mut rows: Vec<Vec<String>> = data
        .students
        .iter()
        .map(|student| {
            let mut row = vec![student.name.clone()];
            for date in &dates {
                let present = mark_presence
                    && data
                        .logs
                        .iter()
                        .any(|log| log.student_id == student.student_id && log.date == *date);
                row.push(if present { "P".to_string() } else { String::new() });
            }
            row
        })
        .collect();

    pad_rows(&mut rows, MIN_ATTENDANCE_ROWS, headers.len());

    let signature_label = if mark_presence {
        "SIGNATURE OF THE SUPERVISOR"
    } else {
        "SIGNATURE OF THE EXTERNAL SUPERVISOR"
    };
    let mut signature_row = vec![signature_label.to_string()];
    signature_row.resize(headers.len(), String::new());
    rows.push(signature_row);

    DiarySection {
        title: title.to_string(),
        headers,
        rows,
    }
}

fn progress_section(data: &DiaryData) -> DiarySection {
    let headers = string_row(&[
        "DATE",
        "DETAILS OF WORK DONE",
        "SIGNATURE OF SUPERVISOR",
        "REMARKS",
    ]);

    let mut rows: Vec<Vec<String>> = data
        .logs
        .iter()
        .map(|log| {
            let student_name = data
                .students
                .iter()
                .find(|student| student.student_id == log.student_id)
                .map(|student| student.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            vec![
                format_date(log.date),
                format!("{}: {}", student_name, log.completed_task),
                String::new(),
                log.comments.clone().unwrap_or_default(),
            ]
        })
        .collect();

    pad_rows(&mut rows, MIN_PROGRESS_ROWS, headers.len());

    DiarySection {
        title: "V. Progress of the work".to_string(),
        headers,
        rows,
    }
}

fn feedback_section(data: &DiaryData) -> DiarySection {
    let headers = string_row(&[
        "REVIEW NO.",
        "REVIEW DATE",
        "DETAILS OF FEEDBACK RECEIVED",
        "NAME OF THE REVIEWER",
        "PLAN OF ACTION",
        "TARGET DATE",
        "SIGNATURE OF THE SUPERVISOR",
    ]);

    let mut rows: Vec<Vec<String>> = data
        .reviews
        .iter()
        .enumerate()
        .map(|(index, review)| {
            let date = review
                .completed_on
                .map(|at| format_date(at.date_naive()))
                .unwrap_or_else(|| format_date(review.created_at.date_naive()));

            vec![
                (index + 1).to_string(),
                date,
                review.result.clone().unwrap_or_default(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]
        })
        .collect();

    pad_rows(&mut rows, MIN_FEEDBACK_ROWS, headers.len());

    DiarySection {
        title: "VI. Feedback from Project Review".to_string(),
        headers,
        rows,
    }
}

fn marks_section(data: &DiaryData) -> DiarySection {
    let headers = string_row(&[
        "REG.NO.",
        "NAME OF THE STUDENT",
        "REVIEW I (100)",
        "REVIEW II (100)",
        "REVIEW III (100)",
        "INTERNAL MARK (100)",
    ]);

    let first_marks: Vec<Option<i64>> = data
        .reviews
        .iter()
        .take(MARKS_REVIEW_COUNT)
        .map(|review| review.marks)
        .collect();

    let internal_mark = internal_mark(&first_marks);

    let mut rows: Vec<Vec<String>> = data
        .students
        .iter()
        .map(|student| {
            let mut row = vec![student.register_number.clone(), student.name.clone()];
            for slot in 0..MARKS_REVIEW_COUNT {
                let cell = first_marks
                    .get(slot)
                    .copied()
                    .flatten()
                    .map(|marks| marks.to_string())
                    .unwrap_or_default();
                row.push(cell);
            }
            row.push(
                internal_mark
                    .map(|mark| mark.to_string())
                    .unwrap_or_default(),
            );
            row
        })
        .collect();

    pad_rows(&mut rows, MIN_MEMBER_ROWS, headers.len());

    DiarySection {
        title: "VII. Review & Internal Mark".to_string(),
        headers,
        rows,
    }
}

/// Arithmetic mean over the non-zero marks among the first three reviews,
/// rounded to the nearest integer. None when no marks were recorded.
fn internal_mark(marks: &[Option<i64>]) -> Option<i64> {
    let valid: Vec<i64> = marks.iter().copied().flatten().filter(|m| *m > 0).collect();
    if valid.is_empty() {
        return None;
    }
    let sum: i64 = valid.iter().sum();
    Some((sum as f64 / valid.len() as f64).round() as i64)
}

fn pad_rows(rows: &mut Vec<Vec<String>>, minimum: usize, width: usize) {
    while rows.len() < minimum {
        rows.push(vec![String::new(); width]);
    }
}

fn string_row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn team() -> Team {
        Team {
            team_id: Uuid::new_v4(),
            topic: "Crop Yield Prediction".to_string(),
            code: "T-07".to_string(),
            department: "CSE".to_string(),
            section: "B".to_string(),
            team_lead: Some("21CS101".to_string()),
            mentor: Some("ST104".to_string()),
            is_approved: Some(true),
            current_status: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap(),
        }
    }

    fn student(id: &str, reg: &str, name: &str) -> Student {
        Student {
            student_id: id.to_string(),
            name: name.to_string(),
            register_number: reg.to_string(),
            department: "CSE".to_string(),
            section: "B".to_string(),
            team_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn log(student_id: &str, date: NaiveDate, task: &str) -> Log {
        Log {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            team_id: Uuid::new_v4(),
            date,
            expected_task: "plan".to_string(),
            completed_task: task.to_string(),
            comments: None,
            mentor_approved: None,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    fn review(marks: Option<i64>) -> Review {
        Review {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            stage: "Review 1".to_string(),
            department: "CSE".to_string(),
            section: Some("B".to_string()),
            is_completed: marks.is_some(),
            completed_on: None,
            result: Some("Good".to_string()),
            marks,
            created_at: Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap(),
        }
    }

    fn empty_data() -> DiaryData {
        DiaryData {
            team: team(),
            students: Vec::new(),
            team_lead: None,
            mentor: None,
            logs: Vec::new(),
            reviews: Vec::new(),
            project: None,
        }
    }

    #[test]
    fn empty_team_still_produces_all_sections() {
        let document = build_document(&empty_data());

        assert_eq!(document.sections.len(), 7);
        assert_eq!(document.project_title, "Crop Yield Prediction");

        // Every table carries its blank placeholder rows.
        assert!(document.sections[0].rows.len() >= MIN_MEMBER_ROWS);
        assert_eq!(document.sections[1].rows.len(), ACTION_PLAN_ROWS);
        assert!(document.sections[4].rows.len() >= MIN_PROGRESS_ROWS);
        assert!(document.sections[5].rows.len() >= MIN_FEEDBACK_ROWS);
        assert!(document.sections[6].rows.len() >= MIN_MEMBER_ROWS);

        // Rows are rectangular.
        for section in &document.sections {
            for row in &section.rows {
                assert_eq!(row.len(), section.headers.len(), "{}", section.title);
            }
        }
    }

    #[test]
    fn attendance_marks_presence_per_log_date() {
        let mut data = empty_data();
        data.students = vec![
            student("21CS101", "7101", "Asha"),
            student("21CS102", "7102", "Vikram"),
        ];
        let day1 = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2025, 2, 4).unwrap();
        data.logs = vec![
            log("21CS101", day1, "collected dataset"),
            log("21CS102", day2, "cleaned dataset"),
        ];

        let document = build_document(&data);
        let attendance = &document.sections[2];

        assert_eq!(attendance.headers.len(), 3);
        assert_eq!(attendance.rows[0][1], "P");
        assert_eq!(attendance.rows[0][2], "");
        assert_eq!(attendance.rows[1][1], "");
        assert_eq!(attendance.rows[1][2], "P");

        // The external matrix has the same shape but no presence marks.
        let external = &document.sections[3];
        assert_eq!(external.rows[0][1], "");
        assert_eq!(external.rows[1][2], "");
    }

    #[test]
    fn progress_rows_follow_log_order_with_student_names() {
        let mut data = empty_data();
        data.students = vec![student("21CS101", "7101", "Asha")];
        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        data.logs = vec![log("21CS101", day, "collected dataset")];

        let document = build_document(&data);
        let progress = &document.sections[4];

        assert_eq!(progress.rows[0][0], "03/02/2025");
        assert_eq!(progress.rows[0][1], "Asha: collected dataset");
        assert!(progress.rows.len() >= MIN_PROGRESS_ROWS);
    }

    #[test]
    fn internal_mark_averages_nonzero_marks_of_first_three_reviews() {
        let mut data = empty_data();
        data.students = vec![student("21CS101", "7101", "Asha")];
        data.reviews = vec![
            review(Some(80)),
            review(Some(0)),
            review(Some(91)),
            review(Some(40)),
        ];

        let document = build_document(&data);
        let marks = &document.sections[6];

        // (80 + 91) / 2 = 85.5, rounded to 86; the zero mark and the fourth
        // review are excluded.
        assert_eq!(marks.rows[0][2], "80");
        assert_eq!(marks.rows[0][3], "0");
        assert_eq!(marks.rows[0][4], "91");
        assert_eq!(marks.rows[0][5], "86");
    }

    #[test]
    fn internal_mark_is_blank_without_marks() {
        let mut data = empty_data();
        data.students = vec![student("21CS101", "7101", "Asha")];
        data.reviews = vec![review(None)];

        let document = build_document(&data);
        let marks = &document.sections[6];
        assert_eq!(marks.rows[0][5], "");
    }

    #[test]
    fn project_title_prefers_project_over_topic() {
        let mut data = empty_data();
        data.project = Some(Project {
            project_id: Uuid::new_v4(),
            title: "Yield Forecasting Platform".to_string(),
            team_id: data.team.team_id,
            theme: Json(vec!["ml".to_string()]),
            is_approved: Some(true),
            is_hod_approved: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap(),
        });

        let document = build_document(&data);
        assert_eq!(document.project_title, "Yield Forecasting Platform");
    }
}
