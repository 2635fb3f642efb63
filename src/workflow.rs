//! Pure state-transition rules for the approval chains. Handlers call these
//! before mutating anything, so violations never reach the store.

use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};
use crate::models::review::{MAX_MARKS, STAGES};

/// The HOD gate on a project requires a standing mentor approval.
pub fn ensure_hod_gate(mentor_approved: Option<bool>) -> AppResult<()> {
    if mentor_approved != Some(true) {
        return Err(AppError::validation(
            "Project must have mentor approval before HOD approval",
        ));
    }
    Ok(())
}

/// Log approval moves `null -> true|false` exactly once. Retrying the same
/// decision is accepted (idempotent); reversing a decision is not.
pub fn ensure_log_transition(current: Option<bool>, requested: bool) -> AppResult<()> {
    match current {
        None => Ok(()),
        Some(decided) if decided == requested => Ok(()),
        Some(_) => Err(AppError::validation("Log has already been reviewed")),
    }
}

/// `completed_on` is stamped on the first completion and preserved on every
/// later edit.
pub fn completion_stamp(
    current: Option<DateTime<Utc>>,
    will_be_completed: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if will_be_completed {
        current.or(Some(now))
    } else {
        current
    }
}

pub fn validate_marks(marks: i64) -> AppResult<()> {
    if !(0..=MAX_MARKS).contains(&marks) {
        return Err(AppError::validation(format!(
            "Marks must be between 0 and {MAX_MARKS}"
        )));
    }
    Ok(())
}

pub fn validate_stage(stage: &str) -> AppResult<()> {
    if !STAGES.contains(&stage) {
        return Err(AppError::validation(format!("Unknown review stage: {stage}")));
    }
    Ok(())
}

pub fn validate_schedule_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> AppResult<()> {
    if end <= start {
        return Err(AppError::validation("End date must be after start date"));
    }
    Ok(())
}
