//! Authorization module.
//!
//! Every endpoint resolves a [`Principal`] once per request and asks the
//! policy layer two questions: which rows may this principal read
//! ([`policy::read_scope`]) and may it perform this mutation (the
//! `ensure_*` checks). Handlers never duplicate filter logic.

mod policy;
mod principal;

pub use policy::{read_scope, Resource, Scope};
pub use policy::{
    ensure_can_approve_team, ensure_can_assign_mentor, ensure_can_create_schedule,
    ensure_can_hod_approve, ensure_can_upload_template, ensure_log_approver,
    ensure_mentor_of_project_team, ensure_mentor_role, ensure_review_evaluator,
};
pub use principal::{Principal, Role, RoleSet};
