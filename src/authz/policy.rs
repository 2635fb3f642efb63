use crate::errors::{AppError, AppResult};

use super::principal::{Principal, Role};

/// Resource families that have role-scoped list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Teams,
    Projects,
    Reviews,
    Schedules,
}

/// Row filter produced by [`read_scope`]. The query layer interprets the
/// scope per resource; `Nothing` always yields an empty result set, never an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Rows in the given department.
    Department(String),
    /// Rows in the given department and section.
    DepartmentSection(String, String),
    /// Rows owned by teams the given staff member mentors.
    Mentor(String),
    /// Rows in any department where the given staff member mentors a team.
    MentorDepartments(String),
    /// No branch matched; the caller sees nothing.
    Nothing,
}

/// Single source of truth for the read filters behind every list endpoint.
///
/// Branch precedence mirrors the role checks the portal has always applied:
/// HOD first, then CLASS_ADVISOR, then PROJECT_MENTOR, so a combination role
/// gets the widest scope it qualifies for.
pub fn read_scope(principal: &Principal, resource: Resource) -> Scope {
    if principal.has_role(Role::Hod) {
        if let Some(department) = &principal.department {
            return Scope::Department(department.clone());
        }
        return Scope::Nothing;
    }

    if principal.has_role(Role::ClassAdvisor) {
        let Some(department) = &principal.department else {
            return Scope::Nothing;
        };
        return match resource {
            // Schedules are department-wide even for advisors.
            Resource::Schedules => Scope::Department(department.clone()),
            Resource::Reviews => match &principal.section {
                Some(section) => Scope::DepartmentSection(department.clone(), section.clone()),
                None => Scope::Department(department.clone()),
            },
            Resource::Teams | Resource::Projects => match &principal.section {
                Some(section) => Scope::DepartmentSection(department.clone(), section.clone()),
                None => Scope::Department(department.clone()),
            },
        };
    }

    if principal.has_role(Role::ProjectMentor) {
        return match resource {
            Resource::Schedules => Scope::MentorDepartments(principal.staff_id.clone()),
            _ => Scope::Mentor(principal.staff_id.clone()),
        };
    }

    Scope::Nothing
}

/// Only HODs may approve or reject teams, and only inside their department.
pub fn ensure_can_approve_team(principal: &Principal, team_department: &str) -> AppResult<()> {
    if !principal.has_role(Role::Hod) {
        return Err(AppError::forbidden("Only HODs can approve or reject teams"));
    }
    if principal.department.as_deref() != Some(team_department) {
        return Err(AppError::forbidden(
            "You can only approve or reject teams in your department",
        ));
    }
    Ok(())
}

/// HODs assign mentors within their department; class advisors within their
/// department and section.
pub fn ensure_can_assign_mentor(
    principal: &Principal,
    team_department: &str,
    team_section: &str,
) -> AppResult<()> {
    if principal.has_role(Role::Hod) {
        if principal.department.as_deref() != Some(team_department) {
            return Err(AppError::forbidden(
                "You can only assign mentors to teams in your department",
            ));
        }
        return Ok(());
    }
    if principal.has_role(Role::ClassAdvisor) {
        if principal.department.as_deref() != Some(team_department)
            || principal.section.as_deref() != Some(team_section)
        {
            return Err(AppError::forbidden(
                "You can only assign mentors to teams in your department and section",
            ));
        }
        return Ok(());
    }
    Err(AppError::forbidden("You are not authorized to assign mentors"))
}

/// Mentor-level project approval: caller must hold the mentor role at all.
pub fn ensure_mentor_role(principal: &Principal) -> AppResult<()> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can approve projects"));
    }
    Ok(())
}

/// Mentor-level project approval: caller must be the mentor of the project's
/// team.
pub fn ensure_mentor_of_project_team(
    principal: &Principal,
    team_mentor: Option<&str>,
) -> AppResult<()> {
    if team_mentor != Some(principal.staff_id.as_str()) {
        return Err(AppError::forbidden(
            "You are not the mentor of this project's team",
        ));
    }
    Ok(())
}

/// Final HOD approval: HOD role plus department match. The mentor-approval
/// precondition is checked separately by the workflow layer.
pub fn ensure_can_hod_approve(principal: &Principal, team_department: &str) -> AppResult<()> {
    if !principal.has_role(Role::Hod) {
        return Err(AppError::forbidden(
            "Only HODs can give final approval to projects",
        ));
    }
    if principal.department.as_deref() != Some(team_department) {
        return Err(AppError::forbidden(
            "You can only approve projects in your department",
        ));
    }
    Ok(())
}

/// Review evaluation: HODs evaluate freely, mentors only for their own teams.
pub fn ensure_review_evaluator(
    principal: &Principal,
    team_mentor: Option<&str>,
) -> AppResult<()> {
    if principal.has_role(Role::Hod) {
        return Ok(());
    }
    if principal.has_role(Role::ProjectMentor)
        && team_mentor == Some(principal.staff_id.as_str())
    {
        return Ok(());
    }
    Err(AppError::forbidden(
        "You are not authorized to update this review",
    ))
}

/// Schedule creation: HOD or class advisor, for their own department only.
/// A pure project mentor is rejected outright.
pub fn ensure_can_create_schedule(
    principal: &Principal,
    target_department: &str,
) -> AppResult<()> {
    if principal.has_role(Role::Hod) || principal.has_role(Role::ClassAdvisor) {
        if principal.department.as_deref() != Some(target_department) {
            return Err(AppError::forbidden(
                "You can only create schedules for your own department",
            ));
        }
        return Ok(());
    }
    if principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden(
            "Project mentors are not authorized to create schedules",
        ));
    }
    Err(AppError::forbidden("You are not authorized to create schedules"))
}

/// Log approval: mentor role plus ownership of the log's team.
pub fn ensure_log_approver(principal: &Principal, team_mentor: Option<&str>) -> AppResult<()> {
    if !principal.has_role(Role::ProjectMentor) {
        return Err(AppError::forbidden("Only project mentors can approve logs"));
    }
    if team_mentor != Some(principal.staff_id.as_str()) {
        return Err(AppError::forbidden("You are not the mentor for this team"));
    }
    Ok(())
}

/// Review templates may be uploaded by HODs and project mentors.
pub fn ensure_can_upload_template(principal: &Principal) -> AppResult<()> {
    if principal.has_role(Role::Hod) || principal.has_role(Role::ProjectMentor) {
        return Ok(());
    }
    Err(AppError::forbidden("Insufficient permissions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::RoleSet;
    use uuid::Uuid;

    fn principal(role: &str, department: Option<&str>, section: Option<&str>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            staff_id: "ST100".to_string(),
            email: "staff@example.edu".to_string(),
            role: role.to_string(),
            roles: RoleSet::parse(role),
            department: department.map(str::to_string),
            section: section.map(str::to_string),
        }
    }

    #[test]
    fn hod_reads_department_wide() {
        let hod = principal("HOD", Some("CSE"), None);
        assert_eq!(
            read_scope(&hod, Resource::Teams),
            Scope::Department("CSE".to_string())
        );
        assert_eq!(
            read_scope(&hod, Resource::Reviews),
            Scope::Department("CSE".to_string())
        );
    }

    #[test]
    fn advisor_reads_department_and_section() {
        let advisor = principal("CLASS_ADVISOR", Some("CSE"), Some("B"));
        assert_eq!(
            read_scope(&advisor, Resource::Teams),
            Scope::DepartmentSection("CSE".to_string(), "B".to_string())
        );
        // Schedules stay department-wide for advisors.
        assert_eq!(
            read_scope(&advisor, Resource::Schedules),
            Scope::Department("CSE".to_string())
        );
    }

    #[test]
    fn mentor_reads_own_teams_only() {
        let mentor = principal("PROJECT_MENTOR", None, None);
        assert_eq!(
            read_scope(&mentor, Resource::Teams),
            Scope::Mentor("ST100".to_string())
        );
        assert_eq!(
            read_scope(&mentor, Resource::Schedules),
            Scope::MentorDepartments("ST100".to_string())
        );
    }

    #[test]
    fn combination_role_takes_widest_branch() {
        let combo = principal("HOD+PROJECT_MENTOR", Some("CSE"), None);
        assert_eq!(
            read_scope(&combo, Resource::Projects),
            Scope::Department("CSE".to_string())
        );
    }

    #[test]
    fn unmatched_principal_sees_nothing() {
        let nobody = principal("", None, None);
        assert_eq!(read_scope(&nobody, Resource::Teams), Scope::Nothing);
        let hod_without_department = principal("HOD", None, None);
        assert_eq!(
            read_scope(&hod_without_department, Resource::Teams),
            Scope::Nothing
        );
    }

    #[test]
    fn team_approval_is_hod_only() {
        let advisor = principal("CLASS_ADVISOR", Some("CSE"), Some("B"));
        assert!(ensure_can_approve_team(&advisor, "CSE").is_err());

        let hod = principal("HOD", Some("CSE"), None);
        assert!(ensure_can_approve_team(&hod, "CSE").is_ok());
        assert!(ensure_can_approve_team(&hod, "ECE").is_err());
    }

    #[test]
    fn advisor_assigns_mentors_in_own_section_only() {
        let advisor = principal("CLASS_ADVISOR", Some("CSE"), Some("B"));
        assert!(ensure_can_assign_mentor(&advisor, "CSE", "B").is_ok());
        assert!(ensure_can_assign_mentor(&advisor, "CSE", "A").is_err());

        let mentor = principal("PROJECT_MENTOR", None, None);
        assert!(ensure_can_assign_mentor(&mentor, "CSE", "B").is_err());
    }

    #[test]
    fn schedule_creation_honors_combination_roles() {
        let combo = principal("CLASS_ADVISOR+PROJECT_MENTOR", Some("CSE"), Some("B"));
        assert!(ensure_can_create_schedule(&combo, "CSE").is_ok());
        assert!(ensure_can_create_schedule(&combo, "ECE").is_err());

        let pure_mentor = principal("PROJECT_MENTOR", Some("CSE"), None);
        assert!(ensure_can_create_schedule(&pure_mentor, "CSE").is_err());
    }

    #[test]
    fn review_evaluation_requires_ownership_for_mentors() {
        let hod = principal("HOD", Some("CSE"), None);
        assert!(ensure_review_evaluator(&hod, Some("ST999")).is_ok());

        let mentor = principal("PROJECT_MENTOR", None, None);
        assert!(ensure_review_evaluator(&mentor, Some("ST100")).is_ok());
        assert!(ensure_review_evaluator(&mentor, Some("ST999")).is_err());
        assert!(ensure_review_evaluator(&mentor, None).is_err());
    }

    #[test]
    fn log_approval_rejects_other_mentors() {
        let mentor = principal("PROJECT_MENTOR", Some("CSE"), None);
        assert!(ensure_log_approver(&mentor, Some("ST100")).is_ok());
        // Same department is not enough.
        assert!(ensure_log_approver(&mentor, Some("ST200")).is_err());
    }
}
