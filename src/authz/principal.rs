use std::collections::HashSet;
use std::fmt;

use uuid::Uuid;

/// Staff role tags. Stored role strings are `+`-joined combinations such as
/// `"CLASS_ADVISOR+PROJECT_MENTOR"`; parsing into a set preserves the
/// contains-semantics of the encoded form, so a combination satisfies every
/// rule its parts satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Hod,
    ClassAdvisor,
    ProjectMentor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hod => "HOD",
            Role::ClassAdvisor => "CLASS_ADVISOR",
            Role::ProjectMentor => "PROJECT_MENTOR",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "HOD" => Some(Role::Hod),
            "CLASS_ADVISOR" => Some(Role::ClassAdvisor),
            "PROJECT_MENTOR" => Some(Role::ProjectMentor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    /// Parse a stored role string. Unknown tokens are dropped rather than
    /// rejected; a row with an unrecognized role simply matches no branch.
    pub fn parse(raw: &str) -> Self {
        RoleSet(
            raw.split('+')
                .filter_map(|token| Role::from_token(token.trim()))
                .collect(),
        )
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical order keeps the joined form stable for logging.
        let mut parts = Vec::new();
        for role in [Role::Hod, Role::ClassAdvisor, Role::ProjectMentor] {
            if self.contains(role) {
                parts.push(role.as_str());
            }
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// The authenticated caller, resolved once per request from the session
/// cookie and passed by parameter through policy and aggregation code.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub staff_id: String,
    pub email: String,
    /// Raw role string as stored, echoed back in session payloads.
    pub role: String,
    pub roles: RoleSet,
    pub department: Option<String>,
    pub section: Option<String>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_role() {
        let roles = RoleSet::parse("HOD");
        assert!(roles.contains(Role::Hod));
        assert!(!roles.contains(Role::ProjectMentor));
    }

    #[test]
    fn parses_combination_role() {
        let roles = RoleSet::parse("CLASS_ADVISOR+PROJECT_MENTOR");
        assert!(roles.contains(Role::ClassAdvisor));
        assert!(roles.contains(Role::ProjectMentor));
        assert!(!roles.contains(Role::Hod));
    }

    #[test]
    fn ignores_unknown_tokens() {
        let roles = RoleSet::parse("HOD+SOMETHING_ELSE");
        assert!(roles.contains(Role::Hod));
        let unknown = RoleSet::parse("ADMIN");
        assert!(unknown.is_empty());
    }

    #[test]
    fn display_uses_canonical_order() {
        let roles = RoleSet::parse("PROJECT_MENTOR+HOD");
        assert_eq!(roles.to_string(), "HOD+PROJECT_MENTOR");
    }
}
