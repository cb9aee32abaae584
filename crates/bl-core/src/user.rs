//! Caller identity and role checks
//!
//! Authentication happens outside this engine. Every mutating operation
//! receives an already-authenticated [`UserContext`]; the engine applies only
//! the role checks the domain requires (payment review is reviewer-gated).

use serde::{Deserialize, Serialize};

use crate::traits::Id;

/// Application roles as delivered by the identity layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    PropertyManager,
    ProjectManager,
    Contractor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::PropertyManager => "property_manager",
            Self::ProjectManager => "project_manager",
            Self::Contractor => "contractor",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "property_manager" => Some(Self::PropertyManager),
            "project_manager" => Some(Self::ProjectManager),
            "contractor" => Some(Self::Contractor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// An authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Id,
    pub role: Role,
}

impl UserContext {
    pub fn new(user_id: Id, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Payment requests may only be decided by property managers and admins.
    pub fn can_review_payments(&self) -> bool {
        matches!(self.role, Role::Admin | Role::PropertyManager)
    }

    /// Reviewer roles also own the risk register.
    pub fn can_manage_risks(&self) -> bool {
        matches!(
            self.role,
            Role::Admin | Role::PropertyManager | Role::ProjectManager
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::Admin,
            Role::PropertyManager,
            Role::ProjectManager,
            Role::Contractor,
            Role::Viewer,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("landlord"), None);
    }

    #[test]
    fn test_reviewer_gate() {
        assert!(UserContext::new(1, Role::Admin).can_review_payments());
        assert!(UserContext::new(2, Role::PropertyManager).can_review_payments());
        assert!(!UserContext::new(3, Role::Contractor).can_review_payments());
        assert!(!UserContext::new(4, Role::ProjectManager).can_review_payments());
    }
}
