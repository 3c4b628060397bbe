//! Coarse privilege classes and role-row resolution.

use serde::{Deserialize, Serialize};

/// Coarse privilege class of a principal.
///
/// `None` is the default whenever no role row exists for the user or
/// resolution has not completed yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Developer,
    #[default]
    None,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::None => "none",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "developer" => Ok(Role::Developer),
            "none" => Ok(Role::None),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Fold a user's role rows into one effective role.
///
/// A user may hold several role rows. `Admin` dominates regardless of row
/// order; first-match-wins over the raw rows would be wrong whenever an
/// admin row sorts after another role. With no rows at all the effective
/// role is `None`; otherwise the first remaining row wins (no tie-break is
/// defined among non-admin roles).
pub fn effective_role(rows: &[Role]) -> Role {
    if rows.iter().any(Role::is_admin) {
        return Role::Admin;
    }
    rows.iter().copied().find(|r| *r != Role::None).unwrap_or(Role::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_resolves_to_none() {
        assert_eq!(effective_role(&[]), Role::None);
    }

    #[test]
    fn single_developer_row() {
        assert_eq!(effective_role(&[Role::Developer]), Role::Developer);
    }

    #[test]
    fn admin_dominates_regardless_of_order() {
        assert_eq!(effective_role(&[Role::Admin, Role::Developer]), Role::Admin);
        assert_eq!(effective_role(&[Role::Developer, Role::Admin]), Role::Admin);
        assert_eq!(
            effective_role(&[Role::Developer, Role::Developer, Role::Admin]),
            Role::Admin
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::Developer).unwrap();
        assert_eq!(json, "\"developer\"");
        let back: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }
}
