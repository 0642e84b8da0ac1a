//! Generation stage roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three remotely executed text-generation roles.
///
/// Roles are identically shaped; they differ only in the configured model
/// and the system instruction sent with each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Rewrites the raw topic into a clearer generation prompt.
    Optimizer,
    /// Produces the teacher/student dialogue.
    Generator,
    /// Checks the dialogue for factual errors.
    Reviewer,
}

impl Role {
    /// All roles, in pipeline order.
    pub const ALL: [Role; 3] = [Role::Optimizer, Role::Generator, Role::Reviewer];

    /// Lowercase name used in logs and configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Optimizer => "optimizer",
            Role::Generator => "generator",
            Role::Reviewer => "reviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn deserialize_lowercase() {
        let role: Role = serde_json::from_str("\"reviewer\"").unwrap();
        assert_eq!(role, Role::Reviewer);
    }

    #[test]
    fn pipeline_order() {
        assert_eq!(
            Role::ALL,
            [Role::Optimizer, Role::Generator, Role::Reviewer]
        );
    }
}
