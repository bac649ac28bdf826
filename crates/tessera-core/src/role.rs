use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TesseraError;

/// Who is driving an agent session.
///
/// `Developer` sees every registered skill, including the skill-authoring
/// ones. `User` only sees skills without a `developer` role restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::User => "user",
        }
    }

    pub fn is_developer(&self) -> bool {
        matches!(self, Role::Developer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "developer" => Ok(Role::Developer),
            "user" => Ok(Role::User),
            _ => Err(TesseraError::UnknownRole(s.to_string())),
        }
    }
}

/// Runtime context attached to one agent invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleContext {
    pub role: Role,
    /// Identifier of the human behind the session, for audit logging.
    #[serde(default)]
    pub user_id: String,
    /// Current session workspace id. Empty outside a session.
    #[serde(default)]
    pub session_id: String,
    /// Arbitrary key/value pairs (tenant, department, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl RoleContext {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    pub fn is_developer(&self) -> bool {
        self.role.is_developer()
    }
}
