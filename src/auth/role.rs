//! Closed set of roles an identity can hold

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Logistic,
    Finance,
    Marketing,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Logistic, Role::Finance, Role::Marketing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Logistic => "logistic",
            Role::Finance => "finance",
            Role::Marketing => "marketing",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "logistic" => Ok(Role::Logistic),
            "finance" => Ok(Role::Finance),
            "marketing" => Ok(Role::Marketing),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
