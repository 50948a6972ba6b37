use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Роль пользователя. STAFF привязан к своему филиалу.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UserRole {
    Admin,
    Manager,
    Staff,
    #[default]
    Unspecified,
}

impl FromStr for UserRole {
    type Err = Infallible;

    /// Case-insensitive. Unknown values fall back to `Unspecified`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "admin" => UserRole::Admin,
            "manager" => UserRole::Manager,
            "staff" => UserRole::Staff,
            _ => UserRole::Unspecified,
        })
    }
}

impl UserRole {
    /// STAFF cannot pick a branch; everything they see is scoped to their own.
    pub fn is_branch_locked(&self) -> bool {
        matches!(self, UserRole::Staff)
    }
}

/// Current user profile as returned by `/api/auth/me` and kept in localStorage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

impl UserInfo {
    pub fn role(&self) -> UserRole {
        self.role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }
}
