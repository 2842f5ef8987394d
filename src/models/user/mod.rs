// User module
// Accounts known to the shift service and the identity acting in this session

use serde::{Deserialize, Serialize};

/// Account as listed by the shift service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "isadmin", default)]
    pub is_admin: bool,
}

/// Result of creating an account; the secret is only ever returned once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    #[serde(rename = "isadmin", default)]
    pub is_admin: bool,
    #[serde(rename = "pass")]
    pub generated_secret: String,
}

/// Who is acting, as carried by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
        }
    }

    /// Privileged identities pick an assignee when creating shifts.
    pub fn is_privileged(&self) -> bool {
        self.is_admin
    }
}
