//! Authenticated user session and role gating

use std::fmt;

use serde::Deserialize;

use super::types::Page;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
    Other(String),
}

impl Role {
    /// Case-insensitive; an absent or blank role is a plain user.
    /// A login response without a role never opens the admin pages, even
    /// though the website itself falls back to admin there.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Role::User;
        };
        match raw.to_lowercase().as_str() {
            "user" | "usuario" => Role::User,
            "admin" => Role::Admin,
            "superadmin" | "super_admin" | "super-admin" => Role::SuperAdmin,
            _ => Role::Other(raw.to_string()),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
            Role::SuperAdmin => f.write_str("superadmin"),
            Role::Other(other) => f.write_str(other),
        }
    }
}

/// Body of a successful `POST /api/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "rol")]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// Created by a successful login, dropped by logout. Never expires on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl Session {
    /// Fills gaps in the response from what the user typed
    pub fn from_login(response: LoginResponse, typed_email: &str) -> Self {
        Self {
            token: response.token,
            role: Role::parse(response.role.as_deref()),
            email: response
                .email
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| typed_email.to_string()),
            name: response
                .nombre
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Usuario".to_string()),
        }
    }
}

/// Whether `session` may open `page`
pub fn can_access(session: Option<&Session>, page: Page) -> bool {
    if !page.requires_admin() {
        return true;
    }
    session.is_some_and(|s| s.role.is_admin())
}
