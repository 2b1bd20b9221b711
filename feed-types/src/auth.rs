//! Authentication payloads for `POST /auth/login`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials sent to the server.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login id of the subject.
    pub id: String,
    /// Plain password, sent once over the login call only.
    pub password: String,
}

impl LoginRequest {
    /// Create a login request.
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }
}

// Intentionally opaque debug to avoid logging passwords
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response.
///
/// The server uses the same shape for success (`token`, `id`, `roles`)
/// and for rejection (`error` only, with status 401).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token on success.
    #[serde(default)]
    pub token: Option<String>,
    /// Subject id on success.
    #[serde(default)]
    pub id: Option<String>,
    /// Role names on success, without any `ROLE_` prefix.
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    /// Rejection reason.
    #[serde(default)]
    pub error: Option<String>,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("id", &self.id)
            .field("roles", &self.roles)
            .field("error", &self.error)
            .finish()
    }
}
