//! Session state and response classification.
//!
//! [`SessionState`] is the in-memory form of the persisted login: an opaque
//! bearer credential, the subject id and its roles. The client owns exactly
//! one of these per process and exposes it only through its session guard.

use std::collections::BTreeSet;
use std::fmt;

use feed_types::LoginResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Session errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Login response carried no token.
    #[error("login response carried no token")]
    MissingToken,

    /// Login response carried no subject id.
    #[error("login response carried no subject id")]
    MissingSubject,
}

/// An opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Intentionally opaque debug to avoid logging secrets
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

/// Normalize a role name: trimmed, upper case, without a `ROLE_` prefix.
fn normalize_role(role: &str) -> String {
    let role = role.trim().to_ascii_uppercase();
    match role.strip_prefix("ROLE_") {
        Some(stripped) => stripped.to_string(),
        None => role,
    }
}

/// Process-wide login state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    credential: Option<Credential>,
    #[serde(default)]
    subject_id: Option<String>,
    #[serde(default)]
    roles: BTreeSet<String>,
}

impl SessionState {
    /// An empty, unauthenticated session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session.
    pub fn authenticated<I, S>(credential: Credential, subject_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            credential: Some(credential),
            subject_id: Some(subject_id.into()),
            roles: roles.into_iter().map(|r| normalize_role(r.as_ref())).collect(),
        }
    }

    /// Build a session from a successful login response.
    pub fn from_login(response: LoginResponse) -> Result<Self, SessionError> {
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;
        let subject = response
            .id
            .filter(|id| !id.is_empty())
            .ok_or(SessionError::MissingSubject)?;
        Ok(Self::authenticated(
            Credential::new(token),
            subject,
            response.roles.unwrap_or_default(),
        ))
    }

    /// The bearer credential, if logged in.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The subject id, if logged in.
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    /// The role set.
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Check whether the subject holds a role. Accepts `ADMIN` or `ROLE_ADMIN`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&normalize_role(role))
    }

    /// Check whether a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Clear everything. The previous credential is zeroized when dropped.
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

/// How a response status affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx.
    Success,
    /// 401: the session is no longer valid.
    Unauthorized,
    /// 403: the session is valid but this action is not allowed.
    Forbidden,
    /// 404.
    NotFound,
    /// Any other failure status.
    ServerError(u16),
}

/// Classify an HTTP status.
pub fn classify_status(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Success,
        401 => ResponseClass::Unauthorized,
        403 => ResponseClass::Forbidden,
        404 => ResponseClass::NotFound,
        other => ResponseClass::ServerError(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionState {
        SessionState::authenticated(Credential::new("tok"), "admin", ["ADMIN", "USER"])
    }

    #[test]
    fn anonymous_has_nothing() {
        let session = SessionState::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.credential().is_none());
        assert!(session.subject_id().is_none());
        assert!(!session.has_role("USER"));
    }

    #[test]
    fn has_role_normalizes() {
        let session = admin();
        assert!(session.has_role("ADMIN"));
        assert!(session.has_role("ROLE_ADMIN"));
        assert!(session.has_role("admin"));
        assert!(!session.has_role("OWNER"));
    }

    #[test]
    fn roles_from_server_are_stored_normalized() {
        let session =
            SessionState::authenticated(Credential::new("t"), "u", ["ROLE_USER", " user "]);
        assert_eq!(session.roles().len(), 1);
        assert!(session.roles().contains("USER"));
    }

    #[test]
    fn clear_resets_wholesale() {
        let mut session = admin();
        session.clear();
        assert_eq!(session, SessionState::anonymous());
    }

    #[test]
    fn from_login_success() {
        let session = SessionState::from_login(LoginResponse {
            token: Some("jwt".into()),
            id: Some("admin".into()),
            roles: Some(vec!["ADMIN".into()]),
            error: None,
        })
        .unwrap();
        assert_eq!(session.credential().unwrap().expose(), "jwt");
        assert_eq!(session.subject_id(), Some("admin"));
        assert!(session.has_role("ADMIN"));
    }

    #[test]
    fn from_login_without_token_fails() {
        let result = SessionState::from_login(LoginResponse {
            error: Some("Invalid credentials".into()),
            ..Default::default()
        });
        assert_eq!(result, Err(SessionError::MissingToken));
    }

    #[test]
    fn from_login_without_subject_fails() {
        let result = SessionState::from_login(LoginResponse {
            token: Some("jwt".into()),
            ..Default::default()
        });
        assert_eq!(result, Err(SessionError::MissingSubject));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let debug = format!("{:?}", admin());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("tok\""));
    }

    #[test]
    fn session_json_roundtrip() {
        let json = serde_json::to_string(&admin()).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, admin());
    }

    #[test]
    fn empty_document_is_anonymous() {
        let session: SessionState = serde_json::from_str("{}").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(201), ResponseClass::Success);
        assert_eq!(classify_status(401), ResponseClass::Unauthorized);
        assert_eq!(classify_status(403), ResponseClass::Forbidden);
        assert_eq!(classify_status(404), ResponseClass::NotFound);
        assert_eq!(classify_status(500), ResponseClass::ServerError(500));
        assert_eq!(classify_status(400), ResponseClass::ServerError(400));
    }
}
