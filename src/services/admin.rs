use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::utils::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

/// Authenticated identity handed to the admin gate. The override capability
/// can only be granted in code by trusted callers; it is never parsed from a
/// request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub email: Option<String>,
    pub roles: Vec<String>,
    admin_override: bool,
}

impl Session {
    pub fn new(email: Option<String>, roles: Vec<String>) -> Self {
        Self {
            email,
            roles,
            admin_override: false,
        }
    }

    /// A session that passes the admin gate unconditionally, for local
    /// tooling and tests.
    pub fn with_override() -> Self {
        Self {
            email: None,
            roles: Vec::new(),
            admin_override: true,
        }
    }
}

/// Coarse binary authorization check for administrative views. Performs no
/// writes and never fails: an absent or malformed session is simply not an
/// administrator.
#[derive(Debug, Clone)]
pub struct AdminGate {
    admin_email: Option<String>,
}

impl AdminGate {
    pub fn new(admin_email: Option<String>) -> Self {
        Self { admin_email }
    }

    pub fn is_admin(&self, session: Option<&Session>) -> bool {
        let Some(session) = session else {
            return false;
        };
        if session.admin_override {
            return true;
        }
        if session.roles.iter().any(|role| role == ADMIN_ROLE) {
            return true;
        }
        match (&self.admin_email, &session.email) {
            (Some(admin), Some(email)) => admin.eq_ignore_ascii_case(email),
            _ => false,
        }
    }

    pub fn require_admin(&self, session: Option<&Session>) -> Result<(), AppError> {
        if self.is_admin(session) {
            Ok(())
        } else if session.is_none() {
            Err(AppError::AuthError("authentication required".to_string()))
        } else {
            Err(AppError::Forbidden(
                "administrator access required".to_string(),
            ))
        }
    }
}

/// Extracts the upstream auth provider's identity claims from request
/// headers. Absence of both claims means no session.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let roles: Vec<String> = parts
            .headers
            .get("x-user-roles")
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(|role| role.trim().to_string())
                    .filter(|role| !role.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if email.is_none() && roles.is_empty() {
            Ok(MaybeSession(None))
        } else {
            Ok(MaybeSession(Some(Session::new(email, roles))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new(Some("admin@example.com".to_string()))
    }

    #[test]
    fn absent_session_is_not_admin() {
        assert!(!gate().is_admin(None));
    }

    #[test]
    fn configured_email_is_admin() {
        let session = Session::new(Some("Admin@Example.com".to_string()), Vec::new());
        assert!(gate().is_admin(Some(&session)));
    }

    #[test]
    fn admin_role_claim_is_admin() {
        let session = Session::new(
            Some("someone@example.com".to_string()),
            vec!["admin".to_string()],
        );
        assert!(gate().is_admin(Some(&session)));
    }

    #[test]
    fn override_capability_is_admin() {
        assert!(gate().is_admin(Some(&Session::with_override())));
    }

    #[test]
    fn ordinary_session_is_not_admin() {
        let session = Session::new(
            Some("someone@example.com".to_string()),
            vec!["user".to_string()],
        );
        assert!(!gate().is_admin(Some(&session)));
    }

    #[test]
    fn no_admin_configured_rejects_everyone_without_claims() {
        let gate = AdminGate::new(None);
        let session = Session::new(Some("admin@example.com".to_string()), Vec::new());
        assert!(!gate.is_admin(Some(&session)));
    }

    #[test]
    fn require_admin_distinguishes_missing_from_forbidden() {
        let gate = gate();
        assert!(matches!(
            gate.require_admin(None),
            Err(AppError::AuthError(_))
        ));
        let session = Session::new(Some("someone@example.com".to_string()), Vec::new());
        assert!(matches!(
            gate.require_admin(Some(&session)),
            Err(AppError::Forbidden(_))
        ));
    }
}
