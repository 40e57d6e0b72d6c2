use crate::session::{AdminIdentity, AuthSession, SessionError};

/// Decision for a protected dashboard route.
#[derive(Debug, Clone)]
pub enum RouteGuard {
    Allow(AdminIdentity),
    RedirectToLogin,
}

impl RouteGuard {
    /// Evaluate the guard against the session's current state. Call after
    /// [`AuthSession::initialize`] has resolved; an uninitialized session
    /// simply redirects to login.
    pub fn evaluate(session: &AuthSession) -> Self {
        match session.current_identity() {
            Some(identity) => Self::Allow(identity),
            None => Self::RedirectToLogin,
        }
    }

    /// Like [`evaluate`](Self::evaluate), but resolves the session state
    /// first — this is what route handlers call on a fresh page load.
    pub async fn resolve(session: &AuthSession) -> Result<Self, SessionError> {
        if session.current_identity().is_none() {
            session.initialize().await?;
        }
        Ok(Self::evaluate(session))
    }

    /// Guard that additionally requires a permission, for super-admin-only
    /// routes. A logged-in admin lacking it still redirects — the dashboard
    /// has nothing partial to show them there.
    pub fn evaluate_with_permission(session: &AuthSession, permission: &str) -> Self {
        match session.current_identity() {
            Some(identity) if identity.has_permission(permission) => Self::Allow(identity),
            _ => Self::RedirectToLogin,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}
