//! # Access guard
//!
//! Decides, for one protected view, whether the current session may see it.
//! The decision is a pure function of the session and the permission the view
//! requires; callers re-evaluate whenever either changes.

use crate::config::{AccessConfig, DEFAULT_SUPERUSER_ROLE};
use crate::session::Session;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated visitors lacking a permission are sent.
pub const DENIED_PATH: &str = "/dashboard";

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardDecision {
    /// Show the protected view.
    Render,
    /// No active session; go to the login page.
    RedirectToLogin,
    /// Signed in without the required permission; go to the default landing page.
    RedirectToDenied,
}

impl GuardDecision {
    /// Target path for redirects, `None` for [`GuardDecision::Render`].
    #[must_use]
    pub const fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::Render => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToDenied => Some(DENIED_PATH),
        }
    }

    /// Whether the view may be shown.
    #[must_use]
    pub const fn is_render(self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Route-level permission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    superuser_role: String,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SUPERUSER_ROLE)
    }
}

impl From<&AccessConfig> for AccessGuard {
    fn from(config: &AccessConfig) -> Self {
        Self::new(&config.superuser_role)
    }
}

impl AccessGuard {
    /// Guard whose superuser sentinel is `superuser_role` (any case).
    #[must_use]
    pub fn new(superuser_role: &str) -> Self {
        Self {
            superuser_role: superuser_role.to_lowercase(),
        }
    }

    /// Lower-cased role used for the superuser check: `role`, else the first
    /// `roles` entry, else empty.
    #[must_use]
    pub fn effective_role(session: &Session) -> String {
        session
            .user
            .as_ref()
            .and_then(|user| user.role().or_else(|| user.first_role_name()))
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Evaluate `session` against `required_permission`.
    ///
    /// An empty permission string counts as no requirement.
    #[must_use]
    pub fn evaluate(&self, session: &Session, required_permission: Option<&str>) -> GuardDecision {
        if !session.is_authenticated {
            return GuardDecision::RedirectToLogin;
        }
        if Self::effective_role(session) == self.superuser_role {
            return GuardDecision::Render;
        }
        let Some(permission) = required_permission.filter(|permission| !permission.is_empty())
        else {
            return GuardDecision::Render;
        };
        match &session.user {
            Some(user) if user.has_permission(permission) => GuardDecision::Render,
            _ => GuardDecision::RedirectToDenied,
        }
    }

    /// Shorthand for `evaluate(..).is_render()`.
    #[must_use]
    pub fn allows(&self, session: &Session, required_permission: Option<&str>) -> bool {
        self.evaluate(session, required_permission).is_render()
    }
}
