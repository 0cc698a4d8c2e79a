//! Route guarding for the client session: `loading → {authenticated, anonymous}`, ban gating
//! and admin gating, plus the navigation side effects of auth events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::AuthUser;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Authenticated(AuthUser),
    Anonymous,
}

/// Result of looking up the caller's ban flag
#[derive(Debug, Clone, PartialEq)]
pub enum BanCheck {
    Pending,
    Clear,
    Banned {
        reason: Option<String>,
        banned_at: Option<DateTime<Utc>>,
    },
    /// Lookup failed; access is allowed
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Wait,
    Allow,
    Redirect { to: String },
    Banned {
        reason: Option<String>,
        banned_at: Option<DateTime<Utc>>,
    },
}

impl GuardDecision {
    fn redirect(to: &str) -> Self {
        GuardDecision::Redirect { to: to.to_string() }
    }
}

pub fn guard_protected(session: &SessionState, ban: &BanCheck) -> GuardDecision {
    match session {
        SessionState::Loading => GuardDecision::Wait,
        SessionState::Anonymous => GuardDecision::redirect("/login"),
        SessionState::Authenticated(_) => match ban {
            BanCheck::Pending => GuardDecision::Wait,
            BanCheck::Banned { reason, banned_at } => GuardDecision::Banned {
                reason: reason.clone(),
                banned_at: *banned_at,
            },
            BanCheck::Clear | BanCheck::Unavailable => GuardDecision::Allow,
        },
    }
}

pub fn guard_admin(session: &SessionState, is_admin: bool) -> GuardDecision {
    match session {
        SessionState::Loading => GuardDecision::Wait,
        SessionState::Anonymous => GuardDecision::redirect("/login"),
        SessionState::Authenticated(_) if !is_admin => GuardDecision::redirect("/dashboard"),
        SessionState::Authenticated(_) => GuardDecision::Allow,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl FromStr for AuthEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL_SESSION" => Ok(AuthEvent::InitialSession),
            "SIGNED_IN" => Ok(AuthEvent::SignedIn),
            "SIGNED_OUT" => Ok(AuthEvent::SignedOut),
            "TOKEN_REFRESHED" => Ok(AuthEvent::TokenRefreshed),
            "USER_UPDATED" => Ok(AuthEvent::UserUpdated),
            "PASSWORD_RECOVERY" => Ok(AuthEvent::PasswordRecovery),
            other => Err(format!("unknown auth event '{}'", other)),
        }
    }
}

/// Where the client goes after an auth event, if anywhere
pub fn navigation_for(event: AuthEvent) -> Option<&'static str> {
    match event {
        AuthEvent::SignedIn => Some("/dashboard"),
        AuthEvent::SignedOut => Some("/"),
        _ => None,
    }
}

/// Drop the fragment of an OAuth callback URL when it carries tokens; other URLs pass through
pub fn strip_oauth_hash(url: &str) -> String {
    match url.split_once('#') {
        Some((base, fragment)) if fragment.contains("access_token") => base.to_string(),
        _ => url.to_string(),
    }
}
