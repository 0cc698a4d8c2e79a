use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::routes::{resolve, RouteAccess};
use crate::auth::session::{guard_admin, guard_protected, BanCheck, GuardDecision, SessionState};
use crate::auth::AuthUser;
use crate::middleware::{authenticate, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GuardQuery {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuardResult {
    pub path: String,
    pub pattern: &'static str,
    pub access: RouteAccess,
    #[serde(flatten)]
    pub decision: GuardDecision,
}

/// GET /api/routes/guard?path= - what the client router should do with a navigation
pub async fn route_guard(
    State(state): State<AppState>,
    Query(query): Query<GuardQuery>,
    headers: HeaderMap,
) -> ApiResult<GuardResult> {
    let path = query.path.unwrap_or_else(|| "/".to_string());
    let (route, known) = resolve(&path);

    // a missing or invalid token is just an anonymous session here
    let session = match authenticate(&headers, &state.config.supabase.jwt_secret) {
        Ok(user) => SessionState::Authenticated(user),
        Err(reason) => {
            debug!("Guard request without a valid session: {}", reason);
            SessionState::Anonymous
        }
    };

    let decision = if !known {
        GuardDecision::Redirect { to: "/".to_string() }
    } else {
        match route.access {
            RouteAccess::Public => GuardDecision::Allow,
            RouteAccess::Protected => {
                let ban = match &session {
                    SessionState::Authenticated(user) => ban_check(&state, user).await,
                    _ => BanCheck::Pending,
                };
                guard_protected(&session, &ban)
            }
            RouteAccess::Admin => {
                let is_admin = match &session {
                    SessionState::Authenticated(user) => is_admin(&state, user).await,
                    _ => false,
                };
                guard_admin(&session, is_admin)
            }
        }
    };

    Ok(ApiResponse::success(GuardResult {
        path,
        pattern: route.pattern,
        access: route.access,
        decision,
    }))
}

/// Ban lookups fail open
async fn ban_check(state: &AppState, user: &AuthUser) -> BanCheck {
    match state.profiles.get(user.user_id).await {
        Ok(Some(profile)) if profile.banned => BanCheck::Banned {
            reason: profile.ban_reason,
            banned_at: profile.banned_at,
        },
        Ok(_) => BanCheck::Clear,
        Err(e) => {
            warn!("Ban check failed for {}, allowing access: {}", user.user_id, e);
            BanCheck::Unavailable
        }
    }
}

async fn is_admin(state: &AppState, user: &AuthUser) -> bool {
    if state.admin.is_allowlisted(user) {
        return true;
    }
    match state.profiles.get(user.user_id).await {
        Ok(profile) => state.admin.is_admin(user, profile.as_ref()),
        Err(e) => {
            warn!("Admin lookup failed for {}: {}", user.user_id, e);
            false
        }
    }
}
