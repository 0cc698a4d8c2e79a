use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{validate_jwt, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Validates the Supabase access token and injects the caller as `AuthUser`
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), &state.config.supabase.jwt_secret)
        .map_err(ApiError::unauthorized)?;

    debug!("Authenticated request from {}", user.user_id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Admin gate; runs after `jwt_auth_middleware`. The profile is only read when the
/// allowlists don't already answer, and a failed lookup denies.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !state.admin.is_allowlisted(&user) {
        let profile = state.profiles.get(user.user_id).await.map_err(|e| {
            warn!("Admin profile lookup failed for {}: {}", user.user_id, e);
            ApiError::forbidden("Unauthorized: Admin access required")
        })?;
        if !state.admin.is_admin(&user, profile.as_ref()) {
            warn!(
                "Admin access denied for user {} ({:?} / {:?})",
                user.user_id, user.email, user.metadata_email
            );
            return Err(ApiError::forbidden("Unauthorized: Admin access required"));
        }
    }

    Ok(next.run(request).await)
}

/// Caller identity from the Authorization header
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, String> {
    let token = extract_jwt_from_headers(headers)?;
    validate_jwt(&token, secret)
        .map(AuthUser::from)
        .map_err(|e| e.to_string())
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
