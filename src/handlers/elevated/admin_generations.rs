use std::collections::HashMap;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::models::{Generation, Profile};
use crate::database::DatabaseError;
use crate::generation::EdgeResponse;
use crate::state::AppState;

const RECENT_DEFAULT: i64 = 64;
const RECENT_MAX: i64 = 500;

#[derive(Debug, Serialize)]
struct UserSummary {
    #[serde(flatten)]
    profile: Profile,
    generation_count: i64,
}

#[derive(Debug, Serialize)]
struct OwnedGeneration {
    #[serde(flatten)]
    generation: Generation,
    user_email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGenerationRequest {
    pub user_id: Option<String>,
    pub generation_id: Option<String>,
    pub showcased: Option<bool>,
    pub limit: Option<i64>,
}

fn failure(status: StatusCode, message: impl Into<String>) -> EdgeResponse {
    EdgeResponse::error(status, json!({"success": false, "error": message.into()}))
}

fn required_id(raw: Option<&str>, label: &str) -> Result<Uuid, EdgeResponse> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, format!("{} ID is required", label)))?;
    Uuid::parse_str(raw)
        .map_err(|_| failure(StatusCode::BAD_REQUEST, format!("Invalid {} ID: {}", label.to_lowercase(), raw)))
}

fn database_failure(context: &str, err: DatabaseError) -> EdgeResponse {
    match err {
        DatabaseError::NotFound(message) => failure(StatusCode::NOT_FOUND, message),
        other => {
            error!("{}: {}", context, other);
            failure(StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

/// POST /functions/v1/admin-get-users - every profile with its generation count, busiest first
pub async fn admin_get_users(State(state): State<AppState>) -> EdgeResponse {
    let profiles = match state.profiles.list_all().await {
        Ok(profiles) => profiles,
        Err(e) => return database_failure("Failed to fetch users", e),
    };
    let counts = match state.generations.count_by_user().await {
        Ok(counts) => counts,
        Err(e) => {
            warn!("Generation counts unavailable: {}", e);
            HashMap::new()
        }
    };

    let mut users: Vec<UserSummary> = profiles
        .into_iter()
        .map(|profile| UserSummary {
            generation_count: counts.get(&profile.id).copied().unwrap_or(0),
            profile,
        })
        .collect();
    // stable, so ties keep the newest-account-first order
    users.sort_by(|a, b| b.generation_count.cmp(&a.generation_count));

    EdgeResponse::ok(json!({
        "success": true,
        "count": users.len(),
        "users": users,
    }))
}

/// POST /functions/v1/admin-get-user-generations - one user's full history, soft-deleted rows included
pub async fn admin_get_user_generations(
    State(state): State<AppState>,
    Json(request): Json<AdminGenerationRequest>,
) -> EdgeResponse {
    let user_id = match required_id(request.user_id.as_deref(), "User") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let generations = match state.generations.list_user_all(user_id).await {
        Ok(rows) => rows,
        Err(e) => return database_failure("Failed to fetch generations", e),
    };
    let soft_deleted = generations.iter().filter(|g| g.deleted_at.is_some()).count();

    EdgeResponse::ok(json!({
        "success": true,
        "count": generations.len(),
        "activeCount": generations.len() - soft_deleted,
        "softDeletedCount": soft_deleted,
        "userId": user_id,
        "generations": generations,
    }))
}

/// POST /functions/v1/admin-get-recent-generations - newest rows across all users with owner email
pub async fn admin_get_recent_generations(
    State(state): State<AppState>,
    request: Option<Json<AdminGenerationRequest>>,
) -> EdgeResponse {
    let limit = request
        .and_then(|Json(r)| r.limit)
        .unwrap_or(RECENT_DEFAULT)
        .clamp(1, RECENT_MAX);

    let rows = match state.generations.list_recent(limit).await {
        Ok(rows) => rows,
        Err(e) => return database_failure("Failed to fetch generations", e),
    };

    let mut emails: HashMap<Uuid, String> = HashMap::new();
    for row in &rows {
        if emails.contains_key(&row.user_id) {
            continue;
        }
        let email = match state.profiles.get(row.user_id).await {
            Ok(Some(profile)) => profile.email,
            Ok(None) => None,
            Err(e) => {
                warn!("Owner lookup failed for {}: {}", row.user_id, e);
                None
            }
        };
        emails.insert(row.user_id, email.unwrap_or_else(|| "Unknown".to_string()));
    }

    let generations: Vec<OwnedGeneration> = rows
        .into_iter()
        .map(|generation| OwnedGeneration {
            user_email: emails.get(&generation.user_id).cloned().unwrap_or_default(),
            generation,
        })
        .collect();

    EdgeResponse::ok(json!({
        "success": true,
        "count": generations.len(),
        "generations": generations,
    }))
}

/// POST /functions/v1/admin-toggle-showcase - add a generation to, or remove it from, the public showcase
pub async fn admin_toggle_showcase(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<AdminGenerationRequest>,
) -> EdgeResponse {
    let id = match required_id(request.generation_id.as_deref(), "Generation") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let showcased = request.showcased.unwrap_or(false);

    match state.generations.set_showcased(id, showcased).await {
        Ok(row) => {
            info!("Admin {} set showcased={} on {}", admin.user_id, showcased, id);
            EdgeResponse::ok(json!({
                "success": true,
                "generation": {
                    "id": row.id,
                    "showcased": row.showcased,
                    "user_id": row.user_id,
                    "generation_name": row.generation_name,
                },
                "message": if showcased { "Added to showcase" } else { "Removed from showcase" },
            }))
        }
        Err(e) => database_failure("Failed to update showcase status", e),
    }
}

/// POST /functions/v1/admin-permanent-delete - remove a generation row for good
pub async fn admin_permanent_delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<AdminGenerationRequest>,
) -> EdgeResponse {
    let id = match required_id(request.generation_id.as_deref(), "Generation") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.generations.purge(id).await {
        Ok(()) => {
            info!("Admin {} permanently deleted generation {}", admin.user_id, id);
            EdgeResponse::ok(json!({
                "success": true,
                "message": "Generation permanently deleted",
                "generation_id": id,
            }))
        }
        Err(e) => database_failure("Failed to delete generation", e),
    }
}
