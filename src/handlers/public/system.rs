use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::generation::AI_TOOLS;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service description and endpoint map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "imgMotionMagic API",
            "version": version,
            "description": "Generation lifecycle, asset library and admin tooling for imgMotionMagic",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "tools": "/api/tools (public)",
                "guard": "/api/routes/guard?path= (public, optional bearer)",
                "generations": "/api/generations[/stream|/:id] (protected)",
                "assets": "/api/assets[/:id/favorite] (protected)",
                "loras": "/api/loras?tool_type= (protected)",
                "functions": "/functions/v1/:function (protected)",
                "admin": "/api/admin/*, /functions/v1/{parse-fal-documentation,admin-ban-user,admin-lora-operations,admin-get-users,admin-get-user-generations,admin-get-recent-generations,admin-toggle-showcase,admin-permanent-delete} (admin)",
            }
        }
    }))
}

/// GET /health - liveness plus a database ping when a pool is configured
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "not configured",
                    "realtime_subscribers": state.realtime.subscriber_count(),
                }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "realtime_subscribers": state.realtime.subscriber_count(),
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// GET /api/tools - the generation catalogue
pub async fn tools() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!(AI_TOOLS)))
}
