use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::AuthUser;
use crate::generation::{dispatch_function, EdgeResponse};
use crate::state::AppState;

/// POST /functions/v1/:function - call a submit handler directly with `{generationId, ...}`.
/// Responses keep the edge-function shapes rather than the `/api` envelope.
pub async fn function_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(function): Path<String>,
    Json(body): Json<Value>,
) -> EdgeResponse {
    debug!("Function {} invoked by {}", function, user.user_id);
    match dispatch_function(&state, &user, &function, &body).await {
        Some(response) => response,
        None => EdgeResponse::error(
            StatusCode::NOT_FOUND,
            json!({"success": false, "error": format!("Function {} not found", function)}),
        ),
    }
}
