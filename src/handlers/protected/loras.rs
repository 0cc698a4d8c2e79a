use axum::extract::{Extension, Query, State};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::database::models::PresetLora;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoraQuery {
    pub tool_type: Option<String>,
}

/// GET /api/loras?tool_type= - active presets the caller's tier can use with a tool
pub async fn lora_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<LoraQuery>,
) -> ApiResult<Vec<PresetLora>> {
    let tool_type = query
        .tool_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::field_error("tool_type", "tool_type is required"))?;

    let profile = state.profiles.get(user.user_id).await?;
    let tier = profile.as_ref().map_or("free", |p| p.tier());

    let presets = state
        .loras
        .list_active()
        .await?
        .into_iter()
        .filter(|l| l.available_to(&tool_type, tier))
        .collect();
    Ok(ApiResponse::success(presets))
}
