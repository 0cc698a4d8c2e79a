use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::models::{PresetLora, PresetLoraInput};
use crate::error::ApiError;
use crate::generation::EdgeResponse;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

fn validated(input: PresetLoraInput) -> Result<PresetLoraInput, ApiError> {
    input.validate().map_err(ApiError::bad_request)?;
    Ok(input)
}

/// GET /api/admin/loras - every preset, active or not
pub async fn lora_list_all(State(state): State<AppState>) -> ApiResult<Vec<PresetLora>> {
    Ok(ApiResponse::success(state.loras.list().await?))
}

/// POST /api/admin/loras
pub async fn lora_create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(input): Json<PresetLoraInput>,
) -> ApiResult<PresetLora> {
    let created = state.loras.create(validated(input)?).await?;
    info!("LoRA preset {} created by {}", created.id, admin.user_id);
    Ok(ApiResponse::created(created))
}

/// PUT /api/admin/loras/:id - full replacement
pub async fn lora_update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<PresetLoraInput>,
) -> ApiResult<PresetLora> {
    let updated = state.loras.update(id, validated(input)?).await?;
    info!("LoRA preset {} updated by {}", id, admin.user_id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/loras/:id
pub async fn lora_delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    state.loras.delete(id).await?;
    info!("LoRA preset {} deleted by {}", id, admin.user_id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// `{operation, data}` body of the admin-lora-operations function
#[derive(Debug, Deserialize)]
pub struct LoraOperation {
    pub operation: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct TargetId {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct Toggle {
    id: Uuid,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct Update {
    id: Uuid,
    #[serde(flatten)]
    input: PresetLoraInput,
}

/// POST /functions/v1/admin-lora-operations - list/create/update/delete/toggle in one call
pub async fn lora_operations(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<LoraOperation>,
) -> EdgeResponse {
    info!("LoRA operation '{}' by admin {}", request.operation, admin.user_id);
    match run_operation(&state, &request).await {
        Ok(data) => EdgeResponse::ok(json!({ "success": true, "data": data })),
        Err(e) => {
            warn!("LoRA operation '{}' failed: {}", request.operation, e);
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            EdgeResponse::error(status, json!({ "success": false, "error": e.message() }))
        }
    }
}

async fn run_operation(state: &AppState, request: &LoraOperation) -> Result<Value, ApiError> {
    let data = request.data.clone();
    let result = match request.operation.as_str() {
        "list" => json!(state.loras.list().await?),
        "create" => {
            let input: PresetLoraInput = serde_json::from_value(data)?;
            json!(state.loras.create(validated(input)?).await?)
        }
        "update" => {
            let Update { id, input } = serde_json::from_value(data)?;
            json!(state.loras.update(id, validated(input)?).await?)
        }
        "delete" => {
            let TargetId { id } = serde_json::from_value(data)?;
            state.loras.delete(id).await?;
            json!({ "id": id, "deleted": true })
        }
        "toggle" => {
            let Toggle { id, is_active } = serde_json::from_value(data)?;
            json!(state.loras.set_active(id, is_active).await?)
        }
        other => {
            return Err(ApiError::bad_request(format!("Unknown LoRA operation: {}", other)));
        }
    };
    Ok(result)
}
