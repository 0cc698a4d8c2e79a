//! Edge-function submit handlers. Each takes `{generationId, ...toolParams}` for a row the
//! lifecycle already created, queues the job upstream and records where it went. Response
//! bodies keep the shapes clients of the edge functions expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::realtime::GenerationChange;
use crate::auth::AuthUser;
use crate::database::models::{GenerationStatus, GenerationUpdate};
use crate::database::DatabaseError;
use crate::providers::fal_tools::ToolInput;
use crate::providers::railway::{estimated_time, SceneRequest};
use crate::providers::{
    find_fal_tool, is_nsfw_error, parse_nsfw_error, supabase_function_url, FalToolSpec, ProviderError,
};
use crate::state::AppState;

pub const SCENE_FUNCTION: &str = "ai-scene-gen";

/// Status plus raw JSON body, passed through to the client untouched
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl EdgeResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn error(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.body.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn timed_out(&self) -> bool {
        self.body.get("timeout_handled").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl IntoResponse for EdgeResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Whether this service has a submit handler for `function`
pub fn has_handler(function: &str) -> bool {
    function == SCENE_FUNCTION || find_fal_tool(function).is_some()
}

/// Reject input the handler for `function` would refuse, before anything is charged
pub fn validate_input(function: &str, input: &Value) -> Result<(), String> {
    if function == SCENE_FUNCTION {
        let request: SceneRequest =
            serde_json::from_value(input.clone()).map_err(|e| format!("Invalid request body: {}", e))?;
        return request.validate_scene();
    }
    match find_fal_tool(function) {
        Some(spec) => (spec.build_params)(&ToolInput(input)).map(|_| ()),
        None => Ok(()),
    }
}

/// Route a submit body to its handler; `None` when the function is not served here
pub async fn dispatch_function(
    state: &AppState,
    user: &AuthUser,
    function: &str,
    body: &Value,
) -> Option<EdgeResponse> {
    if function == SCENE_FUNCTION {
        return Some(submit_scene(state, user, body).await);
    }
    let spec = find_fal_tool(function)?;
    Some(submit_fal(state, user, spec, body).await)
}

fn generation_id(body: &Value) -> Result<Uuid, String> {
    let raw = body
        .get("generationId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Generation ID is required".to_string())?;
    Uuid::parse_str(raw).map_err(|_| format!("Invalid generation ID: {}", raw))
}

fn with_nsfw_details(mut body: Value, message: &str) -> Value {
    if is_nsfw_error(message) {
        body["nsfw_details"] = json!(parse_nsfw_error(message));
    }
    body
}

/// Mark a row failed and echo the change; a failure here is logged, never surfaced
async fn mark_failed(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
    message: &str,
    metadata: Option<Value>,
) {
    match state
        .generations
        .update(id, user.user_id, GenerationUpdate::failed(message, metadata))
        .await
    {
        Ok(row) => state.realtime.publish(GenerationChange::update(row)),
        Err(e) => error!("Failed to mark generation {} as failed: {}", id, e),
    }
}

async fn record_metadata(state: &AppState, id: Uuid, user: &AuthUser, metadata: Value) {
    match state
        .generations
        .update(id, user.user_id, GenerationUpdate::metadata(metadata))
        .await
    {
        Ok(row) => state.realtime.publish(GenerationChange::update(row)),
        Err(e) => error!("Error updating generation {} with submission metadata: {}", id, e),
    }
}

/// Move the row to processing. `Err` is the response to return.
async fn start_processing(state: &AppState, id: Uuid, user: &AuthUser) -> Result<(), EdgeResponse> {
    match state
        .generations
        .update(id, user.user_id, GenerationUpdate::status(GenerationStatus::Processing))
        .await
    {
        Ok(row) => {
            state.realtime.publish(GenerationChange::update(row));
            Ok(())
        }
        Err(DatabaseError::NotFound(_)) => Err(EdgeResponse::error(
            StatusCode::NOT_FOUND,
            json!({"success": false, "error": "Generation not found", "generation_id": id}),
        )),
        Err(e) => {
            error!("Error updating generation status: {}", e);
            Err(EdgeResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "error": "Failed to update generation status", "generation_id": id}),
            ))
        }
    }
}

/// Queue a job on FAL for one of the tools in `FAL_TOOLS`
pub async fn submit_fal(state: &AppState, user: &AuthUser, spec: &FalToolSpec, body: &Value) -> EdgeResponse {
    let id = match generation_id(body) {
        Ok(id) => id,
        Err(message) => {
            return EdgeResponse::error(StatusCode::BAD_REQUEST, json!({"success": false, "error": message}))
        }
    };

    let params = match (spec.build_params)(&ToolInput(body)) {
        Ok(params) => params,
        Err(message) => {
            warn!("{} rejected generation {}: {}", spec.function, id, message);
            mark_failed(state, id, user, &message, None).await;
            return EdgeResponse::error(
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": message, "generation_id": id}),
            );
        }
    };

    if let Err(response) = start_processing(state, id, user).await {
        return response;
    }

    let webhook_url = supabase_function_url(&state.config.supabase.url, "fal-webhook");
    info!("Submitting {} generation {} to FAL queue", spec.model, id);

    match state.fal.submit(spec.endpoint, &webhook_url, &params).await {
        Ok(submission) => {
            let now = Utc::now().to_rfc3339();
            let mut metadata = json!({
                "fal_request_id": submission.request_id,
                "gateway_request_id": submission.gateway_request_id,
                "processing_started": now,
                "status": "queued_at_fal",
                "model": spec.model,
                "webhook_url": webhook_url,
                "webhook_enabled": true,
                "queue_submission_time": now,
            });
            if let Some(storage_type) = spec.storage_type {
                metadata["tool_type"] = json!(storage_type);
            }
            record_metadata(state, id, user, metadata).await;

            info!("Generation {} queued at FAL as {}", id, submission.request_id);
            EdgeResponse::ok(json!({
                "success": true,
                "status": "queued",
                "generation_id": id,
                "message": spec.queued_message,
                "fal_request_id": submission.request_id,
                "estimated_time": spec.estimated_time,
            }))
        }
        Err(ProviderError::Timeout(service)) => {
            warn!("{} submission timed out for {}; job may still be queued", service, id);
            EdgeResponse::ok(json!({
                "success": true,
                "status": "processing",
                "generation_id": id,
                "message": "Request submitted but response timed out. Processing may continue.",
                "timeout_handled": true,
            }))
        }
        Err(ProviderError::Fal(info)) => {
            error!(
                "FAL rejected generation {} ({} {}): {}",
                id, info.status_code, info.error_type, info.technical_message
            );
            mark_failed(state, id, user, &info.error_message, Some(info.to_metadata(&params))).await;
            let body = json!({
                "success": false,
                "error": info.error_message,
                "generation_id": id,
                "error_type": info.error_type,
            });
            EdgeResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                with_nsfw_details(body, &info.technical_message),
            )
        }
        Err(other) => {
            let message = other.to_string();
            error!("Error in {} for {}: {}", spec.function, id, message);
            mark_failed(state, id, user, &message, None).await;
            let body = json!({"success": false, "error": message, "generation_id": id});
            EdgeResponse::error(StatusCode::INTERNAL_SERVER_ERROR, with_nsfw_details(body, &message))
        }
    }
}

/// Submit a scene job to the Railway generator
pub async fn submit_scene(state: &AppState, user: &AuthUser, body: &Value) -> EdgeResponse {
    let scene_error = |message: String| {
        EdgeResponse::error(
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "error": message,
                "details": "Check the Edge Function logs for more information",
            }),
        )
    };

    let request: SceneRequest = match serde_json::from_value(body.clone()) {
        Ok(request) => request,
        Err(e) => return scene_error(format!("Invalid request body: {}", e)),
    };
    if let Err(message) = request.validate() {
        return scene_error(message);
    }
    let id = match generation_id(body) {
        Ok(id) => id,
        Err(message) => return scene_error(message),
    };

    if let Err(response) = start_processing(state, id, user).await {
        return response;
    }

    let model = request.railway_model();
    let estimate = estimated_time(model);
    let tool_type = format!("ai-scene-{}", model);
    let webhook_url = supabase_function_url(&state.config.supabase.url, "railway-webhook");
    let params = request.to_railway_params(&webhook_url);

    info!("Submitting scene generation {} to Railway (model {})", id, model);

    match state.scenes.submit(&params).await {
        Ok(submission) => {
            let railway_id = submission.generation_id.unwrap_or_else(|| id.to_string());
            let metadata = json!({
                "railway_generation_id": railway_id,
                "processing_started": Utc::now().to_rfc3339(),
                "estimated_completion": estimate,
                "submitted_to_railway": true,
                "model_type": model,
                "model_params": params["model_params"],
                "webhook_url": webhook_url,
                "webhook_enabled": true,
                "tool_type": tool_type,
                "action_direction": request.action_direction,
                "theme": request.theme,
                "background": request.background,
                "main_subject": request.main_subject,
                "tone_and_color": request.tone_and_color,
                "scene_vision": request.scene_vision,
                "resolution": request.resolution,
                "aspect_ratio": request.aspect_ratio,
                "inference_steps": request.inference_steps,
                "safety_checker": request.safety_checker,
                "prompt_expansion": request.prompt_expansion,
                "num_chains": request.num_chains,
                "seed": request.seed,
            });
            record_metadata(state, id, user, metadata).await;

            EdgeResponse::ok(json!({
                "success": true,
                "status": "processing",
                "generation_id": id,
                "message": format!("Scene generation started successfully. Processing will take {}.", estimate),
                "railway_generation_id": railway_id,
                "model_type": model,
                "webhook_url": webhook_url,
                "estimated_completion": estimate,
            }))
        }
        Err(ProviderError::Timeout(_)) => {
            warn!("Railway submission timeout for {}, but request may still be processing", id);
            let metadata = json!({
                "submission_timeout": true,
                "processing_started": Utc::now().to_rfc3339(),
                "note": "Submission timed out but Railway may still be processing",
                "model_type": model,
                "tool_type": tool_type,
                "webhook_url": webhook_url,
            });
            record_metadata(state, id, user, metadata).await;

            EdgeResponse::ok(json!({
                "success": true,
                "status": "processing",
                "generation_id": id,
                "message": format!("Scene generation submitted. Processing will take {}.", estimate),
                "timeout_handled": true,
            }))
        }
        Err(e) => {
            let message = e.to_string();
            error!("Railway submission failed for {}: {}", id, message);
            mark_failed(state, id, user, &message, None).await;
            scene_error(message)
        }
    }
}
