use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use super::catalogue::find_tool;
use super::realtime::GenerationChange;
use super::submit::{dispatch_function, has_handler, validate_input, EdgeResponse};
use crate::auth::AuthUser;
use crate::database::models::{Generation, GenerationStatus, GenerationUpdate, NewGeneration};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub tool_type: String,
    #[serde(default)]
    pub generation_name: Option<String>,
    #[serde(default = "empty_object")]
    pub input_data: Value,
    /// Explicit price for usage-billed tools; never below the catalogue price
    #[serde(default)]
    pub token_cost: Option<i32>,
}

fn empty_object() -> Value {
    json!({})
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub generation: Generation,
    pub tokens_remaining: i64,
    pub submission: EdgeResponse,
}

impl SubmitOutcome {
    /// HTTP status relayed from the submit handler
    pub fn status(&self) -> StatusCode {
        self.submission.status
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": self.submission.is_success(),
            "generation": self.generation,
            "tokens_remaining": self.tokens_remaining,
            "submission": self.submission.body,
        });
        for key in ["error", "nsfw_details"] {
            if let Some(value) = self.submission.body.get(key) {
                body[key] = value.clone();
            }
        }
        body
    }
}

fn price(base: i32, requested: Option<i32>) -> Result<i32, ApiError> {
    match requested {
        None => Ok(base),
        Some(cost) if cost >= base => Ok(cost),
        Some(cost) => Err(ApiError::field_error(
            "token_cost",
            format!("Token cost {} is below the tool's base cost of {}", cost, base),
        )),
    }
}

/// Charge for and start one generation. Everything that can be rejected without side
/// effects is checked before the row is inserted; once tokens are deducted they are not
/// refunded, whatever the upstream outcome.
pub async fn submit_generation(
    state: &AppState,
    user: &AuthUser,
    request: SubmitRequest,
) -> Result<SubmitOutcome, ApiError> {
    let tool = find_tool(&request.tool_type)
        .ok_or_else(|| ApiError::field_error("tool_type", "Invalid tool type"))?;
    let function = tool
        .function
        .filter(|f| has_handler(f))
        .ok_or_else(|| ApiError::bad_request(format!("{} has no submit handler", tool.name)))?;

    let input = match request.input_data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(ApiError::field_error("input_data", "input_data must be an object")),
    };

    validate_input(function, &Value::Object(input.clone())).map_err(ApiError::bad_request)?;

    let cost = price(tool.tokens_required.base(), request.token_cost)?;

    let profile = state
        .profiles
        .get(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    if profile.total_tokens() < cost as i64 {
        info!(
            "Rejected {} for {}: balance {} below cost {}",
            tool.tool_type,
            user.user_id,
            profile.total_tokens(),
            cost
        );
        return Err(ApiError::payment_required(format!(
            "Insufficient tokens. You need {} tokens but have {}.",
            cost,
            profile.total_tokens()
        )));
    }

    let generation_name = request
        .generation_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{} Generation", tool.name));

    let row = state
        .generations
        .insert(NewGeneration {
            user_id: user.user_id,
            tool_type: tool.tool_type.to_string(),
            tool_name: tool.name.to_string(),
            generation_name,
            input_data: Value::Object(input.clone()),
            tokens_used: cost,
            status: GenerationStatus::Processing,
        })
        .await?;
    state.realtime.publish(GenerationChange::insert(row.clone()));
    info!("Created generation {} ({}) for {}", row.id, tool.tool_type, user.user_id);

    let tokens_remaining = match state.profiles.deduct_tokens(user.user_id, cost).await {
        Ok(remaining) => remaining,
        Err(e) => {
            error!("Token deduction failed for generation {}: {}", row.id, e);
            let update = GenerationUpdate::failed("Failed to deduct tokens", None);
            if let Ok(failed) = state.generations.update(row.id, user.user_id, update).await {
                state.realtime.publish(GenerationChange::update(failed));
            }
            return Err(e.into());
        }
    };

    let mut body = input;
    body.insert("generationId".to_string(), json!(row.id));
    let body = Value::Object(body);

    // The submission runs as its own task so a slow provider still gets its metadata
    // recorded after the client has been answered; dropping the handle detaches it.
    let task = {
        let state = state.clone();
        let user = user.clone();
        tokio::spawn(async move { dispatch_function(&state, &user, function, &body).await })
    };

    let submission = match tokio::time::timeout(state.submit_timeout(), task).await {
        Ok(Ok(Some(response))) => response,
        Ok(Ok(None)) => EdgeResponse::error(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "error": format!("Unknown function {}", function)}),
        ),
        Ok(Err(e)) => {
            error!("Submission task for {} failed: {}", row.id, e);
            EdgeResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "error": "Submission failed", "generation_id": row.id}),
            )
        }
        Err(_) => {
            warn!("Submission of {} timed out; leaving it processing", row.id);
            EdgeResponse::ok(json!({
                "success": true,
                "status": "processing",
                "generation_id": row.id,
                "timeout_handled": true,
            }))
        }
    };

    let generation = match state.generations.get(row.id, user.user_id).await {
        Ok(Some(latest)) => latest,
        Ok(None) => row,
        Err(e) => {
            warn!("Could not reload generation {}: {}", row.id, e);
            row
        }
    };

    Ok(SubmitOutcome {
        generation,
        tokens_remaining,
        submission,
    })
}
