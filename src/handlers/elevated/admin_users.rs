use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::models::BanStatus;
use crate::database::DatabaseError;
use crate::generation::EdgeResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub ban_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BanAction {
    Ban,
    Unban,
}

impl BanRequest {
    fn validate(&self) -> Result<(Uuid, BanAction, Option<String>), String> {
        let raw = self
            .user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "User ID is required".to_string())?;
        let user_id = Uuid::parse_str(raw).map_err(|_| format!("Invalid user ID: {}", raw))?;

        let action = match self.action.as_deref() {
            Some("ban") => BanAction::Ban,
            Some("unban") => BanAction::Unban,
            _ => return Err("Action must be \"ban\" or \"unban\"".to_string()),
        };

        let reason = self
            .ban_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        if action == BanAction::Ban && reason.is_none() {
            return Err("Ban reason is required".to_string());
        }
        Ok((user_id, action, reason))
    }
}

/// POST /functions/v1/admin-ban-user - ban or unban a user through the database functions
pub async fn ban_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<BanRequest>,
) -> EdgeResponse {
    let (target, action, reason) = match request.validate() {
        Ok(valid) => valid,
        Err(message) => return failure(StatusCode::BAD_REQUEST, message),
    };

    info!(
        "Admin {:?} request: admin={} target={} reason={}",
        action,
        admin.user_id,
        target,
        reason.as_deref().unwrap_or("N/A")
    );

    let (outcome, result) = match (action, reason) {
        (BanAction::Ban, Some(reason)) => (
            state.profiles.ban(target, &reason, admin.user_id).await,
            json!({"action": "banned", "reason": reason}),
        ),
        _ => (
            state.profiles.unban(target, admin.user_id).await,
            json!({"action": "unbanned"}),
        ),
    };

    let verb = match action {
        BanAction::Ban => "banned",
        BanAction::Unban => "unbanned",
    };

    match outcome {
        Ok(profile) => {
            info!("User {} {} by admin {}", target, verb, admin.user_id);
            EdgeResponse::ok(json!({
                "success": true,
                "message": format!("User {} successfully", verb),
                "user": BanStatus::from(&profile),
                "result": result,
                "timestamp": Utc::now(),
            }))
        }
        Err(DatabaseError::NotFound(message)) => failure(StatusCode::NOT_FOUND, message),
        Err(e) => {
            error!("Error updating ban status for {}: {}", target, e);
            let action = if action == BanAction::Ban { "ban" } else { "unban" };
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {} user", action),
            )
        }
    }
}

fn failure(status: StatusCode, message: String) -> EdgeResponse {
    EdgeResponse::error(status, json!({"success": false, "error": message}))
}
