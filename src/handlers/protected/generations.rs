use axum::{
    extract::{Extension, Path, Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::generation::realtime::{ChangeKind, GenerationChange};
use crate::generation::{submit_generation, SubmitRequest};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/generations - charge for, record and submit one generation
pub async fn generation_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = submit_generation(&state, &user, request).await?;
    Ok((outcome.status(), Json(outcome.to_json())))
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub tool_type: Option<String>,
}

/// GET /api/generations/stream - server-sent row changes for the caller, optionally one tool
pub async fn generation_stream(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(100);
    let mut changes = state.realtime.subscribe();
    let tool_type = query.tool_type.filter(|t| !t.is_empty());

    info!(
        "Realtime subscription opened for {} (tool_type={:?})",
        user.user_id, tool_type
    );

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                // receiver gone means the client disconnected
                _ = tx.closed() => break,
                received = changes.recv() => received,
            };
            let change = match received {
                Ok(change) => change,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Realtime subscriber {} lagged, skipped {} changes", user.user_id, skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !change.matches(user.user_id, tool_type.as_deref()) {
                continue;
            }
            let Some(event) = change_event(&change) else {
                continue;
            };
            if tx.send(Ok(event)).await.is_err() {
                break;
            }
        }
        debug!("Realtime subscription closed for {}", user.user_id);
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn change_event(change: &GenerationChange) -> Option<Event> {
    let name = match change.event_type {
        ChangeKind::Insert => "INSERT",
        ChangeKind::Update => "UPDATE",
        ChangeKind::Delete => "DELETE",
    };
    match serde_json::to_string(change) {
        Ok(data) => Some(Event::default().event(name).data(data)),
        Err(e) => {
            warn!("Failed to serialize generation change: {}", e);
            None
        }
    }
}

/// DELETE /api/generations/:id - soft delete; the row disappears from every list
pub async fn generation_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let row = state
        .generations
        .get(id, user.user_id)
        .await?
        .filter(|g| g.deleted_at.is_none())
        .ok_or_else(|| ApiError::not_found("Generation not found"))?;

    state.generations.soft_delete(id, user.user_id).await?;
    state.realtime.publish(GenerationChange::delete(row));
    info!("Generation {} deleted by {}", id, user.user_id);

    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
