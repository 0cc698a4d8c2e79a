use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::generation::EdgeResponse;
use crate::providers::openai::DocumentationRequest;
use crate::state::AppState;

/// POST /functions/v1/parse-fal-documentation - extract tool parameters with the model
pub async fn parse_fal_documentation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<DocumentationRequest>,
) -> EdgeResponse {
    if request.documentation.as_deref().map_or(true, |d| d.trim().is_empty()) {
        return failure("Documentation is required".to_string());
    }

    info!(
        "Parsing FAL.ai documentation for tool {:?} (admin {})",
        request.tool_name, user.user_id
    );

    match state.doc_parser.parse(&request).await {
        Ok(parsed) => {
            info!("Parsed {} parameters", parsed.parameters.len());
            EdgeResponse::ok(json!({
                "success": true,
                "parameters": parsed.parameters,
                "tokenCostInfo": parsed.token_cost_info,
                "processingTime": parsed.processing_time,
                "rawAnalysis": parsed.raw_analysis,
            }))
        }
        Err(e) => {
            error!("Error in parse-fal-documentation: {}", e);
            failure(e.to_string())
        }
    }
}

fn failure(message: String) -> EdgeResponse {
    EdgeResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"success": false, "error": message}),
    )
}
