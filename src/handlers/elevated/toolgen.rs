use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::providers::openai::DocumentationRequest;
use crate::state::AppState;
use crate::toolgen::{self, parse_documentation, GeneratedCode, ParseMode, ToolConfig, ToolParameter, ToolgenError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStrategy {
    /// JSON schema when the paste is JSON, text lines otherwise
    #[default]
    Auto,
    Ai,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub mode: ParseStrategy,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseResult {
    pub mode: ParseMode,
    pub parameters: Vec<ToolParameter>,
}

/// POST /api/admin/toolgen/parse - parameters from pasted FAL.ai documentation
pub async fn toolgen_parse(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<ParseRequest>,
) -> ApiResult<ParseResult> {
    let (mode, parameters) = match request.mode {
        ParseStrategy::Auto => parse_documentation(&request.documentation)?,
        ParseStrategy::Ai => {
            if request.documentation.trim().is_empty() {
                return Err(ToolgenError::EmptyDocumentation.into());
            }
            let parsed = state
                .doc_parser
                .parse(&DocumentationRequest {
                    documentation: Some(request.documentation.clone()),
                    tool_name: request.tool_name.clone(),
                    category: request.category.clone(),
                    endpoint: request.endpoint.clone(),
                })
                .await?;
            let parameters: Vec<ToolParameter> =
                parsed.parameters.iter().map(ToolParameter::from_doc).collect();
            if parameters.is_empty() {
                return Err(ToolgenError::NoParameters.into());
            }
            (ParseMode::Ai, parameters)
        }
    };

    info!(
        "Parsed {} parameters ({:?}) for admin {}",
        parameters.len(),
        mode,
        admin.user_id
    );
    Ok(ApiResponse::success(ParseResult { mode, parameters }))
}

/// POST /api/admin/toolgen/generate - component, edge function and catalogue snippets
pub async fn toolgen_generate(
    Extension(admin): Extension<AuthUser>,
    Json(config): Json<ToolConfig>,
) -> Result<ApiResponse<GeneratedCode>, ApiError> {
    let code = toolgen::generate(&config)?;
    info!(
        "Generated tool {} ({}) for admin {}",
        code.identifiers.component_name, code.identifiers.tool_type, admin.user_id
    );
    Ok(ApiResponse::success(code))
}
