//! Admin tool generator: derives identifiers for a new FAL tool, parses its parameter
//! documentation and renders the code a developer would add by hand.

pub mod identifiers;
pub mod params;
pub mod templates;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

pub use identifiers::{derive_identifiers, ToolIdentifiers};
pub use params::{parse_documentation, ParseMode, ToolParameter, UiComponent};
pub use templates::{DataUpdates, ToolConfig};

pub const DEPLOY_LABEL: &str = "Tool deployment would create all necessary files and update configurations!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolgenError {
    #[error("Please paste the FAL.ai API documentation")]
    EmptyDocumentation,

    #[error("Could not parse parameters from documentation. Please check the format.")]
    NoParameters,

    #[error("Tool name is required")]
    MissingName,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub identifiers: ToolIdentifiers,
    pub react_component: String,
    pub edge_function: String,
    pub data_updates: DataUpdates,
    pub route_update: String,
    pub deploy: &'static str,
}

pub fn generate(config: &ToolConfig) -> Result<GeneratedCode, ToolgenError> {
    let ids = derive_identifiers(&config.name).ok_or(ToolgenError::MissingName)?;
    Ok(GeneratedCode {
        react_component: templates::react_component(config, &ids),
        edge_function: templates::edge_function(config, &ids),
        data_updates: templates::data_updates(config, &ids, Utc::now().timestamp_millis()),
        route_update: templates::route_update(&ids),
        identifiers: ids,
        deploy: DEPLOY_LABEL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_requires_a_name() {
        let config = ToolConfig::default();
        assert_eq!(generate(&config).unwrap_err(), ToolgenError::MissingName);

        let named = ToolConfig {
            name: "Seedream Edit".into(),
            ..Default::default()
        };
        let code = generate(&named).unwrap();
        assert_eq!(code.identifiers.tool_type, "fal_seedream_edit");
        assert!(code.route_update.contains("/seedream-edit"));
    }
}
