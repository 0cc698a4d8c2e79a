use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_data, output_empty_collection};
use crate::cli::OutputFormat;
use crate::generation::catalogue::{find_tool, ToolInfo, AI_TOOLS};

#[derive(Subcommand)]
pub enum ToolsCommands {
    #[command(about = "List catalogue tools")]
    List {
        #[arg(long, help = "Only tools in this category (image, video, audio, enhancement, ai)")]
        category: Option<String>,
    },

    #[command(about = "Show one tool by tool_type")]
    Show {
        #[arg(help = "Tool type, e.g. fal_flux_kontext")]
        tool_type: String,
    },
}

fn category_name(tool: &ToolInfo) -> String {
    serde_json::to_value(tool.category)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn cost_label(tool: &ToolInfo) -> String {
    match serde_json::to_value(tool.tokens_required) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

pub async fn handle(cmd: ToolsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ToolsCommands::List { category } => {
            let tools: Vec<&ToolInfo> = AI_TOOLS
                .iter()
                .filter(|t| category.as_deref().map_or(true, |c| category_name(t) == c))
                .collect();

            if tools.is_empty() {
                return output_empty_collection(&output_format, "tools", "No tools found");
            }

            output_data(&output_format, &json!({ "tools": tools }), || {
                tools
                    .iter()
                    .map(|t| {
                        format!(
                            "{:<32} {:<12} {:>8}  {}",
                            t.tool_type,
                            category_name(t),
                            cost_label(t),
                            t.name
                        )
                    })
                    .collect()
            })
        }
        ToolsCommands::Show { tool_type } => {
            let tool = find_tool(&tool_type)
                .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", tool_type))?;
            output_data(&output_format, tool, || {
                vec![
                    format!("{} ({})", tool.name, tool.tool_type),
                    tool.description.to_string(),
                    format!("Category: {}", category_name(tool)),
                    format!("Tokens: {}", cost_label(tool)),
                    format!("Route: {}", tool.route.unwrap_or("-")),
                    format!("Function: {}", tool.function.unwrap_or("-")),
                ]
            })
        }
    }
}
