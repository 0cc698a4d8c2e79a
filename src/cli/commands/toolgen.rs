use clap::Subcommand;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::cli::utils::{output_data, output_success, read_document};
use crate::cli::OutputFormat;
use crate::toolgen::{self, parse_documentation, ToolConfig};

#[derive(Subcommand)]
pub enum ToolgenCommands {
    #[command(about = "Parse parameters from a JSON schema or `- name (type): description` text file")]
    Parse {
        #[arg(help = "Documentation file")]
        file: PathBuf,
    },

    #[command(about = "Render component, edge function and catalogue snippets from a tool config")]
    Generate {
        #[arg(long, help = "Tool config (JSON, or YAML by extension)")]
        config: PathBuf,

        #[arg(long, help = "Replace the config's parameters with ones parsed from this file")]
        docs: Option<PathBuf>,

        #[arg(long, help = "Write the outputs into this directory instead of printing them")]
        out: Option<PathBuf>,
    },
}

pub async fn handle(cmd: ToolgenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ToolgenCommands::Parse { file } => {
            let doc = fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
            let (mode, parameters) = parse_documentation(&doc)?;
            output_data(
                &output_format,
                &json!({ "mode": mode, "parameters": parameters }),
                || {
                    parameters
                        .iter()
                        .map(|p| {
                            format!(
                                "{:<24} {:<8} {:<9} {}{}",
                                p.name,
                                format!("{:?}", p.kind).to_lowercase(),
                                format!("{:?}", p.ui_component).to_lowercase(),
                                if p.required { "(required) " } else { "" },
                                p.description
                            )
                        })
                        .collect()
                },
            )
        }
        ToolgenCommands::Generate { config, docs, out } => {
            let mut tool_config: ToolConfig = read_document(&config)?;
            if let Some(docs) = docs {
                let doc = fs::read_to_string(&docs)
                    .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", docs.display(), e))?;
                tool_config.parameters = parse_documentation(&doc)?.1;
            }

            let code = toolgen::generate(&tool_config)?;

            let Some(dir) = out else {
                return output_data(&output_format, &code, || {
                    vec![
                        format!("// {}.jsx", code.identifiers.component_name),
                        code.react_component.clone(),
                        format!("// supabase/functions/{}/index.ts", code.identifiers.edge_function_name),
                        code.edge_function.clone(),
                        "// falTools.js".to_string(),
                        code.data_updates.fal_tools_addition.clone(),
                        "// storageHelpers.js".to_string(),
                        code.data_updates.storage_helpers_addition.clone(),
                        "// App.jsx".to_string(),
                        code.route_update.clone(),
                    ]
                });
            };

            fs::create_dir_all(&dir)?;
            let files = [
                (format!("{}.jsx", code.identifiers.component_name), &code.react_component),
                (format!("{}.ts", code.identifiers.edge_function_name), &code.edge_function),
                ("falTools.addition.js".to_string(), &code.data_updates.fal_tools_addition),
                (
                    "storageHelpers.addition.js".to_string(),
                    &code.data_updates.storage_helpers_addition,
                ),
                ("route.addition.jsx".to_string(), &code.route_update),
            ];
            let mut written = Vec::new();
            for (name, content) in files {
                let path = dir.join(&name);
                fs::write(&path, content)?;
                written.push(path.display().to_string());
            }

            output_success(
                &output_format,
                &format!("Generated {} into {}", code.identifiers.component_name, dir.display()),
                Some(json!({ "identifiers": code.identifiers, "files": written })),
            )
        }
    }
}
