use clap::Subcommand;
use serde_json::json;

use crate::assets::upload_id;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::generation::output::{expand_outputs, normalize_output};

#[derive(Subcommand)]
pub enum AssetsCommands {
    #[command(about = "Decode an output_file_url value into its output URLs")]
    Normalize {
        #[arg(help = "Raw output_file_url: a URL, a JSON array or a JSON object")]
        raw: String,

        #[arg(long, help = "Generation id used for expanded item ids")]
        id: Option<String>,

        #[arg(long, default_value = "Generation", help = "Name used for expanded items")]
        name: String,
    },

    #[command(about = "Upload id the library assigns to an input URL")]
    UploadId {
        #[arg(help = "Input URL (imageUrl, videoUrl or referenceImageUrl)")]
        url: String,
    },
}

pub async fn handle(cmd: AssetsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AssetsCommands::Normalize { raw, id, name } => {
            let urls = normalize_output(Some(&raw));
            let items = expand_outputs(id.as_deref().unwrap_or("generation"), &name, &urls);
            output_data(&output_format, &json!({ "urls": urls, "items": items }), || {
                if items.is_empty() {
                    return vec!["No outputs".to_string()];
                }
                items
                    .iter()
                    .map(|item| format!("{:<40} {:<24} {}", item.id, item.name, item.url))
                    .collect()
            })
        }
        AssetsCommands::UploadId { url } => {
            let id = upload_id(&url);
            output_data(&output_format, &json!({ "url": url, "id": id }), || vec![id.clone()])
        }
    }
}
