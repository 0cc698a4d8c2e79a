use clap::Subcommand;
use serde_json::{json, Value};

use crate::auth::routes::{resolve, CLIENT_ROUTES};
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RoutesCommands {
    #[command(about = "List the client route table")]
    List,

    #[command(about = "Resolve a path; with --server, ask a running API for the full decision")]
    Guard {
        #[arg(help = "Client path, e.g. /admin/user/123")]
        path: String,

        #[arg(long, help = "API base URL, e.g. http://localhost:3000")]
        server: Option<String>,

        #[arg(long, env = "IMGMOTION_TOKEN", help = "Bearer token sent to the server")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: RoutesCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RoutesCommands::List => {
            let routes: Vec<Value> = CLIENT_ROUTES
                .iter()
                .map(|(pattern, access)| json!({ "pattern": pattern, "access": access }))
                .collect();
            output_data(&output_format, &json!({ "routes": routes }), || {
                CLIENT_ROUTES
                    .iter()
                    .map(|(pattern, access)| format!("{:<32} {:?}", pattern, access))
                    .collect()
            })
        }
        RoutesCommands::Guard { path, server, token } => {
            let Some(server) = server else {
                let (route, known) = resolve(&path);
                let data = json!({
                    "path": path,
                    "pattern": route.pattern,
                    "access": route.access,
                    "known": known,
                });
                return output_data(&output_format, &data, || {
                    vec![format!(
                        "{} → {} ({:?}){}",
                        path,
                        route.pattern,
                        route.access,
                        if known { "" } else { ", unknown path" }
                    )]
                });
            };

            let url = format!("{}/api/routes/guard", server.trim_end_matches('/'));
            let mut request = reqwest::Client::new().get(url).query(&[("path", path.as_str())]);
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            let body: Value = request.send().await?.error_for_status()?.json().await?;
            let data = body.get("data").cloned().unwrap_or(Value::Null);

            output_data(&output_format, &data, || {
                let decision = data["decision"].as_str().unwrap_or("unknown");
                let mut line = format!("{} → {}", path, decision);
                if let Some(to) = data["to"].as_str() {
                    line.push_str(&format!(" {}", to));
                }
                if let Some(reason) = data["reason"].as_str() {
                    line.push_str(&format!(" ({})", reason));
                }
                vec![line]
            })
        }
    }
}
