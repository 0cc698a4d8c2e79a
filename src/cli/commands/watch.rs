use clap::Args;
use futures::StreamExt;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::generation::realtime::{GenerationChange, GenerationFeed};

#[derive(Args)]
pub struct WatchArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "API base URL")]
    pub server: String,

    #[arg(long, env = "IMGMOTION_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: String,

    #[arg(long, help = "Only changes for this tool type")]
    pub tool_type: Option<String>,
}

/// One parsed server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Parse one `\n\n`-terminated block. Comment-only blocks (keep-alives) yield `None`.
pub fn parse_sse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }
    Some(SseEvent {
        event,
        data: data.join("\n"),
    })
}

/// Split complete blocks off the front of `buffer`, leaving any partial tail in place
pub fn drain_blocks(buffer: &mut String) -> Vec<String> {
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }
    let mut blocks = Vec::new();
    while let Some(end) = buffer.find("\n\n") {
        blocks.push(buffer.drain(..end + 2).collect());
    }
    blocks
}

pub async fn handle(args: WatchArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/api/generations/stream", args.server.trim_end_matches('/'));
    let mut request = reqwest::Client::new()
        .get(url)
        .bearer_auth(&args.token)
        .header("accept", "text/event-stream");
    if let Some(tool_type) = &args.tool_type {
        request = request.query(&[("tool_type", tool_type.as_str())]);
    }

    let response = request.send().await?.error_for_status()?;
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut feed = GenerationFeed::new();

    if let OutputFormat::Text = output_format {
        eprintln!("Watching generation changes (Ctrl-C to stop)");
    }

    while let Some(chunk) = stream.next().await {
        buffer.push_str(&String::from_utf8_lossy(&chunk?));

        for block in drain_blocks(&mut buffer) {
            let Some(event) = parse_sse_block(&block) else {
                continue;
            };
            let change: GenerationChange = match serde_json::from_str(&event.data) {
                Ok(change) => change,
                Err(e) => {
                    tracing::warn!("Skipping malformed change event: {}", e);
                    continue;
                }
            };

            let row = change.new.clone();
            let kind = change.event_type;
            feed.apply(change);

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "eventType": kind, "generation": row, "tracked": feed.len() })
                ),
                OutputFormat::Text => println!(
                    "{:?} {} {} [{}] {} ({} tracked)",
                    kind,
                    row.id,
                    row.tool_type,
                    row.status,
                    row.display_name(),
                    feed.len()
                ),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_event_and_data() {
        let event = parse_sse_block("event: UPDATE\ndata: {\"a\":1}\n\n").unwrap();
        assert_eq!(event.event.as_deref(), Some("UPDATE"));
        assert_eq!(event.data, "{\"a\":1}");
    }

    #[test]
    fn keep_alive_comments_are_skipped() {
        assert!(parse_sse_block(": keep-alive\n\n").is_none());
    }

    #[test]
    fn drains_only_complete_blocks() {
        let mut buffer = "data: one\n\ndata: tw".to_string();
        let blocks = drain_blocks(&mut buffer);
        assert_eq!(blocks, vec!["data: one\n\n".to_string()]);
        assert_eq!(buffer, "data: tw");

        buffer.push_str("o\r\n\r\n");
        let blocks = drain_blocks(&mut buffer);
        assert_eq!(parse_sse_block(&blocks[0]).unwrap().data, "two");
        assert!(buffer.is_empty());
    }
}
