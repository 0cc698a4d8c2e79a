use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Categorized FAL failure. `error_message` is what users see; `technical_message` is the upstream text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FalErrorInfo {
    pub error_message: String,
    pub technical_message: String,
    pub error_type: String,
    pub error_details: Value,
    pub status_code: u16,
}

impl FalErrorInfo {
    /// Metadata document written to the failed generation row
    pub fn to_metadata(&self, request_params: &Value) -> Value {
        json!({
            "fal_error_details": {
                "status_code": self.status_code,
                "technical_message": self.technical_message,
                "error_timestamp": chrono::Utc::now().to_rfc3339(),
                "request_params": request_params,
                "error_details": self.error_details,
                "error_type": self.error_type,
            },
            "error_type": row_error_type(self.status_code),
        })
    }
}

/// Coarse type stored on the row: content violations and server errors, everything else is an API error
pub fn row_error_type(status: u16) -> &'static str {
    match status {
        422 => "content_violation",
        500 => "server_error",
        _ => "api_error",
    }
}

pub fn parse_fal_error(status: u16, body: &str) -> FalErrorInfo {
    let mut technical = format!("FAL.ai API error ({})", status);
    let mut details = json!({});

    match serde_json::from_str::<Value>(body) {
        Ok(data) => {
            let message = match data.get("detail") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            }
            .or_else(|| non_empty_str(&data, "error"))
            .or_else(|| non_empty_str(&data, "message"));
            if let Some(message) = message {
                technical = message;
            }
            details = data;
        }
        Err(_) => {
            let head: String = body.chars().take(200).collect();
            technical = format!("{}: {}", technical, head);
        }
    }

    let (error_type, friendly) = match status {
        422 => (
            "content_violation",
            "Content policy violation: Your input was flagged by the safety system. Please use family-friendly content.",
        ),
        400 => ("bad_request", "Invalid request: Please check your input and try again."),
        500 | 503 => (
            "server_error",
            "The AI service is temporarily unavailable. Please try again in a few minutes.",
        ),
        402 | 403 => ("quota_error", "Service quota exceeded. Please try again later."),
        429 => ("rate_limit", "Too many requests. Please wait a moment before trying again."),
        _ => {
            let lower = technical.to_lowercase();
            if ["content", "policy", "inappropriate", "nsfw"]
                .iter()
                .any(|k| lower.contains(k))
            {
                ("content_violation", "Content policy violation detected. Please modify your input.")
            } else {
                ("api_error", "Generation failed. Please try again.")
            }
        }
    };

    FalErrorInfo {
        error_message: friendly.to_string(),
        technical_message: technical,
        error_type: error_type.to_string(),
        error_details: details,
        status_code: status,
    }
}

fn non_empty_str(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

const NSFW_INDICATORS: &[&str] = &[
    "content_policy_violation",
    "flagged as nsfw",
    "flagged by content",
    "content safety",
    "inappropriate content",
    "content filter",
    "policy violation",
    "nsfw",
    "content_checker",
];

pub fn is_nsfw_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    NSFW_INDICATORS.iter().any(|needle| lower.contains(needle))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsfwDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub technical: String,
    pub suggestions: Vec<String>,
}

pub fn parse_nsfw_error(message: &str) -> NsfwDetails {
    let embedded_json = match (message.find('{'), message.rfind('}')) {
        (Some(start), Some(end)) if end > start => {
            serde_json::from_str::<Value>(&message[start..=end]).is_ok()
        }
        _ => false,
    };

    let (summary, suggestions): (&str, &[&str]) = if embedded_json {
        (
            "Image flagged by content safety system",
            &[
                "Try uploading a different image",
                "Ensure image complies with content policy",
                "Use family-friendly content only",
            ],
        )
    } else {
        (
            "Content flagged by safety system",
            &["Try uploading a different image", "Ensure content is appropriate"],
        )
    };

    NsfwDetails {
        kind: "content_policy_violation".to_string(),
        message: summary.to_string(),
        technical: message.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_wins() {
        let info = parse_fal_error(422, r#"{"detail":"flagged","error":"other"}"#);
        assert_eq!(info.technical_message, "flagged");
        assert_eq!(info.error_type, "content_violation");
        assert!(info.error_message.starts_with("Content policy violation"));
    }

    #[test]
    fn structured_detail_is_stringified() {
        let info = parse_fal_error(400, r#"{"detail":[{"loc":["body","prompt"]}]}"#);
        assert_eq!(info.error_type, "bad_request");
        assert!(info.technical_message.contains("\"loc\""));
    }

    #[test]
    fn non_json_body_is_truncated() {
        let body = "x".repeat(500);
        let info = parse_fal_error(502, &body);
        assert_eq!(info.technical_message.len(), "FAL.ai API error (502): ".len() + 200);
        assert_eq!(info.error_type, "api_error");
        assert_eq!(info.error_message, "Generation failed. Please try again.");
    }

    #[test]
    fn unknown_status_scans_keywords() {
        let info = parse_fal_error(418, r#"{"message":"NSFW content detected"}"#);
        assert_eq!(info.error_type, "content_violation");
        assert_eq!(info.error_message, "Content policy violation detected. Please modify your input.");
    }

    #[test]
    fn status_categories() {
        assert_eq!(parse_fal_error(503, "{}").error_type, "server_error");
        assert_eq!(parse_fal_error(403, "{}").error_type, "quota_error");
        assert_eq!(parse_fal_error(429, "{}").error_type, "rate_limit");
        assert_eq!(parse_fal_error(503, "{}").technical_message, "FAL.ai API error (503)");
    }

    #[test]
    fn row_error_type_is_coarse() {
        assert_eq!(row_error_type(422), "content_violation");
        assert_eq!(row_error_type(500), "server_error");
        assert_eq!(row_error_type(503), "api_error");
    }

    #[test]
    fn nsfw_detection() {
        assert!(is_nsfw_error("Image was flagged as NSFW"));
        assert!(is_nsfw_error("content_checker rejected input"));
        assert!(!is_nsfw_error("Timeout while connecting"));
    }

    #[test]
    fn nsfw_details_depend_on_embedded_json() {
        let with_json = parse_nsfw_error(r#"FAL.ai API error (422): {"detail":"nsfw"}"#);
        assert_eq!(with_json.message, "Image flagged by content safety system");
        assert_eq!(with_json.suggestions.len(), 3);
        assert_eq!(with_json.kind, "content_policy_violation");

        let plain = parse_nsfw_error("flagged as nsfw");
        assert_eq!(plain.message, "Content flagged by safety system");
        assert_eq!(plain.suggestions.len(), 2);
        assert_eq!(plain.technical, "flagged as nsfw");
    }
}
