use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

use super::ProviderError;

const MODEL: &str = "gpt-4o-mini";

static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

const SYSTEM_PROMPT: &str = r#"You are an expert at parsing FAL.ai API documentation and extracting parameters for tool generation.

Your task is to analyze FAL.ai API documentation and extract all parameters in a specific JSON format.

For each parameter, determine:
1. Parameter name (exact API field name)
2. Type (string, number, boolean, select, file)
3. Whether it's required or optional
4. Default value if specified
5. UI component type (textarea, input, slider, checkbox, select, file-upload)
6. Validation rules (min, max, options)
7. Description for users

IMPORTANT RULES:
- Always include common FAL.ai parameters like "prompt", "image_url", "video_url", "seed", "guidance_scale", "num_inference_steps"
- For file inputs, detect if it expects image_url, video_url, or audio_url
- Map number ranges to sliders (guidance_scale, steps, etc.)
- Map enums/options to select dropdowns
- Map boolean flags to checkboxes
- Use textarea for prompts, input for simple strings
- Infer token cost calculation if mentioned

Respond with ONLY valid JSON in this exact format:
{
  "parameters": [
    {
      "name": "prompt",
      "type": "string",
      "required": true,
      "defaultValue": "",
      "uiComponent": "textarea",
      "description": "Text prompt describing what to generate",
      "validation": { "maxLength": 1000 }
    }
  ],
  "tokenCostInfo": {
    "baseTokens": 10,
    "formula": "Base cost varies by resolution and duration",
    "factors": ["resolution", "duration", "num_images"]
  },
  "processingTime": "30-60 seconds"
}"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentationRequest {
    pub documentation: Option<String>,
    pub tool_name: Option<String>,
    pub category: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub default_value: Value,
    pub ui_component: String,
    pub description: String,
    pub validation: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocumentation {
    pub parameters: Vec<DocParameter>,
    pub token_cost_info: Value,
    pub processing_time: String,
    pub raw_analysis: String,
}

#[async_trait]
pub trait DocParser: Send + Sync {
    async fn parse(&self, request: &DocumentationRequest) -> Result<ParsedDocumentation, ProviderError>;
}

pub struct OpenAiDocParser {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiDocParser {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl DocParser for OpenAiDocParser {
    async fn parse(&self, request: &DocumentationRequest) -> Result<ParsedDocumentation, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("OPENAI_API_KEY"))?;
        let documentation = request.documentation.as_deref().unwrap_or_default();

        let user_prompt = format!(
            "Parse this FAL.ai API documentation for tool \"{}\" (category: {}):\n\nENDPOINT: {}\n\nDOCUMENTATION:\n{}\n\nExtract all parameters and return the JSON format specified in the system prompt.",
            request.tool_name.as_deref().unwrap_or_default(),
            request.category.as_deref().unwrap_or_default(),
            request.endpoint.as_deref().unwrap_or_default(),
            documentation,
        );

        let payload = json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "max_tokens": 2000,
            "temperature": 0.1,
        });

        info!("Parsing documentation with {}", MODEL);
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("OpenAI", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("OpenAI API error: {} {}", status.as_u16(), text);
            return Err(ProviderError::Upstream(format!(
                "OpenAI API error: {} - {}",
                status.as_u16(),
                text
            )));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest("OpenAI", e))?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("No analysis content received from OpenAI".to_string())
            })?;

        parse_analysis(content).map_err(ProviderError::InvalidResponse)
    }
}

/// Pull the JSON document out of the model's reply and normalize every parameter
pub fn parse_analysis(content: &str) -> Result<ParsedDocumentation, String> {
    let block = JSON_BLOCK
        .find(content)
        .ok_or_else(|| "Could not parse OpenAI response as JSON: No JSON found in OpenAI response".to_string())?;
    let parsed: Value = serde_json::from_str(block.as_str())
        .map_err(|e| format!("Could not parse OpenAI response as JSON: {}", e))?;

    let raw_params = parsed
        .get("parameters")
        .and_then(Value::as_array)
        .ok_or_else(|| "Invalid response format: missing parameters array".to_string())?;

    let parameters = raw_params.iter().map(normalize_parameter).collect();

    let token_cost_info = parsed
        .get("tokenCostInfo")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| {
            json!({ "baseTokens": 10, "formula": "Base cost per generation", "factors": [] })
        });
    let processing_time = parsed
        .get("processingTime")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("1-3 minutes")
        .to_string();

    Ok(ParsedDocumentation {
        parameters,
        token_cost_info,
        processing_time,
        raw_analysis: content.to_string(),
    })
}

fn normalize_parameter(param: &Value) -> DocParameter {
    let text = |key: &str, default: &str| {
        param
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    let truthy = match param.get("required") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };

    DocParameter {
        name: text("name", "unknown"),
        kind: text("type", "string"),
        required: truthy,
        default_value: param
            .get("defaultValue")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!("")),
        ui_component: text("uiComponent", "input"),
        description: text("description", ""),
        validation: param
            .get("validation")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_surrounding_text() {
        let reply = "Here you go:\n```json\n{\"parameters\":[{\"name\":\"prompt\",\"required\":true}]}\n```";
        let parsed = parse_analysis(reply).unwrap();
        assert_eq!(parsed.parameters.len(), 1);
        let p = &parsed.parameters[0];
        assert_eq!(p.name, "prompt");
        assert_eq!(p.kind, "string");
        assert!(p.required);
        assert_eq!(p.ui_component, "input");
        assert_eq!(p.default_value, json!(""));
        assert_eq!(parsed.processing_time, "1-3 minutes");
        assert_eq!(parsed.token_cost_info["baseTokens"], 10);
    }

    #[test]
    fn missing_parameters_is_an_error() {
        let err = parse_analysis("{\"tokenCostInfo\":{}}").unwrap_err();
        assert_eq!(err, "Invalid response format: missing parameters array");
        assert!(parse_analysis("no json here").is_err());
    }

    #[test]
    fn keeps_explicit_zero_defaults() {
        let parsed =
            parse_analysis(r#"{"parameters":[{"name":"seed","type":"number","defaultValue":0}]}"#).unwrap();
        assert_eq!(parsed.parameters[0].default_value, json!(0));
    }
}
