use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ToolgenError;
use crate::providers::openai::DocParameter;

static PARAM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?\s*`?(\w+)`?\s*\(([^)]+)\):\s*(.+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Loose mapping used for text docs and model output
    pub fn from_loose(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("string") {
            ParamType::String
        } else if lower.contains("integer") || lower == "int" {
            ParamType::Integer
        } else if lower.contains("number") || lower.contains("float") {
            ParamType::Number
        } else if lower.contains("bool") {
            ParamType::Boolean
        } else if lower.contains("array") {
            ParamType::Array
        } else if lower.contains("object") {
            ParamType::Object
        } else {
            ParamType::String
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParamType::Number | ParamType::Integer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiComponent {
    Checkbox,
    Range,
    Number,
    Select,
    Textarea,
    Url,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub ui_component: UiComponent,
    #[serde(default = "default_true")]
    pub show_in_ui: bool,
    pub label: String,
}

fn default_true() -> bool {
    true
}

/// Which of the parsing paths produced a parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    JsonSchema,
    Text,
    Ai,
}

pub fn default_ui_component(
    name: &str,
    kind: ParamType,
    minimum: Option<f64>,
    maximum: Option<f64>,
    has_enum: bool,
) -> UiComponent {
    let lower = name.to_lowercase();
    match kind {
        ParamType::Boolean => UiComponent::Checkbox,
        k if k.is_numeric() && minimum.is_some() && maximum.is_some() => UiComponent::Range,
        k if k.is_numeric() => UiComponent::Number,
        _ if has_enum => UiComponent::Select,
        _ if lower.contains("prompt") => UiComponent::Textarea,
        _ if lower.contains("url") => UiComponent::Url,
        _ => UiComponent::Text,
    }
}

/// `num_inference_steps` → `Num Inference Steps`
pub fn label_for(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl ToolParameter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        kind: ParamType,
        description: String,
        required: bool,
        default: Option<Value>,
        minimum: Option<f64>,
        maximum: Option<f64>,
        enum_values: Option<Vec<Value>>,
    ) -> Self {
        let ui_component = default_ui_component(&name, kind, minimum, maximum, enum_values.is_some());
        let label = label_for(&name);
        Self {
            name,
            kind,
            description,
            required,
            default,
            minimum,
            maximum,
            enum_values,
            ui_component,
            show_in_ui: true,
            label,
        }
    }

    /// From one parameter of the model-assisted analysis
    pub fn from_doc(param: &DocParameter) -> Self {
        let bound = |key: &str| param.validation.get(key).and_then(Value::as_f64);
        let options = param
            .validation
            .get("options")
            .and_then(Value::as_array)
            .cloned();
        let default = match &param.default_value {
            Value::String(s) if s.is_empty() => None,
            other => Some(other.clone()),
        };
        Self::new(
            param.name.clone(),
            ParamType::from_loose(&param.kind),
            param.description.clone(),
            param.required,
            default,
            bound("min"),
            bound("max"),
            options,
        )
    }
}

fn parse_json_schema(schema: &Value) -> Vec<ToolParameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, prop)| {
            let kind = prop
                .get("type")
                .and_then(Value::as_str)
                .map(ParamType::from_loose)
                .unwrap_or(ParamType::String);
            ToolParameter::new(
                name.clone(),
                kind,
                prop.get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                required.contains(&name.as_str()),
                prop.get("default").cloned(),
                prop.get("minimum").and_then(Value::as_f64),
                prop.get("maximum").and_then(Value::as_f64),
                prop.get("enum").and_then(Value::as_array).cloned(),
            )
        })
        .collect()
}

fn parse_text_lines(doc: &str) -> Vec<ToolParameter> {
    doc.lines()
        .filter_map(|line| PARAM_LINE.captures(line))
        .map(|caps| {
            let description = caps[3].trim().to_string();
            let required = description.to_lowercase().contains("required");
            ToolParameter::new(
                caps[1].to_string(),
                ParamType::from_loose(&caps[2]),
                description,
                required,
                None,
                None,
                None,
                None,
            )
        })
        .collect()
}

/// Parameters from pasted documentation: a JSON schema if it parses as JSON, otherwise
/// `- name (type): description` lines
pub fn parse_documentation(doc: &str) -> Result<(ParseMode, Vec<ToolParameter>), ToolgenError> {
    let doc = doc.trim();
    if doc.is_empty() {
        return Err(ToolgenError::EmptyDocumentation);
    }

    let (mode, params) = match serde_json::from_str::<Value>(doc) {
        Ok(schema) => (ParseMode::JsonSchema, parse_json_schema(&schema)),
        Err(_) => (ParseMode::Text, parse_text_lines(doc)),
    };

    if params.is_empty() {
        return Err(ToolgenError::NoParameters);
    }
    Ok((mode, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_schema_properties() {
        let doc = json!({
            "properties": {
                "prompt": {"type": "string", "description": "What to draw"},
                "guidance_scale": {"type": "number", "minimum": 1, "maximum": 20, "default": 3.5},
                "size": {"type": "string", "enum": ["square", "landscape"]},
                "sync_mode": {"type": "boolean"}
            },
            "required": ["prompt"]
        })
        .to_string();
        let (mode, params) = parse_documentation(&doc).unwrap();
        assert_eq!(mode, ParseMode::JsonSchema);
        let by_name = |n: &str| params.iter().find(|p| p.name == n).unwrap();

        assert!(by_name("prompt").required);
        assert_eq!(by_name("prompt").ui_component, UiComponent::Textarea);
        assert_eq!(by_name("guidance_scale").ui_component, UiComponent::Range);
        assert_eq!(by_name("guidance_scale").label, "Guidance Scale");
        assert_eq!(by_name("size").ui_component, UiComponent::Select);
        assert_eq!(by_name("sync_mode").ui_component, UiComponent::Checkbox);
    }

    #[test]
    fn text_lines() {
        let doc = "Inputs:\n- `image_url` (string): URL of the image. Required.\n- num_frames (Integer): frame count\nnot a param";
        let (mode, params) = parse_documentation(doc).unwrap();
        assert_eq!(mode, ParseMode::Text);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "image_url");
        assert!(params[0].required);
        assert_eq!(params[0].ui_component, UiComponent::Url);
        assert_eq!(params[1].kind, ParamType::Integer);
        assert!(!params[1].required);
    }

    #[test]
    fn nothing_parsed_is_an_error() {
        assert!(matches!(parse_documentation("   "), Err(ToolgenError::EmptyDocumentation)));
        assert!(matches!(parse_documentation("{\"title\": \"x\"}"), Err(ToolgenError::NoParameters)));
        assert!(matches!(parse_documentation("just prose"), Err(ToolgenError::NoParameters)));
    }

    #[test]
    fn from_model_analysis() {
        let doc = DocParameter {
            name: "num_inference_steps".into(),
            kind: "number".into(),
            required: false,
            default_value: json!(28),
            ui_component: "slider".into(),
            description: "Steps".into(),
            validation: json!({"min": 1, "max": 50}),
        };
        let param = ToolParameter::from_doc(&doc);
        assert_eq!(param.ui_component, UiComponent::Range);
        assert_eq!(param.default, Some(json!(28)));
    }
}
