use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

use super::ProviderError;

/// Scene generation request as posted by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneRequest {
    pub generation_id: Option<String>,
    pub image_url: Option<String>,
    pub theme: Option<String>,
    pub background: Option<String>,
    pub main_subject: Option<String>,
    pub tone_and_color: Option<String>,
    pub action_direction: Option<String>,
    pub scene_vision: Option<String>,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
    pub inference_steps: Option<f64>,
    pub safety_checker: Option<bool>,
    pub prompt_expansion: Option<bool>,
    pub num_chains: Option<f64>,
    pub seed: Option<i64>,
    pub model_type: Option<String>,
    pub model_params: Option<SceneModelParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneModelParams {
    pub negative_prompt: Option<String>,
    pub generate_audio: Option<bool>,
    pub enhance_prompt: Option<bool>,
    pub style: Option<String>,
    #[serde(rename = "loop")]
    pub loop_video: Option<bool>,
}

impl SceneRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.generation_id.as_deref().map_or(true, str::is_empty) {
            return Err("Generation ID is required".to_string());
        }
        self.validate_scene()
    }

    /// Image and action checks alone, usable before a row id exists
    pub fn validate_scene(&self) -> Result<(), String> {
        if self.image_url.as_deref().map_or(true, str::is_empty) {
            return Err("Image URL is required".to_string());
        }
        if self
            .action_direction
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
        {
            return Err("Action direction is required".to_string());
        }
        Ok(())
    }

    pub fn railway_model(&self) -> &'static str {
        map_model_type(self.model_type.as_deref().unwrap_or_default())
    }

    /// Request body for `POST /api/v1/generate-scene`
    pub fn to_railway_params(&self, webhook_url: &str) -> Value {
        let model = self.railway_model();
        let mp = self.model_params.clone().unwrap_or_default();
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let model_params = match model {
            "veo3" | "veo3-fast" => json!({
                "duration": "8s",
                "negative_prompt": text(&mp.negative_prompt),
                "enhance_prompt": mp.enhance_prompt != Some(false),
                "generate_audio": mp.generate_audio.unwrap_or(false),
                "enable_safety_checker": self.safety_checker != Some(false),
            }),
            "pixverse" => json!({
                "duration": 5,
                "style": mp.style.filter(|s| !s.is_empty()),
                "negative_prompt": text(&mp.negative_prompt),
                "aspect_ratio": self.aspect_ratio,
            }),
            "luma" => json!({
                "duration": 5,
                "aspect_ratio": self.aspect_ratio,
                "loop": mp.loop_video.unwrap_or(false),
            }),
            "wan-pro" => json!({
                "enable_safety_checker": self.safety_checker != Some(false),
                "aspect_ratio": self.aspect_ratio,
            }),
            _ => json!({ "aspect_ratio": self.aspect_ratio }),
        };

        json!({
            "generation_id": self.generation_id,
            "image_url": self.image_url,
            "theme": text(&self.theme),
            "background": text(&self.background),
            "main_subject": text(&self.main_subject),
            "tone_and_color": text(&self.tone_and_color),
            "action_direction": self.action_direction,
            "scene_vision": text(&self.scene_vision),
            "resolution": self.resolution,
            "aspect_ratio": self.aspect_ratio,
            "inference_steps": self.inference_steps,
            "safety_checker": self.safety_checker.unwrap_or(false),
            "prompt_expansion": self.prompt_expansion.unwrap_or(false),
            "num_chains": self.num_chains,
            "seed": self.seed.filter(|s| *s != -1),
            "model_type": model,
            "webhook_url": webhook_url,
            "model_params": model_params,
        })
    }
}

/// Client display names to Railway model identifiers; anything else runs on WAN
pub fn map_model_type(display: &str) -> &'static str {
    match display {
        "WAN (Default)" => "wan",
        "WAN Pro" => "wan-pro",
        "Pixverse v3.5" => "pixverse",
        "LUMA Ray2" => "luma",
        "VEO3" => "veo3",
        "VEO3 Fast" => "veo3-fast",
        _ => "wan",
    }
}

pub fn estimated_time(model: &str) -> &'static str {
    match model {
        "wan-pro" => "3-7 minutes",
        "pixverse" => "2-5 minutes",
        "luma" => "4-10 minutes",
        "veo3" => "5-12 minutes",
        "veo3-fast" => "2-8 minutes",
        _ => "3-8 minutes",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSubmission {
    /// Railway's own id, when it reports one
    pub generation_id: Option<String>,
}

#[async_trait]
pub trait SceneGateway: Send + Sync {
    async fn submit(&self, params: &Value) -> Result<SceneSubmission, ProviderError>;
}

pub struct HttpSceneGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSceneGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SceneGateway for HttpSceneGateway {
    async fn submit(&self, params: &Value) -> Result<SceneSubmission, ProviderError> {
        let url = format!("{}/api/v1/generate-scene", self.base_url);
        info!("Submitting scene generation to Railway");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(params)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("Railway", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Railway API error: {} {}", status.as_u16(), text);
            return Err(ProviderError::Upstream(railway_error_message(status.as_u16(), &text)));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest("Railway", e))?;
        Ok(SceneSubmission {
            generation_id: result
                .get("generation_id")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

fn railway_error_message(status: u16, text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(data) => data
            .get("detail")
            .or_else(|| data.get("error"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| format!("Railway API error: {}", status)),
        Err(_) => format!("Railway API error: {} - {}", status, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> SceneRequest {
        serde_json::from_value(json!({
            "generationId": "g1",
            "imageUrl": "https://x/a.png",
            "actionDirection": "slow pan",
            "aspectRatio": "16:9",
            "resolution": "720p",
            "seed": -1,
            "modelType": model,
        }))
        .unwrap()
    }

    #[test]
    fn maps_display_names() {
        assert_eq!(map_model_type("VEO3 Fast"), "veo3-fast");
        assert_eq!(map_model_type("LUMA Ray2"), "luma");
        assert_eq!(map_model_type("Something else"), "wan");
        assert_eq!(estimated_time("luma"), "4-10 minutes");
    }

    #[test]
    fn action_direction_must_not_be_blank() {
        let mut req = request("WAN Pro");
        req.action_direction = Some("   ".into());
        assert_eq!(req.validate().unwrap_err(), "Action direction is required");
    }

    #[test]
    fn veo3_model_params() {
        let params = request("VEO3").to_railway_params("https://hook");
        assert_eq!(params["model_type"], "veo3");
        assert_eq!(params["model_params"]["duration"], "8s");
        assert_eq!(params["model_params"]["enhance_prompt"], true);
        assert_eq!(params["model_params"]["generate_audio"], false);
        assert!(params["seed"].is_null());
        assert_eq!(params["theme"], "");
    }

    #[test]
    fn luma_and_pixverse_params() {
        let luma = request("LUMA Ray2").to_railway_params("h");
        assert_eq!(luma["model_params"]["loop"], false);
        assert_eq!(luma["model_params"]["duration"], 5);
        let pix = request("Pixverse v3.5").to_railway_params("h");
        assert!(pix["model_params"]["style"].is_null());
        assert_eq!(pix["model_params"]["aspect_ratio"], "16:9");
    }

    #[test]
    fn error_messages_prefer_detail() {
        assert_eq!(railway_error_message(422, r#"{"detail":"bad image"}"#), "bad image");
        assert_eq!(railway_error_message(500, r#"{"error":"boom"}"#), "boom");
        assert_eq!(railway_error_message(502, "gateway"), "Railway API error: 502 - gateway");
    }
}
