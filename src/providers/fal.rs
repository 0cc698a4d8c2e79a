use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use super::errors::parse_fal_error;
use super::ProviderError;

/// Accepted queue submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalSubmission {
    pub request_id: String,
    pub gateway_request_id: Option<String>,
}

#[async_trait]
pub trait FalGateway: Send + Sync {
    /// Queue a job at `endpoint` (e.g. `fal-ai/wan-pro/image-to-video`). FAL calls `webhook_url` on completion.
    async fn submit(
        &self,
        endpoint: &str,
        webhook_url: &str,
        params: &Value,
    ) -> Result<FalSubmission, ProviderError>;
}

pub struct HttpFalGateway {
    client: reqwest::Client,
    queue_url: String,
    api_key: Option<String>,
}

impl HttpFalGateway {
    pub fn new(queue_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            queue_url: queue_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn submit_url(&self, endpoint: &str, webhook_url: &str) -> Result<url::Url, ProviderError> {
        let mut url = url::Url::parse(&format!("{}/{}", self.queue_url, endpoint))
            .map_err(|e| ProviderError::InvalidResponse(format!("Invalid FAL queue URL: {}", e)))?;
        url.query_pairs_mut().append_pair("fal_webhook", webhook_url);
        Ok(url)
    }
}

#[async_trait]
impl FalGateway for HttpFalGateway {
    async fn submit(
        &self,
        endpoint: &str,
        webhook_url: &str,
        params: &Value,
    ) -> Result<FalSubmission, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("FAL_API_KEY"))?;
        let url = self.submit_url(endpoint, webhook_url)?;

        info!("Submitting to FAL queue: {}", endpoint);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Key {}", api_key))
            .json(params)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest("FAL.ai", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest("FAL.ai", e))?;

        if !status.is_success() {
            error!("FAL queue rejected {} with {}: {}", endpoint, status.as_u16(), body);
            return Err(ProviderError::Fal(parse_fal_error(status.as_u16(), &body)));
        }

        let result: Value = serde_json::from_str(&body).map_err(|_| {
            ProviderError::InvalidResponse(format!("Invalid JSON response from FAL.ai: {}", body))
        })?;

        let request_id = result
            .get("request_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::MissingRequestId)?;

        Ok(FalSubmission {
            request_id: request_id.to_string(),
            gateway_request_id: result
                .get("gateway_request_id")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// `https://<projectRef>.supabase.co/functions/v1/<function>`, where projectRef is the
/// first host label of the project URL.
pub fn supabase_function_url(supabase_url: &str, function: &str) -> String {
    let project_ref = supabase_url
        .split('.')
        .next()
        .unwrap_or_default()
        .replace("https://", "");
    format!("https://{}.supabase.co/functions/v1/{}", project_ref, function)
}
