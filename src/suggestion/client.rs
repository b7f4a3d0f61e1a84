use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::encoder::DataUrl;
use crate::settings::RenamerConfig;
use crate::suggestion::models::{ChatRequest, ChatResponse};

/// Asks a hosted multimodal model for filename suggestions
#[derive(Debug, Clone)]
pub struct SuggestionClient {
    http: Client,
    endpoint: String,
    model: String,
    prompt: String,
    api_key: Option<String>,
}

impl SuggestionClient {
    pub fn new(endpoint: &str, model: &str, prompt: &str, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            prompt: prompt.to_string(),
            api_key,
        }
    }

    /// Client configured from `config`, with the token read from its environment variable
    pub fn from_config(config: &RenamerConfig) -> Self {
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!("{} is not set, sending the request without authorization", config.api_key_env);
        }
        Self::new(&config.endpoint, &config.model, &config.prompt, api_key)
    }

    /// Sends the image and returns the decoded reply as-is.
    ///
    /// Returns `Ok(None)` without touching the network when there is no image.
    /// Non-success statuses are not treated as errors; the body is handed back so the
    /// parser can decide it holds nothing useful. Transport failures and bodies that
    /// are not JSON are errors.
    pub async fn request_suggestions(&self, image: Option<&DataUrl>) -> Result<Option<ChatResponse>> {
        let Some(image) = image else {
            debug!("No image to describe, skipping suggestion request");
            return Ok(None);
        };

        let body = ChatRequest::with_image(&self.model, &self.prompt, image.as_str());
        info!("Requesting filename suggestions from {} ({})", self.endpoint, self.model);
        trace!("Image payload is {} characters", image.as_str().len());

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.endpoint))?;

        let status = response.status();
        // Any JSON body is accepted here, its shape is checked later
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to decode response from {} (status {})", self.endpoint, status))?;
        let reply = ChatResponse::from_value(body);

        if status.is_success() {
            debug!("Suggestion request succeeded with status {}", status);
        } else {
            let message = reply.error_message().unwrap_or("no error message");
            warn!("Suggestion request returned {}: {}", status, message);
        }

        Ok(Some(reply))
    }
}
