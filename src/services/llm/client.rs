use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ReasoningConfig;
use crate::{Error, Result};

/// The external reasoning service: instruction + prompt in, intent JSON text out.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Ollama `/api/generate` client in JSON-output mode.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    format: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &ReasoningConfig) -> Self {
        Self::new(&config.host, &config.model, config.timeout())
    }
}

#[async_trait]
impl ReasoningService for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request_body = GenerateRequest {
            model: &self.model,
            system,
            prompt,
            format: "json",
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Reasoning(format!("ollama returned {status}: {body}")));
        }

        let resp_json: GenerateResponse = response.json().await?;
        debug!(model = %self.model, bytes = resp_json.response.len(), "ollama response received");
        Ok(resp_json.response)
    }
}
