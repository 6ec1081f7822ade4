use std::time::Duration;

use parley_core::{
    GenerationRequest, GenerationResult, Generator, ModelCatalog, ModelInfo, ParleyError,
    SamplingParams, DEFAULT_TIMEOUT,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, network_error, normalize_base_url, upstream_error};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Client for a local Ollama-compatible inference server.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    http: Client,
}

impl OllamaClient {
    pub fn new(base_url: impl AsRef<str>, model: impl Into<String>) -> Result<Self, ParleyError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            model: model.into(),
            http: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Replaces the request timeout. Every call is bounded; there is no
    /// "wait forever" setting.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ParleyError> {
        self.http = build_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl OllamaOptions {
    fn from_sampling(sampling: &SamplingParams) -> Option<Self> {
        if sampling.is_empty() {
            return None;
        }
        Some(Self {
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            num_predict: sampling.max_output_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[async_trait::async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, input: GenerationRequest) -> GenerationResult {
        let GenerationRequest {
            prompt,
            model,
            sampling,
        } = input;
        let model = if model.is_empty() {
            self.model.clone()
        } else {
            model
        };
        if model.is_empty() {
            return Err(ParleyError::InvalidConfig("no model selected".to_string()));
        }

        let request = OllamaGenerateRequest {
            model,
            prompt,
            stream: false,
            options: OllamaOptions::from_sampling(&sampling),
        };
        tracing::debug!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            "ollama generate"
        );

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        let parsed: OllamaGenerateResponse = serde_json::from_str(&body)
            .map_err(|err| ParleyError::MalformedResponse(err.to_string()))?;
        parsed
            .response
            .ok_or_else(|| ParleyError::MalformedResponse("missing field `response`".to_string()))
    }
}

#[async_trait::async_trait]
impl ModelCatalog for OllamaClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ParleyError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.http.get(url).send().await.map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        let tags: OllamaTagsResponse = serde_json::from_str(&body)
            .map_err(|err| ParleyError::MalformedResponse(err.to_string()))?;
        Ok(tags.models)
    }
}
