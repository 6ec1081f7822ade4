//! Google Gemini API client

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use parley_core::{
    GenerationRequest, GenerationResult, Generator, ModelCatalog, ModelInfo, ParleyError,
    SamplingParams, DEFAULT_TIMEOUT,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{build_client, network_error, normalize_base_url, upstream_error};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variables consulted by [`GoogleClient::from_env`], in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Clone)]
pub struct GoogleClient {
    base_url: String,
    api_key: SecretString,
    model: String,
    http: Client,
}

impl fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl GoogleClient {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Result<Self, ParleyError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ParleyError::InvalidConfig("Gemini API key is empty".to_string()));
        }
        Ok(Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            http: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Reads the key from the first set variable in [`API_KEY_VARS`].
    pub fn from_env(model: impl Into<String>) -> Result<Self, ParleyError> {
        let key = API_KEY_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                ParleyError::InvalidConfig(format!("set {} to use Gemini", API_KEY_VARS[0]))
            })?;
        Self::new(SecretString::new(key), model)
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, ParleyError> {
        self.base_url = normalize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ParleyError> {
        self.http = build_client(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_name<'a>(&'a self, request_model: &'a str) -> &'a str {
        let model = if request_model.is_empty() {
            self.model.as_str()
        } else {
            request_model
        };
        let model = model.trim();
        model.strip_prefix("models/").unwrap_or(model)
    }

    /// `{base}/v1beta/models/{model}:generateContent` with the model name
    /// percent-encoded as a single path segment.
    fn generate_url(&self, request_model: &str) -> Result<Url, ParleyError> {
        let method = format!("{}:generateContent", self.model_name(request_model));
        self.api_url(&["v1beta", "models", method.as_str()])
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ParleyError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ParleyError::InvalidConfig(format!("invalid base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                ParleyError::InvalidConfig(format!("base url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl GenerationSettings {
    fn from_sampling(sampling: &SamplingParams) -> Option<Self> {
        if sampling.is_empty() {
            return None;
        }
        Some(Self {
            temperature: sampling.temperature,
            max_output_tokens: sampling.max_output_tokens,
            top_p: sampling.top_p,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

fn is_blocked_finish_reason(reason: &str) -> bool {
    matches!(reason, "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")
}

fn extract_text(response: GenerateContentResponse) -> GenerationResult {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| ParleyError::MalformedResponse("no candidates in response".to_string()))?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        if is_blocked_finish_reason(&reason) {
            return Err(ParleyError::MalformedResponse(format!(
                "generation blocked: {reason}"
            )));
        }
        return Err(ParleyError::MalformedResponse(format!(
            "candidate carried no text (finish reason {reason})"
        )));
    }
    Ok(text)
}

#[async_trait::async_trait]
impl Generator for GoogleClient {
    async fn generate(&self, input: GenerationRequest) -> GenerationResult {
        if self.model_name(&input.model).is_empty() {
            return Err(ParleyError::InvalidConfig("no model selected".to_string()));
        }
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(input.prompt),
                }],
            }],
            generation_config: GenerationSettings::from_sampling(&input.sampling),
        };
        let url = self.generate_url(&input.model)?;
        tracing::debug!(model = %self.model_name(&input.model), "gemini generateContent");

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret().as_str())
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| ParleyError::MalformedResponse(err.to_string()))?;
        extract_text(parsed)
    }
}

#[async_trait::async_trait]
impl ModelCatalog for GoogleClient {
    /// Lists models that support `generateContent`, following pagination
    /// until the server stops handing out new page tokens.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ParleyError> {
        let url = self.api_url(&["v1beta", "models"])?;
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .header(API_KEY_HEADER, self.api_key.expose_secret().as_str());
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(network_error)?;
            let status = response.status();
            let body = response.text().await.map_err(network_error)?;
            if !status.is_success() {
                return Err(upstream_error(status, &body));
            }

            let page: ListModelsResponse = serde_json::from_str(&body)
                .map_err(|err| ParleyError::MalformedResponse(err.to_string()))?;
            models.extend(
                page.models
                    .into_iter()
                    .filter(|model| {
                        model
                            .supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|model| ModelInfo {
                        name: model.name,
                        size: None,
                        display_name: model.display_name,
                    }),
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
                Some(token) => {
                    tracing::warn!(%token, "gemini model listing repeated a page token");
                    break;
                }
                None => break,
            }
        }

        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str) -> GoogleClient {
        GoogleClient::new(SecretString::new("test-key".to_string()), model)
            .expect("client")
            .with_base_url("http://localhost:8080/proxy/")
            .expect("base url")
    }

    #[test]
    fn generate_url_encodes_the_model_segment() {
        let url = client("gemini-2.5-flash").generate_url("").expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let url = client("gemini-2.5-flash")
            .generate_url("models/tuned/my model?x")
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/v1beta/models/tuned%2Fmy%20model%3Fx:generateContent"
        );
        assert!(url.query().is_none());
    }
}
