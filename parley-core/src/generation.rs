use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ParleyError;

/// Upper bound on a single generation call, shared by every client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling knobs forwarded to the backend. `None` leaves the backend default
/// in place and is omitted from the wire request.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SamplingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingParams {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: SamplingParams) -> Self {
        Self {
            temperature: self.temperature.or(fallback.temperature),
            max_output_tokens: self.max_output_tokens.or(fallback.max_output_tokens),
            top_p: self.top_p.or(fallback.top_p),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none() && self.top_p.is_none()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    #[serde(default)]
    pub sampling: SamplingParams,
}

impl GenerationConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.into(),
            model: self.model.clone(),
            sampling: self.sampling,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    #[serde(default)]
    pub sampling: SamplingParams,
}

pub type GenerationResult = Result<String, ParleyError>;
