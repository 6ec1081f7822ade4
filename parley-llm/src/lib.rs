mod http;

#[cfg(feature = "ollama")]
mod ollama;

// Provider-specific clients (feature-gated)
pub mod providers;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};

#[cfg(feature = "google")]
pub use providers::google::{GoogleClient, API_KEY_VARS};

pub use parley_core::{
    GenerationConfig, GenerationRequest, GenerationResult, Generator, ModelCatalog, ModelInfo,
    ParleyError, SamplingParams, DEFAULT_TIMEOUT,
};
