//! Prompt bridges to local and hosted text-generation backends.
//!
//! ```no_run
//! use parley::{GenerationConfig, History, OllamaClient, PromptBridge, Template};
//!
//! # async fn run() -> Result<(), parley::ParleyError> {
//! let client = OllamaClient::new("http://localhost:11434", "tinyllama")?;
//! let bridge = PromptBridge::new(client, GenerationConfig::new("tinyllama"));
//!
//! let exchange = bridge.respond(&History::new(), "hello", &Template::Chat).await;
//! println!("{}", exchange.reply_text());
//! let history = exchange.history;
//! # let _ = history;
//! # Ok(())
//! # }
//! ```

mod bridge;

pub use bridge::{Exchange, PromptBridge};

pub use parley_core::{
    append_turn, ErrorKind, GenerationConfig, GenerationRequest, GenerationResult, Generator,
    History, ModelCatalog, ModelInfo, ParleyError, Role, SamplingParams, Turn, DEFAULT_TIMEOUT,
};
pub use parley_prompt::{
    build_prompt, CodeCompletion, CreativeKind, Language, PromptTemplate, StoryTheme, Template,
};

#[cfg(feature = "ollama")]
pub use parley_llm::{OllamaClient, DEFAULT_OLLAMA_URL};

#[cfg(feature = "google")]
pub use parley_llm::{GoogleClient, API_KEY_VARS};
