mod error;
mod generation;
mod history;
mod llm;
mod turn;

pub use error::{ErrorKind, ParleyError};
pub use generation::{
    GenerationConfig, GenerationRequest, GenerationResult, SamplingParams, DEFAULT_TIMEOUT,
};
pub use history::{append_turn, History};
pub use llm::{Generator, ModelCatalog, ModelInfo};
pub use turn::{Role, Turn};
