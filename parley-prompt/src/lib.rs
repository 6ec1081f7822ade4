//! Prompt construction for the parley bridges.
//!
//! Every entry point picks one [`Template`] variant; [`build_prompt`] turns a
//! history, a new message and that template into the exact text sent to the
//! generation endpoint. Output is a pure function of the inputs.

mod kinds;
mod template;

pub use kinds::{build_prompt, CodeCompletion, CreativeKind, Language, StoryTheme, Template};
pub use template::PromptTemplate;
