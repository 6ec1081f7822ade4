use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use parley::{Language, SamplingParams, StoryTheme, Template, DEFAULT_OLLAMA_URL};

/// Chat, creative writing and code completion against a local Ollama server
/// or the Gemini API.
#[derive(Debug, Parser)]
#[command(name = "parley", version)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Local Ollama-compatible inference server.
    Ollama,
    /// Hosted Gemini API.
    Google,
}

#[derive(Debug, Args)]
pub struct BackendArgs {
    /// Generation backend.
    #[arg(long, value_enum, env = "PARLEY_BACKEND", default_value_t = BackendKind::Ollama, global = true)]
    pub backend: BackendKind,

    /// Base URL of the Ollama server.
    #[arg(long, env = "PARLEY_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL, global = true)]
    pub ollama_url: String,

    /// Model name; defaults to tinyllama (Ollama) or gemini-2.5-flash (Google).
    #[arg(long, short, env = "PARLEY_MODEL", global = true)]
    pub model: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Seconds to wait for one generation call before giving up.
    #[arg(long, env = "PARLEY_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Args)]
pub struct SamplingArgs {
    /// Sampling temperature (0.0 to 2.0).
    #[arg(long, value_parser = parse_temperature)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate (100 to 2000).
    #[arg(long, value_parser = clap::value_parser!(u32).range(100..=2000))]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling cutoff (0.0 to 1.0).
    #[arg(long, value_parser = parse_top_p)]
    pub top_p: Option<f32>,
}

impl SamplingArgs {
    pub fn params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_output_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ChatStyle {
    /// Transcript ending with an `assistant:` cue.
    #[default]
    Chat,
    /// Bare transcript ending with the user line.
    Plain,
}

impl ChatStyle {
    pub fn template(&self) -> Template {
        match self {
            ChatStyle::Chat => Template::Chat,
            ChatStyle::Plain => Template::Plain,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive multi-turn chat. `/clear` resets the conversation.
    Chat {
        #[arg(long, value_enum, default_value_t = ChatStyle::Chat)]
        style: ChatStyle,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Ask one question with a helpful-assistant system line.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Write a poem about a topic.
    Poem {
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
    },
    /// Write a short hill-station story.
    Story {
        /// Free-text theme; wins over --preset.
        theme: Vec<String>,
        /// Ready-made theme: tree, bird, rain, childhood, village, mountains.
        #[arg(long)]
        preset: Option<StoryTheme>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Write a detailed recipe.
    Recipe {
        #[arg(required = true, num_args = 1..)]
        dish: Vec<String>,
    },
    /// Complete a partial source file.
    Complete {
        /// Language of the snippet, e.g. python, rust, c++.
        #[arg(long, short)]
        language: Language,
        /// File with the incomplete code; stdin when absent.
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Extra guidance, e.g. "add error handling".
        #[arg(long)]
        instructions: Option<String>,
        /// Write the completed code here; a directory gets `completed_code.<ext>`.
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// List the backend's available models.
    Models,
    /// Serve the browser chat page.
    Serve {
        #[arg(long, env = "PARLEY_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },
}

fn parse_bounded(value: &str, min: f32, max: f32) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("must be between {min} and {max}"))
    }
}

fn parse_temperature(value: &str) -> Result<f32, String> {
    parse_bounded(value, 0.0, 2.0)
}

fn parse_top_p(value: &str) -> Result<f32, String> {
    parse_bounded(value, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_backend_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "parley", "recipe", "masala", "dosa", "--backend", "google", "--model", "gemini-2.0-flash",
        ])
        .unwrap();
        assert_eq!(cli.backend.backend, BackendKind::Google);
        assert_eq!(cli.backend.model.as_deref(), Some("gemini-2.0-flash"));
        match cli.command {
            Command::Recipe { dish } => assert_eq!(dish.join(" "), "masala dosa"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn complete_parses_language_and_sampling() {
        let cli = Cli::try_parse_from([
            "parley", "complete", "-l", "c++", "--temperature", "0.3", "--max-tokens", "500",
        ])
        .unwrap();
        match cli.command {
            Command::Complete {
                language, sampling, ..
            } => {
                assert_eq!(language, Language::Cpp);
                assert_eq!(sampling.params().temperature, Some(0.3));
                assert_eq!(sampling.params().max_output_tokens, Some(500));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn out_of_range_sampling_is_rejected() {
        assert!(Cli::try_parse_from(["parley", "chat", "--temperature", "2.5"]).is_err());
        assert!(Cli::try_parse_from(["parley", "chat", "--max-tokens", "50"]).is_err());
        assert!(Cli::try_parse_from(["parley", "chat", "--top-p", "1.5"]).is_err());
    }

    #[test]
    fn story_accepts_preset_without_theme() {
        let cli = Cli::try_parse_from(["parley", "story", "--preset", "rain"]).unwrap();
        match cli.command {
            Command::Story { theme, preset, .. } => {
                assert!(theme.is_empty());
                assert_eq!(preset, Some(StoryTheme::Rain));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["parley", "story", "--preset", "desert"]).is_err());
    }
}
