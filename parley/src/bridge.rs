use parley_core::{GenerationConfig, GenerationResult, Generator, History, Role};
use parley_prompt::{build_prompt, Template};

/// The outcome of one user turn: the history to keep and the reply.
#[derive(Debug)]
pub struct Exchange {
    /// The input history plus the user and assistant turns on success; the
    /// unchanged input history on failure.
    pub history: History,
    pub reply: GenerationResult,
}

impl Exchange {
    pub fn is_ok(&self) -> bool {
        self.reply.is_ok()
    }

    /// Reply as shown to the user; failures become an `Error: ...` line.
    pub fn reply_text(&self) -> String {
        match &self.reply {
            Ok(text) => text.clone(),
            Err(err) => format!("Error: {err}"),
        }
    }
}

/// Builds a prompt, makes one generation call and threads history forward.
/// Failures are returned as-is and never retried.
#[derive(Clone, Debug)]
pub struct PromptBridge<G> {
    generator: G,
    config: GenerationConfig,
}

impl<G: Generator> PromptBridge<G> {
    pub fn new(generator: G, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// One call with an already-built prompt. Template sampling presets fill
    /// whatever `config` leaves unset.
    pub async fn generate(
        &self,
        prompt: String,
        config: &GenerationConfig,
        template: &Template,
    ) -> GenerationResult {
        let sampling = config.sampling.or(template.sampling_preset());
        let request = config.clone().with_sampling(sampling).request(prompt);
        self.generator.generate(request).await
    }

    pub async fn respond(&self, history: &History, message: &str, template: &Template) -> Exchange {
        self.respond_as(&self.config, history, message, template)
            .await
    }

    /// Like [`respond`](Self::respond) with a per-call configuration, e.g. a
    /// model picked by the web client.
    pub async fn respond_as(
        &self,
        config: &GenerationConfig,
        history: &History,
        message: &str,
        template: &Template,
    ) -> Exchange {
        let prompt = build_prompt(history, message, template);
        let reply = self.generate(prompt, config, template).await;

        match &reply {
            Ok(text) => {
                tracing::debug!(
                    model = %config.model,
                    turns = history.len() + 2,
                    reply_len = text.len(),
                    "exchange completed"
                );
                let history = history
                    .append(Role::User, message)
                    .append(Role::Assistant, text.as_str());
                Exchange { history, reply }
            }
            Err(err) => {
                tracing::warn!(model = %config.model, error = %err, "exchange failed");
                Exchange {
                    history: history.clone(),
                    reply,
                }
            }
        }
    }
}
