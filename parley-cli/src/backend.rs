use std::sync::Arc;
use std::time::Duration;

use parley::{Generator, GoogleClient, ModelCatalog, OllamaClient, ParleyError};
use secrecy::SecretString;

use crate::cli::{BackendArgs, BackendKind};

/// A connected backend, type-erased so every command can share one code path.
pub struct Backend {
    pub kind: BackendKind,
    pub generator: Arc<dyn Generator>,
    pub catalog: Arc<dyn ModelCatalog>,
    pub model: String,
}

impl BackendArgs {
    pub fn model_name(&self) -> String {
        match self.model.as_deref().map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => match self.backend {
                BackendKind::Ollama => "tinyllama".to_string(),
                BackendKind::Google => "gemini-2.5-flash".to_string(),
            },
        }
    }

    pub fn connect(&self) -> Result<Backend, ParleyError> {
        let model = self.model_name();
        let timeout = Duration::from_secs(self.timeout_secs.max(1));

        let (generator, catalog) = match self.backend {
            BackendKind::Ollama => {
                let client =
                    Arc::new(OllamaClient::new(&self.ollama_url, model.clone())?.with_timeout(timeout)?);
                erase(client)
            }
            BackendKind::Google => {
                let client = match self.api_key.as_deref() {
                    Some(key) => GoogleClient::new(SecretString::new(key.to_string()), model.clone())?,
                    None => GoogleClient::from_env(model.clone())?,
                };
                let client = Arc::new(client.with_timeout(timeout)?);
                erase(client)
            }
        };

        tracing::debug!(backend = ?self.backend, %model, ?timeout, "backend ready");
        Ok(Backend {
            kind: self.backend,
            generator,
            catalog,
            model,
        })
    }
}

fn erase<C>(client: Arc<C>) -> (Arc<dyn Generator>, Arc<dyn ModelCatalog>)
where
    C: Generator + ModelCatalog + 'static,
{
    (client.clone(), client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(backend: BackendKind) -> BackendArgs {
        BackendArgs {
            backend,
            ollama_url: "http://localhost:11434".to_string(),
            model: None,
            api_key: None,
            timeout_secs: 60,
        }
    }

    #[test]
    fn default_model_follows_backend() {
        assert_eq!(args(BackendKind::Ollama).model_name(), "tinyllama");
        assert_eq!(args(BackendKind::Google).model_name(), "gemini-2.5-flash");

        let mut explicit = args(BackendKind::Ollama);
        explicit.model = Some(" qwen2.5:0.5b ".to_string());
        assert_eq!(explicit.model_name(), "qwen2.5:0.5b");
    }

    #[test]
    fn google_backend_uses_explicit_key() {
        let mut google = args(BackendKind::Google);
        google.api_key = Some("test-key".to_string());
        let backend = google.connect().expect("connect");
        assert_eq!(backend.kind, BackendKind::Google);
        assert_eq!(backend.model, "gemini-2.5-flash");
    }

    #[test]
    fn bad_ollama_url_is_a_config_error() {
        let mut ollama = args(BackendKind::Ollama);
        ollama.ollama_url = "localhost without scheme".to_string();
        assert!(matches!(
            ollama.connect().err(),
            Some(ParleyError::InvalidConfig(_))
        ));
    }
}
