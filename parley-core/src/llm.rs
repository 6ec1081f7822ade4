use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{GenerationRequest, GenerationResult, ParleyError};

/// A text-generation backend: one prompt in, one text payload (or a
/// classified error) out. Implementations issue exactly one request per call
/// and never retry.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult;
}

#[async_trait::async_trait]
impl<T> Generator for Arc<T>
where
    T: Generator + ?Sized,
{
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        (**self).generate(request).await
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            display_name: None,
        }
    }
}

#[async_trait::async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ParleyError>;
}

#[async_trait::async_trait]
impl<T> ModelCatalog for Arc<T>
where
    T: ModelCatalog + ?Sized,
{
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ParleyError> {
        (**self).list_models().await
    }
}
