pub mod fake;
pub mod openai;
pub mod tracing;

use crate::model::LlmResponse;
use async_trait::async_trait;

/// Response shape the caller asks the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Provider-side JSON mode; the caller still validates the payload.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    pub system: String,
    pub prompt: String,
    pub format: ResponseFormat,
}

impl LlmRequest {
    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    /// Identifies provider + model, used in logs and outcome documents.
    fn fingerprint(&self) -> Option<String> {
        None
    }
}
