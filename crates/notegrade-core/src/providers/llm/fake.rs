use super::{LlmClient, LlmRequest};
use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type Responder = Arc<dyn Fn(&LlmRequest) -> String + Send + Sync>;

/// Deterministic in-process provider for tests and offline runs.
///
/// Answers come from, in order: the scripted queue, the responder, the fixed response.
pub struct FakeClient {
    model: String,
    fixed_response: Option<String>,
    responder: Option<Responder>,
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl std::fmt::Debug for FakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeClient")
            .field("model", &self.model)
            .field("fixed_response", &self.fixed_response)
            .finish_non_exhaustive()
    }
}

impl FakeClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            fixed_response: None,
            responder: None,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: String) -> Self {
        self.fixed_response = Some(response);
        self
    }

    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Queue of one-shot answers; `Err(msg)` is raised as a provider failure.
    pub fn with_script(self, script: Vec<Result<String, String>>) -> Self {
        *self.script.lock().unwrap_or_else(|e| e.into_inner()) = script.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let text = match scripted {
            Some(Ok(text)) => text,
            Some(Err(message)) => {
                return Err(anyhow::Error::new(ProviderError::new("fake", None, message)));
            }
            None => match (&self.responder, &self.fixed_response) {
                (Some(responder), _) => responder(request),
                (None, Some(fixed)) => fixed.clone(),
                (None, None) => String::new(),
            },
        };

        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            cached: false,
            meta: serde_json::json!({}),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn fingerprint(&self) -> Option<String> {
        Some(format!("fake:{}", self.model))
    }
}
