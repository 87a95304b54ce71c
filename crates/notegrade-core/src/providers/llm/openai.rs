use super::{LlmClient, LlmRequest, ResponseFormat};
use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(
        model: String,
        api_key: String,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model,
            api_key,
            temperature,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at an OpenAI-compatible endpoint (proxy, local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, request: &LlmRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if request.format == ResponseFormat::Json {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

fn transport_error(err: reqwest::Error) -> anyhow::Error {
    let message = if err.is_timeout() {
        format!("request timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    anyhow::Error::new(ProviderError::new(
        "openai",
        err.status().map(|s| s.as_u16()),
        message,
    ))
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let body = self.build_body(request);

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            return Err(anyhow::Error::new(ProviderError::new(
                "openai",
                Some(status.as_u16()),
                error_text,
            )));
        }

        let json: serde_json::Value = resp.json().await.map_err(transport_error)?;

        // Parse choices[0].message.content
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let usage = json.get("usage").cloned().unwrap_or(serde_json::Value::Null);

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model: self.model.clone(),
            cached: false,
            meta: json!({
                "usage": {
                    "input_tokens": usage.get("prompt_tokens"),
                    "output_tokens": usage.get("completion_tokens"),
                }
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn fingerprint(&self) -> Option<String> {
        Some(format!("openai:{}", self.model))
    }
}
