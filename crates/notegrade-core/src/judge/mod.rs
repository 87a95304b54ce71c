mod prompt;
mod response;


use crate::errors::JudgeError;
use crate::model::{EvaluationTask, ScoreRecord};
use crate::providers::llm::{LlmClient, LlmRequest};
use std::sync::Arc;
use tracing::debug;

/// Scores one (reference, variant) pair with an LLM judge.
///
/// Makes exactly one provider call per evaluation. Retries are not attempted here;
/// scores outside 1..=10 are passed through as returned.
#[derive(Clone)]
pub struct JudgeClient {
    client: Arc<dyn LlmClient>,
}

impl JudgeClient {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    pub fn fingerprint(&self) -> Option<String> {
        self.client.fingerprint()
    }

    pub async fn evaluate(
        &self,
        group_id: &str,
        reference_text: &str,
        variant_text: &str,
        variant_name: &str,
    ) -> Result<ScoreRecord, JudgeError> {
        let request = LlmRequest::json(
            prompt::SYSTEM_PROMPT,
            prompt::build_prompt(reference_text, variant_text, variant_name),
        );

        let resp = self
            .client
            .complete(&request)
            .await
            .map_err(|e| JudgeError::from_provider(&e))?;

        debug!(
            group_id,
            variant = variant_name,
            response_chars = resp.text.len(),
            "judge responded"
        );

        let verdict = response::parse_verdict(&resp.text)?;
        Ok(verdict.into_record(group_id, variant_name))
    }

    pub async fn evaluate_task(&self, task: &EvaluationTask) -> Result<ScoreRecord, JudgeError> {
        self.evaluate(
            &task.group_id,
            &task.reference_text,
            &task.variant_text,
            &task.variant_name,
        )
        .await
    }
}
