//! Parse boundary for judge output. Anything that does not match the schema
//! exactly is rejected as `JudgeResponseInvalid`.

use crate::errors::JudgeError;
use crate::model::{CriterionScore, Issue, ScoreRecord, Severity};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct JudgeVerdict {
    pub(crate) detail_score: i32,
    pub(crate) detail_explanation: String,
    pub(crate) detail_examples: Vec<String>,
    pub(crate) truthfulness_score: i32,
    pub(crate) truthfulness_explanation: String,
    pub(crate) truthfulness_examples: Vec<String>,
    pub(crate) falsehoods: Vec<Falsehood>,
    pub(crate) summary: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Falsehood {
    pub(crate) description: String,
    pub(crate) severity: Severity,
    pub(crate) location: String,
    pub(crate) correction: String,
}

/// Extracts the first JSON value from the judge text (tolerating code fences or a
/// preamble) and validates it against the verdict schema.
pub(crate) fn parse_verdict(text: &str) -> Result<JudgeVerdict, JudgeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(JudgeError::response_invalid("empty response"));
    }

    let json_start_idx = text
        .find('{')
        .ok_or_else(|| JudgeError::response_invalid("no JSON object found in judge output"))?;
    let json_segment = &text[json_start_idx..];

    let val: serde_json::Value = serde_json::Deserializer::from_str(json_segment)
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| JudgeError::response_invalid("no JSON object found in judge output"))?
        .map_err(|e| JudgeError::response_invalid(format!("invalid JSON: {e}")))?;

    serde_json::from_value(val)
        .map_err(|e| JudgeError::response_invalid(format!("schema violation: {e}")))
}

impl JudgeVerdict {
    pub(crate) fn into_record(self, group_id: &str, variant_name: &str) -> ScoreRecord {
        let issues = self
            .falsehoods
            .into_iter()
            .enumerate()
            .map(|(i, f)| Issue {
                id: format!("issue-{}", i + 1),
                description: f.description,
                severity: f.severity,
                location: f.location,
                correction: f.correction,
            })
            .collect();

        ScoreRecord {
            group_id: group_id.to_string(),
            variant_name: variant_name.to_string(),
            detail: CriterionScore {
                score: self.detail_score,
                explanation: self.detail_explanation,
                examples: self.detail_examples,
            },
            accuracy: CriterionScore {
                score: self.truthfulness_score,
                explanation: self.truthfulness_explanation,
                examples: self.truthfulness_examples,
            },
            issues,
            summary: self.summary,
            rank: 0,
        }
    }
}
