use crate::cli::args::{JudgeArgs, RunArgs};
use anyhow::Context;
use notegrade_core::config::{load_config, EvalConfig};
use notegrade_core::engine::BatchRunner;
use notegrade_core::judge::JudgeClient;
use notegrade_core::providers::llm::fake::FakeClient;
use notegrade_core::providers::llm::openai::OpenAIClient;
use notegrade_core::providers::llm::tracing::TracingLlmClient;
use notegrade_core::providers::llm::{LlmClient, LlmRequest};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "notegrade.yaml";
const MAX_FAKE_ISSUES: usize = 3;

/// Explicit `--config`, else ./notegrade.yaml if present, else built-in defaults.
pub(crate) fn resolve_config(
    explicit: Option<&Path>,
) -> anyhow::Result<(EvalConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.is_file()),
    };
    match path {
        Some(p) => {
            let cfg = load_config(&p).with_context(|| format!("config {}", p.display()))?;
            Ok((cfg, Some(p)))
        }
        None => Ok((EvalConfig::default(), None)),
    }
}

pub(crate) fn apply_overrides(cfg: &mut EvalConfig, args: &RunArgs) {
    let JudgeArgs { judge, judge_model } = &args.judge;
    if let Some(p) = judge {
        cfg.judge.provider = p.clone();
    }
    if let Some(m) = judge_model {
        cfg.judge.model = m.clone();
    }
    if args.no_delay {
        cfg.batch = cfg.batch.clone().without_delays();
    }
}

pub(crate) fn build_llm_client(cfg: &EvalConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    let j = &cfg.judge;
    let inner: Arc<dyn LlmClient> = match j.provider.as_str() {
        "openai" => {
            let key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("judge provider 'openai' needs OPENAI_API_KEY"))?;
            let mut client = OpenAIClient::new(
                j.model.clone(),
                key,
                j.temperature,
                j.max_tokens,
                Duration::from_secs(j.timeout_secs),
            )?;
            if let Some(url) = &j.base_url {
                client = client.with_base_url(url.clone());
            }
            Arc::new(client)
        }
        "fake" => Arc::new(
            FakeClient::new(j.model.clone()).with_responder(Arc::new(overlap_verdict)),
        ),
        other => anyhow::bail!("unknown judge provider: {} (expected openai|fake)", other),
    };
    Ok(Arc::new(TracingLlmClient::new(inner)))
}

pub(crate) fn build_runner(cfg: &EvalConfig) -> anyhow::Result<BatchRunner> {
    let client = build_llm_client(cfg)?;
    Ok(BatchRunner::new(JudgeClient::new(client), cfg.batch.clone()))
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> &'a str {
    s.split_once(open)
        .and_then(|(_, rest)| rest.split_once(close))
        .map(|(inner, _)| inner)
        .unwrap_or_default()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn scale(covered: usize, total: usize) -> i64 {
    if total == 0 {
        return 1;
    }
    (1.0 + 9.0 * covered as f64 / total as f64).round() as i64
}

/// Offline judge: scores by word overlap between transcript and notes.
fn overlap_verdict(req: &LlmRequest) -> String {
    let reference = words(between(&req.prompt, "<transcript>\n", "\n</transcript>"));
    let notes = words(between(&req.prompt, "<notes>\n", "\n</notes>"));

    let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();
    let notes_set: HashSet<&str> = notes.iter().map(String::as_str).collect();

    let covered = reference_set.intersection(&notes_set).count();
    let detail = scale(covered, reference_set.len());

    let mut unsupported: Vec<&str> = notes_set.difference(&reference_set).copied().collect();
    unsupported.sort_unstable();
    let accuracy = scale(notes_set.len() - unsupported.len(), notes_set.len());

    let falsehoods: Vec<_> = unsupported
        .iter()
        .take(MAX_FAKE_ISSUES)
        .map(|w| {
            json!({
                "description": format!("'{w}' does not appear in the transcript"),
                "severity": "low",
                "location": w,
                "correction": "verify against the transcript"
            })
        })
        .collect();

    let total = reference_set.len();
    json!({
        "detailScore": detail,
        "detailExplanation": format!("{covered} of {total} transcript terms covered"),
        "detailExamples": [],
        "truthfulnessScore": accuracy,
        "truthfulnessExplanation": format!("{} unsupported terms", unsupported.len()),
        "truthfulnessExamples": [],
        "falsehoods": falsehoods,
        "summary": "word-overlap estimate"
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn request(transcript: &str, notes: &str) -> LlmRequest {
        LlmRequest::json(
            "system",
            format!(
                "<transcript>\n{transcript}\n</transcript>\n\n### Notes (n):\n<notes>\n{notes}\n</notes>\n"
            ),
        )
    }

    #[test]
    fn overlap_verdict_rewards_faithful_copies() {
        let req = request("cough for three days", "Cough, three days.");
        let v: serde_json::Value = serde_json::from_str(&overlap_verdict(&req)).unwrap();
        assert_eq!(v["truthfulnessScore"], 10);
        assert_eq!(v["detailScore"], 8);
        assert!(v["falsehoods"].as_array().unwrap().is_empty());
    }

    #[test]
    fn overlap_verdict_flags_unsupported_words() {
        let req = request("cough", "fever rash vomiting xray cough");
        let v: serde_json::Value = serde_json::from_str(&overlap_verdict(&req)).unwrap();
        assert_eq!(v["detailScore"], 10);
        assert_eq!(v["truthfulnessScore"], 3);
        assert_eq!(v["falsehoods"].as_array().unwrap().len(), MAX_FAKE_ISSUES);
        assert_eq!(v["falsehoods"][0]["location"], "fever");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut cfg = EvalConfig::default();
        cfg.judge.provider = "anthropic-v0".into();
        let err = build_llm_client(&cfg).err().unwrap();
        assert!(err.to_string().contains("unknown judge provider"));
    }

    #[test]
    #[serial]
    fn openai_without_key_is_a_config_error() {
        let saved = std::env::var("OPENAI_API_KEY").ok();
        std::env::remove_var("OPENAI_API_KEY");
        let err = build_llm_client(&EvalConfig::default()).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        if let Some(k) = saved {
            std::env::set_var("OPENAI_API_KEY", k);
        }
    }

    #[test]
    fn fake_provider_builds_without_network() {
        let mut cfg = EvalConfig::default();
        cfg.judge.provider = "fake".into();
        let client = build_llm_client(&cfg).unwrap();
        assert_eq!(client.provider_name(), "fake");
    }
}
