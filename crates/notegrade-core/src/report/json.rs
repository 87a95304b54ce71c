use crate::engine::BatchOutcome;
use crate::report::comparison::ComparisonReport;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bump when the outcome document layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDocument {
    pub schema_version: u32,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub report: ComparisonReport,
}

impl OutcomeDocument {
    pub fn new(outcome: BatchOutcome, report: ComparisonReport) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            outcome,
            report,
        }
    }
}

pub fn write_json(doc: &OutcomeDocument, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, serde_json::to_string_pretty(doc)?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

pub fn read_json(path: &Path) -> anyhow::Result<OutcomeDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc: OutcomeDocument = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse outcome document {}", path.display()))?;
    if doc.schema_version != SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema_version {} in {} (supported: {})",
            doc.schema_version,
            path.display(),
            SCHEMA_VERSION
        );
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{rank, Strategy};
    use crate::report::comparison::summarize;
    use crate::test_support::record;
    use chrono::Utc;

    fn document() -> OutcomeDocument {
        let records = rank(&[record("g", "a", 7, 8), record("g", "b", 9, 9)]);
        let report = summarize(&records);
        OutcomeDocument::new(
            BatchOutcome {
                run_id: "run-1".into(),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                strategy: Strategy::Direct,
                judge: Some("fake:mock".into()),
                is_partial: false,
                processed_tasks: 2,
                total_tasks: 2,
                records,
                failures: vec![],
                skipped_groups: vec![],
            },
            report,
        )
    }

    #[test]
    fn outcome_fields_are_top_level() {
        let v = serde_json::to_value(document()).unwrap();
        assert_eq!(v["schema_version"], 1);
        assert_eq!(v["strategy"], "direct");
        assert_eq!(v["records"][0]["variant_name"], "b");
        assert_eq!(v["records"][0]["rank"], 1);
        assert_eq!(v["report"]["variants"][0]["variant_name"], "b");
    }

    #[test]
    fn written_document_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/results.json");
        let doc = document();
        write_json(&doc, &path).unwrap();
        assert_eq!(read_json(&path).unwrap(), doc);
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut v = serde_json::to_value(document()).unwrap();
        v["schema_version"] = serde_json::json!(99);
        std::fs::write(&path, v.to_string()).unwrap();
        let err = read_json(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported schema_version 99"));
    }
}
