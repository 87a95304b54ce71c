//! End-to-end: groups -> batch runner -> ranked records -> comparison report -> JSON.

use notegrade_core::engine::{BatchPolicy, BatchRunner, BatchStatus, Strategy};
use notegrade_core::judge::JudgeClient;
use notegrade_core::model::ReferenceGroup;
use notegrade_core::providers::llm::fake::FakeClient;
use notegrade_core::providers::llm::LlmRequest;
use notegrade_core::report::comparison::Insight;
use notegrade_core::report::json::{read_json, write_json, OutcomeDocument};
use notegrade_core::report::summarize;
use serde_json::json;
use std::sync::Arc;

/// Scores keyed on the variant name the prompt announces.
fn scripted_judge() -> Arc<FakeClient> {
    Arc::new(
        FakeClient::new("pipeline".into()).with_responder(Arc::new(|req: &LlmRequest| {
            let (detail, accuracy, falsehoods) = if req.prompt.contains("### Notes (notes-gpt4o)")
            {
                if req.prompt.contains("visit-a transcript") {
                    (9, 9, 0)
                } else {
                    (7, 7, 0)
                }
            } else if req.prompt.contains("### Notes (notes-claude)") {
                (8, 8, 0)
            } else {
                (5, 6, 3)
            };
            let falsehoods: Vec<_> = (0..falsehoods)
                .map(|i| {
                    json!({
                        "description": format!("invented finding {i}"),
                        "severity": "medium",
                        "location": "Assessment",
                        "correction": "remove"
                    })
                })
                .collect();
            json!({
                "detailScore": detail,
                "detailExplanation": "x",
                "detailExamples": [],
                "truthfulnessScore": accuracy,
                "truthfulnessExplanation": "y",
                "truthfulnessExamples": [],
                "falsehoods": falsehoods,
                "summary": "z"
            })
            .to_string()
        })),
    )
}

fn visits() -> Vec<ReferenceGroup> {
    ["visit-a", "visit-b"]
        .into_iter()
        .map(|id| {
            ReferenceGroup::new(id, Some(format!("{id} transcript")))
                .with_variant("notes-gpt4o", "gpt notes")
                .with_variant("notes-claude", "claude notes")
        })
        .collect()
}

#[tokio::test]
async fn two_visits_two_variants_end_to_end() {
    let fake = scripted_judge();
    let runner = BatchRunner::new(
        JudgeClient::new(fake.clone()),
        BatchPolicy::default().without_delays(),
    );

    let outcome = runner.run_batch(&visits(), None).await.unwrap();
    assert_eq!(outcome.strategy, Strategy::Direct);
    assert_eq!(outcome.status(), BatchStatus::Complete);
    assert_eq!(fake.calls(), 4);
    assert_eq!(outcome.judge.as_deref(), Some("fake:pipeline"));

    // visit-a: gpt4o 9.0 beats claude 8.0; visit-b: claude 8.0 beats gpt4o 7.0.
    let firsts: Vec<_> = outcome
        .records
        .iter()
        .filter(|r| r.rank == 1)
        .map(|r| (r.group_id.as_str(), r.variant_name.as_str()))
        .collect();
    assert_eq!(
        firsts,
        vec![("visit-a", "notes-gpt4o"), ("visit-b", "notes-claude")]
    );

    let report = summarize(&outcome.records);
    let gpt = report.variant("notes-gpt4o").unwrap();
    let claude = report.variant("notes-claude").unwrap();
    assert_eq!(gpt.mean_composite, 8.0);
    assert_eq!(claude.mean_composite, 8.0);
    assert_eq!(gpt.composite_variance, 1.0);
    assert_eq!(claude.composite_variance, 0.0);
    assert!(report.insights.iter().any(|i| matches!(
        i,
        Insight::MostConsistent { variant, .. } if variant == "notes-claude"
    )));
}

#[tokio::test]
async fn outcome_document_survives_a_disk_round_trip() {
    let mut groups = visits();
    groups.push(
        ReferenceGroup::new("visit-c", Some("visit-c transcript".into()))
            .with_variant("notes-draft", "draft")
            .with_variant("notes-claude", "claude notes"),
    );
    groups.push(ReferenceGroup::new("visit-d", None).with_variant("notes-draft", "draft"));

    let runner = BatchRunner::new(
        JudgeClient::new(scripted_judge()),
        BatchPolicy::default().without_delays(),
    );
    let outcome = runner.run_batch(&groups, None).await.unwrap();
    // 6 tasks: one past the direct limit.
    assert_eq!(outcome.strategy, Strategy::Chunked);
    assert_eq!(outcome.total_tasks, 6);
    assert_eq!(outcome.skipped_groups.len(), 1);

    let report = summarize(&outcome.records);
    let draft = report.variant("notes-draft").unwrap();
    assert_eq!(draft.issue_rate, 3.0);
    assert!(report.insights.contains(&Insight::RequiresAttention {
        variant: "notes-draft".into(),
        issue_rate: 3.0,
    }));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    write_json(&OutcomeDocument::new(outcome, report.clone()), &path).unwrap();

    let back = read_json(&path).unwrap();
    // Recomputing from the stored records gives the stored report.
    assert_eq!(summarize(&back.outcome.records), report);
    assert_eq!(back.report, report);
}
