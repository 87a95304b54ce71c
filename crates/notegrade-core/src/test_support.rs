use crate::model::{CriterionScore, ScoreRecord};
use serde_json::json;

/// Schema-conforming judge output with `issues` high-severity falsehoods.
pub(crate) fn verdict_json(detail: i32, accuracy: i32, issues: usize) -> String {
    let falsehoods: Vec<_> = (0..issues)
        .map(|i| {
            json!({
                "description": format!("unsupported claim {}", i + 1),
                "severity": "high",
                "location": "Plan",
                "correction": "remove"
            })
        })
        .collect();
    json!({
        "detailScore": detail,
        "detailExplanation": "covers history and plan",
        "detailExamples": ["medication list"],
        "truthfulnessScore": accuracy,
        "truthfulnessExplanation": "mostly faithful",
        "truthfulnessExamples": ["dosage matches"],
        "falsehoods": falsehoods,
        "summary": "solid note"
    })
    .to_string()
}

pub(crate) fn record(group_id: &str, variant: &str, detail: i32, accuracy: i32) -> ScoreRecord {
    ScoreRecord {
        group_id: group_id.to_string(),
        variant_name: variant.to_string(),
        detail: CriterionScore {
            score: detail,
            explanation: String::new(),
            examples: vec![],
        },
        accuracy: CriterionScore {
            score: accuracy,
            explanation: String::new(),
            examples: vec![],
        },
        issues: vec![],
        summary: String::new(),
        rank: 0,
    }
}
