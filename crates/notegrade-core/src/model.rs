use serde::{Deserialize, Serialize};

/// One candidate notes document judged against a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub text: String,
}

impl Variant {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A reference document (e.g. one visit transcript) and the variants scored against it.
///
/// `reference_text == None` marks an invalid group; the orchestrator skips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceGroup {
    pub group_id: String,
    #[serde(default)]
    pub reference_text: Option<String>,
    pub variants: Vec<Variant>,
}

impl ReferenceGroup {
    pub fn new(group_id: impl Into<String>, reference_text: Option<String>) -> Self {
        Self {
            group_id: group_id.into(),
            reference_text,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.variants.push(Variant::new(name, text));
        self
    }
}

/// One unit of judge work produced by flattening the groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTask {
    pub group_id: String,
    pub variant_name: String,
    pub reference_text: String,
    pub variant_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Expected in 1..=10, but passed through unchanged from the judge.
    pub score: i32,
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub location: String,
    pub correction: String,
}

/// The judge's verdict on one (group, variant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub group_id: String,
    pub variant_name: String,
    pub detail: CriterionScore,
    pub accuracy: CriterionScore,
    pub issues: Vec<Issue>,
    pub summary: String,
    /// 0 until the ranker has seen the whole group.
    #[serde(default)]
    pub rank: u32,
}

impl ScoreRecord {
    /// Mean of detail and accuracy, unrounded.
    pub fn composite_score(&self) -> f64 {
        (f64::from(self.detail.score) + f64::from(self.accuracy.score)) / 2.0
    }

    pub fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub cached: bool,
    #[serde(default)]
    pub meta: serde_json::Value,
}
