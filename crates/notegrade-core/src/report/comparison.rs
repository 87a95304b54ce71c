//! Cross-group comparison of note variants.
//!
//! Pure arithmetic over already-collected records: the same input always yields the
//! same aggregates and the same commentary. No judge calls happen here.

use crate::model::{ScoreRecord, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const SIGNIFICANT_GAP: f64 = 2.0;
pub const MODERATE_GAP: f64 = 1.0;
pub const EXCEPTIONAL_VARIANCE: f64 = 0.5;
pub const HIGH_VARIANCE: f64 = 2.0;
pub const ATTENTION_ISSUE_RATE: f64 = 2.0;
pub const HIGH_QUALITY_SCORE: f64 = 8.0;
pub const LOW_QUALITY_SCORE: f64 = 6.0;

/// Statistics for one variant name across every group it appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAggregate {
    pub variant_name: String,
    /// 1 = best mean composite.
    pub rank: u32,
    pub groups: usize,
    pub mean_detail: f64,
    pub mean_accuracy: f64,
    pub mean_composite: f64,
    pub total_issues: usize,
    pub high_severity_issues: usize,
    /// Issues per group containing this variant.
    pub issue_rate: f64,
    /// Population variance of the per-group composite score.
    pub composite_variance: f64,
}

impl VariantAggregate {
    /// Mean composite rounded to one decimal, for display only.
    pub fn display_composite(&self) -> f64 {
        round1(self.mean_composite)
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapLevel {
    Significant,
    Moderate,
    Consistent,
}

impl GapLevel {
    pub fn from_difference(diff: f64) -> Self {
        if diff > SIGNIFICANT_GAP {
            GapLevel::Significant
        } else if diff > MODERATE_GAP {
            GapLevel::Moderate
        } else {
            GapLevel::Consistent
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    PerformanceGap {
        level: GapLevel,
        best: String,
        worst: String,
        difference: f64,
    },
    DetailAccuracyDivergence {
        detail_leader: String,
        accuracy_leader: String,
    },
    ClearWinner {
        variant: String,
    },
    MostConsistent {
        variant: String,
        variance: f64,
        exceptional: bool,
    },
    HighVariation {
        variant: String,
        variance: f64,
    },
    PerfectAccuracy {
        variant: String,
    },
    RequiresAttention {
        variant: String,
        issue_rate: f64,
    },
    HighQuality {
        variant: String,
        mean_composite: f64,
    },
    BelowThreshold {
        variant: String,
        mean_composite: f64,
    },
}

impl std::fmt::Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insight::PerformanceGap {
                level: GapLevel::Significant,
                best,
                worst,
                difference,
            } => write!(
                f,
                "Significant performance gap: {best} outscores {worst} by {difference:.1} points."
            ),
            Insight::PerformanceGap {
                level: GapLevel::Moderate,
                best,
                worst,
                difference,
            } => write!(
                f,
                "Moderate performance gap: {best} outscores {worst} by {difference:.1} points."
            ),
            Insight::PerformanceGap {
                level: GapLevel::Consistent,
                difference,
                ..
            } => write!(
                f,
                "Consistent performance across note types (spread of {difference:.1} points)."
            ),
            Insight::DetailAccuracyDivergence {
                detail_leader,
                accuracy_leader,
            } => write!(
                f,
                "{detail_leader} captures the most detail while {accuracy_leader} is the most accurate; \
                 choose based on whether completeness or accuracy matters more."
            ),
            Insight::ClearWinner { variant } => write!(
                f,
                "{variant} is the clear winner: it leads on detail, accuracy and overall score."
            ),
            Insight::MostConsistent {
                variant,
                variance,
                exceptional: true,
            } => write!(
                f,
                "{variant} shows exceptional consistency across transcripts (variance {variance:.2})."
            ),
            Insight::MostConsistent {
                variant, variance, ..
            } => write!(
                f,
                "{variant} is the most consistent across transcripts (variance {variance:.2})."
            ),
            Insight::HighVariation { variant, variance } => write!(
                f,
                "{variant} shows significant variation across transcripts (variance {variance:.2})."
            ),
            Insight::PerfectAccuracy { variant } => write!(
                f,
                "{variant} achieved perfect accuracy: no issues found in any transcript."
            ),
            Insight::RequiresAttention {
                variant,
                issue_rate,
            } => write!(
                f,
                "{variant} requires attention: {issue_rate:.1} issues per transcript on average."
            ),
            Insight::HighQuality {
                variant,
                mean_composite,
            } => write!(
                f,
                "{variant} meets the high-quality bar (mean score {mean_composite:.1})."
            ),
            Insight::BelowThreshold {
                variant,
                mean_composite,
            } => write!(
                f,
                "{variant} falls below the quality threshold (mean score {mean_composite:.1})."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub groups_evaluated: usize,
    pub records_evaluated: usize,
    /// Best mean composite first.
    pub variants: Vec<VariantAggregate>,
    pub insights: Vec<Insight>,
}

impl ComparisonReport {
    pub fn best(&self) -> Option<&VariantAggregate> {
        self.variants.first()
    }

    pub fn variant(&self, name: &str) -> Option<&VariantAggregate> {
        self.variants.iter().find(|v| v.variant_name == name)
    }

    pub fn commentary(&self) -> Vec<String> {
        self.insights.iter().map(ToString::to_string).collect()
    }
}

struct Accumulator<'a> {
    name: &'a str,
    groups: HashSet<&'a str>,
    composites: Vec<f64>,
    detail_sum: f64,
    accuracy_sum: f64,
    issues: usize,
    high_issues: usize,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Index of the first maximum under `key`, so ties go to the first-seen variant.
fn leader_by<F>(variants: &[VariantAggregate], key: F) -> Option<usize>
where
    F: Fn(&VariantAggregate) -> f64,
{
    let mut best: Option<usize> = None;
    for (i, v) in variants.iter().enumerate() {
        match best {
            Some(b) if key(v) <= key(&variants[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

fn trailer_by<F>(variants: &[VariantAggregate], key: F) -> Option<usize>
where
    F: Fn(&VariantAggregate) -> f64,
{
    let mut worst: Option<usize> = None;
    for (i, v) in variants.iter().enumerate() {
        match worst {
            Some(w) if key(v) >= key(&variants[w]) => {}
            _ => worst = Some(i),
        }
    }
    worst
}

fn aggregate(records: &[ScoreRecord]) -> Vec<VariantAggregate> {
    let mut order: Vec<Accumulator<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let i = *index.entry(r.variant_name.as_str()).or_insert_with(|| {
            order.push(Accumulator {
                name: r.variant_name.as_str(),
                groups: HashSet::new(),
                composites: Vec::new(),
                detail_sum: 0.0,
                accuracy_sum: 0.0,
                issues: 0,
                high_issues: 0,
            });
            order.len() - 1
        });
        let acc = &mut order[i];
        acc.groups.insert(r.group_id.as_str());
        acc.composites.push(r.composite_score());
        acc.detail_sum += f64::from(r.detail.score);
        acc.accuracy_sum += f64::from(r.accuracy.score);
        acc.issues += r.issues.len();
        acc.high_issues += r
            .issues
            .iter()
            .filter(|i| i.severity == Severity::High)
            .count();
    }

    order
        .into_iter()
        .map(|acc| {
            let n = acc.composites.len() as f64;
            let groups = acc.groups.len();
            VariantAggregate {
                variant_name: acc.name.to_string(),
                rank: 0,
                groups,
                mean_detail: acc.detail_sum / n,
                mean_accuracy: acc.accuracy_sum / n,
                mean_composite: mean(&acc.composites),
                total_issues: acc.issues,
                high_severity_issues: acc.high_issues,
                issue_rate: acc.issues as f64 / groups as f64,
                composite_variance: population_variance(&acc.composites),
            }
        })
        .collect()
}

fn derive_insights(ranked: &[VariantAggregate]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if ranked.len() >= 2 {
        let best = &ranked[0];
        let worst = &ranked[ranked.len() - 1];
        let difference = best.mean_composite - worst.mean_composite;
        insights.push(Insight::PerformanceGap {
            level: GapLevel::from_difference(difference),
            best: best.variant_name.clone(),
            worst: worst.variant_name.clone(),
            difference,
        });
    }

    if let (Some(d), Some(a)) = (
        leader_by(ranked, |v| v.mean_detail),
        leader_by(ranked, |v| v.mean_accuracy),
    ) {
        if d != a {
            insights.push(Insight::DetailAccuracyDivergence {
                detail_leader: ranked[d].variant_name.clone(),
                accuracy_leader: ranked[a].variant_name.clone(),
            });
        } else if d == 0 && ranked.len() >= 2 {
            insights.push(Insight::ClearWinner {
                variant: ranked[d].variant_name.clone(),
            });
        }
    }

    if ranked.len() >= 2 {
        if let Some(i) = trailer_by(ranked, |v| v.composite_variance) {
            let v = &ranked[i];
            insights.push(Insight::MostConsistent {
                variant: v.variant_name.clone(),
                variance: v.composite_variance,
                exceptional: v.composite_variance < EXCEPTIONAL_VARIANCE,
            });
        }
    }
    if let Some(i) = leader_by(ranked, |v| v.composite_variance) {
        let v = &ranked[i];
        if v.composite_variance > HIGH_VARIANCE {
            insights.push(Insight::HighVariation {
                variant: v.variant_name.clone(),
                variance: v.composite_variance,
            });
        }
    }

    for v in ranked {
        if v.total_issues == 0 {
            insights.push(Insight::PerfectAccuracy {
                variant: v.variant_name.clone(),
            });
        } else if v.issue_rate >= ATTENTION_ISSUE_RATE {
            insights.push(Insight::RequiresAttention {
                variant: v.variant_name.clone(),
                issue_rate: v.issue_rate,
            });
        }
    }

    for v in ranked {
        if v.mean_composite >= HIGH_QUALITY_SCORE {
            insights.push(Insight::HighQuality {
                variant: v.variant_name.clone(),
                mean_composite: v.mean_composite,
            });
        } else if v.mean_composite < LOW_QUALITY_SCORE {
            insights.push(Insight::BelowThreshold {
                variant: v.variant_name.clone(),
                mean_composite: v.mean_composite,
            });
        }
    }

    insights
}

/// Aggregates ranked records by variant name and derives comparative commentary.
pub fn summarize(records: &[ScoreRecord]) -> ComparisonReport {
    let mut variants = aggregate(records);

    // Stable: equal means keep first-seen order.
    variants.sort_by(|a, b| {
        b.mean_composite
            .partial_cmp(&a.mean_composite)
            .unwrap_or(Ordering::Equal)
    });
    for (pos, v) in variants.iter_mut().enumerate() {
        v.rank = pos as u32 + 1;
    }

    let groups_evaluated = records
        .iter()
        .map(|r| r.group_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    ComparisonReport {
        groups_evaluated,
        records_evaluated: records.len(),
        insights: derive_insights(&variants),
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Issue;
    use crate::test_support::record;

    fn with_issues(mut r: ScoreRecord, severities: &[Severity]) -> ScoreRecord {
        r.issues = severities
            .iter()
            .enumerate()
            .map(|(i, s)| Issue {
                id: format!("issue-{}", i + 1),
                description: "d".into(),
                severity: *s,
                location: "l".into(),
                correction: "c".into(),
            })
            .collect();
        r
    }

    #[test]
    fn cross_group_means_and_variance() {
        let records = vec![
            record("visit-1", "notes-gpt4o", 9, 9),
            record("visit-1", "notes-claude", 8, 8),
            record("visit-2", "notes-gpt4o", 7, 7),
            record("visit-2", "notes-claude", 8, 8),
        ];
        let report = summarize(&records);

        let gpt = report.variant("notes-gpt4o").unwrap();
        assert_eq!(gpt.mean_composite, 8.0);
        assert_eq!(gpt.composite_variance, 1.0);
        assert_eq!(gpt.groups, 2);

        let claude = report.variant("notes-claude").unwrap();
        assert_eq!(claude.mean_composite, 8.0);
        assert_eq!(claude.composite_variance, 0.0);

        // Tied means: first-seen keeps rank 1.
        assert_eq!(gpt.rank, 1);
        assert_eq!(claude.rank, 2);

        assert!(report.insights.contains(&Insight::MostConsistent {
            variant: "notes-claude".into(),
            variance: 0.0,
            exceptional: true,
        }));
        assert_eq!(report.groups_evaluated, 2);
        assert_eq!(report.records_evaluated, 4);
    }

    #[test]
    fn gap_levels_follow_fixed_thresholds() {
        assert_eq!(GapLevel::from_difference(2.5), GapLevel::Significant);
        assert_eq!(GapLevel::from_difference(2.0), GapLevel::Moderate);
        assert_eq!(GapLevel::from_difference(1.5), GapLevel::Moderate);
        assert_eq!(GapLevel::from_difference(1.0), GapLevel::Consistent);
    }

    #[test]
    fn clear_winner_when_one_variant_leads_everything() {
        let records = vec![
            record("g1", "best", 9, 9),
            record("g1", "worst", 4, 5),
            record("g2", "best", 9, 8),
            record("g2", "worst", 5, 4),
        ];
        let report = summarize(&records);
        assert!(report.insights.contains(&Insight::ClearWinner {
            variant: "best".into()
        }));
        assert!(matches!(
            report.insights[0],
            Insight::PerformanceGap {
                level: GapLevel::Significant,
                ..
            }
        ));
        assert!(report.insights.contains(&Insight::BelowThreshold {
            variant: "worst".into(),
            mean_composite: 4.5,
        }));
        assert!(report.insights.contains(&Insight::HighQuality {
            variant: "best".into(),
            mean_composite: 8.75,
        }));
    }

    #[test]
    fn divergence_when_detail_and_accuracy_leaders_differ() {
        let records = vec![record("g", "thorough", 9, 6), record("g", "careful", 6, 9)];
        let report = summarize(&records);
        assert!(report.insights.contains(&Insight::DetailAccuracyDivergence {
            detail_leader: "thorough".into(),
            accuracy_leader: "careful".into(),
        }));
        assert!(!report
            .insights
            .iter()
            .any(|i| matches!(i, Insight::ClearWinner { .. })));
    }

    #[test]
    fn safety_flags_use_issue_rate_per_group() {
        let records = vec![
            with_issues(record("g1", "clean", 8, 8), &[]),
            with_issues(
                record("g1", "sloppy", 7, 5),
                &[Severity::High, Severity::Low, Severity::Medium],
            ),
            with_issues(record("g2", "clean", 8, 8), &[]),
            with_issues(record("g2", "sloppy", 7, 5), &[Severity::High]),
        ];
        let report = summarize(&records);

        let sloppy = report.variant("sloppy").unwrap();
        assert_eq!(sloppy.total_issues, 4);
        assert_eq!(sloppy.high_severity_issues, 2);
        assert_eq!(sloppy.issue_rate, 2.0);

        assert!(report.insights.contains(&Insight::PerfectAccuracy {
            variant: "clean".into()
        }));
        assert!(report.insights.contains(&Insight::RequiresAttention {
            variant: "sloppy".into(),
            issue_rate: 2.0,
        }));
    }

    #[test]
    fn high_variation_flagged_above_two() {
        let records = vec![
            record("g1", "erratic", 10, 10),
            record("g2", "erratic", 4, 4),
            record("g1", "steady", 7, 7),
            record("g2", "steady", 7, 7),
        ];
        let report = summarize(&records);
        assert!(report.insights.contains(&Insight::HighVariation {
            variant: "erratic".into(),
            variance: 9.0,
        }));
    }

    #[test]
    fn summarize_is_idempotent() {
        let records = vec![
            with_issues(record("g1", "a", 9, 7), &[Severity::Medium]),
            record("g1", "b", 6, 8),
            record("g2", "a", 5, 9),
            record("g2", "b", 8, 8),
            record("g3", "c", 3, 4),
        ];
        let first = serde_json::to_string(&summarize(&records)).unwrap();
        let second = serde_json::to_string(&summarize(&records)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = summarize(&[]);
        assert!(report.variants.is_empty());
        assert!(report.insights.is_empty());
        assert!(report.best().is_none());
    }

    #[test]
    fn display_rounding_is_presentation_only() {
        let records = vec![
            record("g1", "a", 8, 7),
            record("g2", "a", 8, 8),
            record("g3", "a", 8, 8),
        ];
        let report = summarize(&records);
        let a = report.variant("a").unwrap();
        assert!((a.mean_composite - 47.0 / 6.0).abs() < 1e-12);
        assert_eq!(a.display_composite(), 7.8);
    }

    #[test]
    fn commentary_renders_every_insight() {
        let records = vec![record("g", "a", 9, 9), record("g", "b", 5, 5)];
        let report = summarize(&records);
        let text = report.commentary();
        assert_eq!(text.len(), report.insights.len());
        assert!(text[0].starts_with("Significant performance gap: a outscores b by 4.0"));
    }
}
