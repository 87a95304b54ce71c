//! Batch orchestration: enumerate (reference, variant) tasks, judge them one at a
//! time under a throughput strategy, absorb per-task failures, rank per group.
//!
//! Execution is strictly sequential. The inter-task delay is the only rate control;
//! there is no fan-out to the judge and no shared state besides the result vector.

mod plan;


pub use plan::{BatchPolicy, Strategy};

use crate::engine::ranker;
use crate::errors::{BatchError, JudgeError, SkipReason};
use crate::judge::JudgeClient;
use crate::model::{EvaluationTask, ReferenceGroup, ScoreRecord};
use crate::report::progress::{ProgressEvent, ProgressSink};
use chrono::{DateTime, Utc};
use plan::ExecutionPlan;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGroup {
    pub group_id: String,
    pub reason: SkipReason,
}

/// A task whose judge call failed; its record is absent from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub group_id: String,
    pub variant_name: String,
    /// `judge_call_failed` or `judge_response_invalid`.
    pub error: String,
    pub message: String,
}

impl TaskFailure {
    fn new(task: &EvaluationTask, err: &JudgeError) -> Self {
        Self {
            group_id: task.group_id.clone(),
            variant_name: task.variant_name.clone(),
            error: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Complete,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<String>,
    pub is_partial: bool,
    /// Tasks attempted (scored or failed).
    pub processed_tasks: usize,
    /// Tasks enumerated from the input, before any cap.
    pub total_tasks: usize,
    /// Ranked records, grouped in input order, best first within each group.
    pub records: Vec<ScoreRecord>,
    pub failures: Vec<TaskFailure>,
    pub skipped_groups: Vec<SkippedGroup>,
}

impl BatchOutcome {
    pub fn status(&self) -> BatchStatus {
        if self.is_partial {
            BatchStatus::Partial
        } else {
            BatchStatus::Complete
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Tasks left unattempted because of the hard cap.
    pub fn remaining_tasks(&self) -> usize {
        self.total_tasks.saturating_sub(self.processed_tasks)
    }
}

/// Flattened task list plus the groups that produced none.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub tasks: Vec<EvaluationTask>,
    pub skipped: Vec<SkippedGroup>,
}

/// Rejects input shapes that make group/variant identity ambiguous.
pub fn validate_groups(groups: &[ReferenceGroup]) -> Result<(), BatchError> {
    let mut seen_groups = HashSet::new();
    for group in groups {
        if group.group_id.trim().is_empty() {
            return Err(BatchError::aborted("group with empty group_id"));
        }
        if !seen_groups.insert(group.group_id.as_str()) {
            return Err(BatchError::aborted(format!(
                "duplicate group_id '{}'",
                group.group_id
            )));
        }
        let mut seen_variants = HashSet::new();
        for variant in &group.variants {
            if variant.name.trim().is_empty() {
                return Err(BatchError::aborted(format!(
                    "group '{}' has a variant with an empty name",
                    group.group_id
                )));
            }
            if !seen_variants.insert(variant.name.as_str()) {
                return Err(BatchError::aborted(format!(
                    "group '{}' has duplicate variant '{}'",
                    group.group_id, variant.name
                )));
            }
        }
    }
    Ok(())
}

/// Group order x variant order. Groups without a reference are skipped.
pub fn enumerate_tasks(groups: &[ReferenceGroup]) -> Enumeration {
    let mut out = Enumeration::default();
    for group in groups {
        let Some(reference_text) = group.reference_text.as_deref() else {
            warn!(group_id = %group.group_id, "reference document missing; skipping group");
            out.skipped.push(SkippedGroup {
                group_id: group.group_id.clone(),
                reason: SkipReason::ReferenceMissing,
            });
            continue;
        };
        if group.variants.is_empty() {
            warn!(group_id = %group.group_id, "group has no variants; skipping group");
            out.skipped.push(SkippedGroup {
                group_id: group.group_id.clone(),
                reason: SkipReason::NoVariants,
            });
            continue;
        }
        for variant in &group.variants {
            out.tasks.push(EvaluationTask {
                group_id: group.group_id.clone(),
                variant_name: variant.name.clone(),
                reference_text: reference_text.to_string(),
                variant_text: variant.text.clone(),
            });
        }
    }
    out
}

/// Ranks each group independently; groups keep first-seen order.
pub fn rank_by_group(records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut by_group: HashMap<String, Vec<ScoreRecord>> = HashMap::new();
    for record in records {
        if !by_group.contains_key(&record.group_id) {
            order.push(record.group_id.clone());
        }
        by_group
            .entry(record.group_id.clone())
            .or_default()
            .push(record);
    }

    let mut ranked = Vec::new();
    for group_id in order {
        if let Some(group) = by_group.remove(&group_id) {
            ranked.extend(ranker::rank(&group));
        }
    }
    ranked
}

pub struct BatchRunner {
    judge: JudgeClient,
    policy: BatchPolicy,
}

impl BatchRunner {
    pub fn new(judge: JudgeClient, policy: BatchPolicy) -> Self {
        Self { judge, policy }
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    /// Runs the batch to completion. Only malformed input fails the call;
    /// judge failures are absorbed into `BatchOutcome::failures`.
    pub async fn run_batch(
        &self,
        groups: &[ReferenceGroup],
        progress: Option<ProgressSink>,
    ) -> Result<BatchOutcome, BatchError> {
        validate_groups(groups)?;
        self.policy.validate().map_err(BatchError::aborted)?;

        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let Enumeration { tasks, skipped } = enumerate_tasks(groups);
        let total_tasks = tasks.len();
        let plan = ExecutionPlan::for_tasks(total_tasks, &self.policy);

        info!(
            run_id = %run_id,
            strategy = plan.strategy.as_str(),
            total_tasks,
            attempting = plan.attempt,
            skipped_groups = skipped.len(),
            "starting batch"
        );
        if plan.is_partial(total_tasks) {
            warn!(
                total_tasks,
                hard_cap = plan.attempt,
                "task count exceeds chunk limit; only the first {} tasks will be judged",
                plan.attempt
            );
        }

        let mut records = Vec::with_capacity(plan.attempt);
        let mut failures = Vec::new();
        let mut done = 0usize;

        for (chunk_idx, chunk) in tasks[..plan.attempt].chunks(plan.chunk_size).enumerate() {
            debug!(chunk = chunk_idx + 1, size = chunk.len(), "judging chunk");
            for task in chunk {
                if done > 0 && !plan.delay.is_zero() {
                    tokio::time::sleep(plan.delay).await;
                }

                let succeeded = match self.judge.evaluate_task(task).await {
                    Ok(record) => {
                        debug!(
                            group_id = %task.group_id,
                            variant = %task.variant_name,
                            composite = record.composite_score(),
                            "task scored"
                        );
                        records.push(record);
                        true
                    }
                    Err(e) => {
                        warn!(
                            group_id = %task.group_id,
                            variant = %task.variant_name,
                            error = %e,
                            "task failed; continuing"
                        );
                        failures.push(TaskFailure::new(task, &e));
                        false
                    }
                };

                done += 1;
                if let Some(ref sink) = progress {
                    sink(ProgressEvent {
                        done,
                        total: plan.attempt,
                        group_id: task.group_id.clone(),
                        variant_name: task.variant_name.clone(),
                        succeeded,
                    });
                }
            }
        }

        let records = rank_by_group(records);
        let is_partial = plan.is_partial(total_tasks);

        info!(
            run_id = %run_id,
            scored = records.len(),
            failed = failures.len(),
            processed = done,
            total_tasks,
            is_partial,
            "batch finished"
        );

        Ok(BatchOutcome {
            run_id,
            started_at,
            finished_at: Utc::now(),
            strategy: plan.strategy,
            judge: self.judge.fingerprint(),
            is_partial,
            processed_tasks: done,
            total_tasks,
            records,
            failures,
            skipped_groups: skipped,
        })
    }
}
