use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Throughput knobs for a batch run. Delays are explicit so tests can zero them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchPolicy {
    /// At most this many tasks run with the direct strategy.
    pub direct_limit: usize,
    /// At most this many tasks run chunked; above it the hard cap applies.
    pub chunk_limit: usize,
    pub chunk_size: usize,
    pub hard_cap: usize,
    pub direct_delay_ms: u64,
    pub chunk_delay_ms: u64,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            direct_limit: 5,
            chunk_limit: 100,
            chunk_size: 5,
            hard_cap: 50,
            direct_delay_ms: 1000,
            chunk_delay_ms: 100,
        }
    }
}

impl BatchPolicy {
    pub fn without_delays(mut self) -> Self {
        self.direct_delay_ms = 0;
        self.chunk_delay_ms = 0;
        self
    }

    pub fn direct_delay(&self) -> Duration {
        Duration::from_millis(self.direct_delay_ms)
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("batch.chunk_size must be at least 1".into());
        }
        if self.hard_cap == 0 {
            return Err("batch.hard_cap must be at least 1".into());
        }
        if self.hard_cap > self.chunk_limit {
            return Err(format!(
                "batch.hard_cap ({}) must not exceed batch.chunk_limit ({})",
                self.hard_cap, self.chunk_limit
            ));
        }
        if self.direct_limit > self.chunk_limit {
            return Err(format!(
                "batch.direct_limit ({}) must not exceed batch.chunk_limit ({})",
                self.direct_limit, self.chunk_limit
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Direct,
    Chunked,
    PartialCap,
}

impl Strategy {
    pub fn select(total_tasks: usize, policy: &BatchPolicy) -> Self {
        if total_tasks <= policy.direct_limit {
            Strategy::Direct
        } else if total_tasks <= policy.chunk_limit {
            Strategy::Chunked
        } else {
            Strategy::PartialCap
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Chunked => "chunked",
            Strategy::PartialCap => "partial_cap",
        }
    }
}

/// What a run will actually do for a given task count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExecutionPlan {
    pub(crate) strategy: Strategy,
    pub(crate) chunk_size: usize,
    pub(crate) delay: Duration,
    /// Number of tasks attempted, in enumeration order.
    pub(crate) attempt: usize,
}

impl ExecutionPlan {
    pub(crate) fn for_tasks(total_tasks: usize, policy: &BatchPolicy) -> Self {
        let strategy = Strategy::select(total_tasks, policy);
        match strategy {
            Strategy::Direct => Self {
                strategy,
                chunk_size: total_tasks.max(1),
                delay: policy.direct_delay(),
                attempt: total_tasks,
            },
            Strategy::Chunked => Self {
                strategy,
                chunk_size: policy.chunk_size.max(1),
                delay: policy.chunk_delay(),
                attempt: total_tasks,
            },
            Strategy::PartialCap => Self {
                strategy,
                chunk_size: policy.chunk_size.max(1),
                delay: policy.chunk_delay(),
                attempt: total_tasks.min(policy.hard_cap),
            },
        }
    }

    pub(crate) fn is_partial(&self, total_tasks: usize) -> bool {
        self.strategy == Strategy::PartialCap && self.attempt < total_tasks
    }
}
