//! Progress reporting for batch runs. The orchestrator emits one event per
//! settled task (scored or failed); the console layer consumes via a sink.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Tasks settled so far, including this one.
    pub done: usize,
    /// Tasks that will be attempted in this run (after any cap).
    pub total: usize,
    pub group_id: String,
    pub variant_name: String,
    pub succeeded: bool,
}

/// Sink for progress events. Implementations may throttle.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
