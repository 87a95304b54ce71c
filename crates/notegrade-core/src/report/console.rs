use crate::engine::BatchOutcome;
use crate::report::comparison::ComparisonReport;
use crate::report::progress::{ProgressEvent, ProgressSink};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Deterministic progress line, e.g. `Judging 3/12: visit-1/notes-b`.
#[must_use]
pub fn format_progress_line(ev: &ProgressEvent) -> String {
    let suffix = if ev.succeeded { "" } else { " (failed)" };
    format!(
        "Judging {}/{}: {}/{}{}",
        ev.done, ev.total, ev.group_id, ev.variant_name, suffix
    )
}

pub fn emit_progress_line(line: &str) {
    eprintln!("{}", line);
}

const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

#[derive(Debug, Default)]
struct ProgressThrottle {
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    /// Step is sized from the event's own total, which is the capped task count.
    fn admit(&mut self, ev: &ProgressEvent, now: Instant) -> bool {
        if ev.total == 0 {
            return false;
        }
        let step = progress_step(ev.total);
        let forced = ev.done == ev.total || !ev.succeeded;
        let on_step = ev.done.is_multiple_of(step) || ev.done == 1;
        let interval_ok = self
            .last_emit
            .map(|t| {
                now.saturating_duration_since(t) >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
            })
            .unwrap_or(true);
        let ok = forced || (on_step && interval_ok);
        if ok {
            self.last_emit = Some(now);
        }
        ok
    }
}

/// Throttled stderr sink. Failures and the final event are always shown.
pub fn default_progress_sink(expected_tasks: usize) -> Option<ProgressSink> {
    if expected_tasks <= 1 {
        return None;
    }
    let state = Arc::new(Mutex::new(ProgressThrottle::default()));
    Some(Arc::new(move |ev: ProgressEvent| {
        let admitted = state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admit(&ev, Instant::now());
        if admitted {
            emit_progress_line(&format_progress_line(&ev));
        }
    }))
}

/// Per-group ranked table plus run accounting.
pub fn render_outcome(outcome: &BatchOutcome) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for r in &outcome.records {
        if current != Some(r.group_id.as_str()) {
            let _ = writeln!(out, "\n{}", r.group_id);
            current = Some(r.group_id.as_str());
        }
        let _ = writeln!(
            out,
            "  #{:<2} {:<24} detail {:>2}  accuracy {:>2}  composite {:>4.1}  issues {}",
            r.rank,
            r.variant_name,
            r.detail.score,
            r.accuracy.score,
            r.composite_score(),
            r.issues.len()
        );
    }

    for s in &outcome.skipped_groups {
        let _ = writeln!(out, "⏭️  {:<24} skipped ({})", s.group_id, s.reason.as_str());
    }
    for f in &outcome.failures {
        let _ = writeln!(out, "❌ {}/{}: {}", f.group_id, f.variant_name, f.message);
    }

    let _ = writeln!(
        out,
        "\nStrategy: {}  processed {}/{} tasks  scored {}  failed {}  skipped groups {}",
        outcome.strategy.as_str(),
        outcome.processed_tasks,
        outcome.total_tasks,
        outcome.records.len(),
        outcome.failures.len(),
        outcome.skipped_groups.len()
    );
    if outcome.is_partial {
        let _ = writeln!(
            out,
            "⚠️  Partial results: {} tasks were not judged (hard cap reached)",
            outcome.remaining_tasks()
        );
    }
    out
}

pub fn render_report(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nComparison across {} group(s), {} record(s)",
        report.groups_evaluated, report.records_evaluated
    );
    for v in &report.variants {
        let _ = writeln!(
            out,
            "  #{:<2} {:<24} mean {:>4.1}  detail {:>4.1}  accuracy {:>4.1}  issues/group {:.1}  variance {:.2}",
            v.rank,
            v.variant_name,
            v.display_composite(),
            v.mean_detail,
            v.mean_accuracy,
            v.issue_rate,
            v.composite_variance
        );
    }
    if !report.insights.is_empty() {
        let _ = writeln!(out);
        for line in report.commentary() {
            let _ = writeln!(out, "  - {}", line);
        }
    }
    out
}

pub fn print_outcome(outcome: &BatchOutcome, report: &ComparisonReport) {
    eprint!("{}", render_outcome(outcome));
    eprint!("{}", render_report(report));
}
