//! Per-group ranking. The only place ranks are assigned.

use crate::model::ScoreRecord;
use std::cmp::Ordering;

/// Orders records of one group by composite score (descending) and assigns
/// dense ranks starting at 1. Ties keep their input order.
pub fn rank(records: &[ScoreRecord]) -> Vec<ScoreRecord> {
    let mut ranked: Vec<ScoreRecord> = records.to_vec();

    // `sort_by` is stable: equal composites stay in first-seen order.
    ranked.sort_by(|a, b| {
        b.composite_score()
            .partial_cmp(&a.composite_score())
            .unwrap_or(Ordering::Equal)
    });

    for (pos, record) in ranked.iter_mut().enumerate() {
        record.rank = pos as u32 + 1;
    }
    ranked
}
