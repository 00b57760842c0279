//! Session volume and per-day aggregation.
//!
//! A session's volume is either supplied directly or derived from its
//! components:
//!
//! ```text
//! volume = arrows + floor(secs / 10) + floor(reps / 2)
//! ```
//!
//! Days without sessions are not synthesized: the daily series only contains
//! dates that appear in the log.

use std::collections::BTreeMap;

use crate::domain::{DailyVolume, TrainingRecord, Workload};

/// Volume of a single session.
pub fn record_volume(record: &TrainingRecord) -> u64 {
    match record.workload {
        Workload::Volume(v) => u64::from(v),
        Workload::Components { arrows, secs, reps } => {
            let arrows = u64::from(arrows.unwrap_or(0));
            let secs = u64::from(secs.unwrap_or(0));
            let reps = u64::from(reps.unwrap_or(0));
            arrows + secs / 10 + reps / 2
        }
    }
}

/// Sum session volumes per date, ascending by date.
pub fn daily(records: &[TrainingRecord]) -> Vec<DailyVolume> {
    let mut totals: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.date).or_insert(0) += record_volume(r);
    }

    totals
        .into_iter()
        .map(|(date, total)| DailyVolume { date, total })
        .collect()
}

/// Sessions whose volume strictly exceeds `value`, in input order.
pub fn above_threshold(records: &[TrainingRecord], value: u64) -> Vec<TrainingRecord> {
    records
        .iter()
        .filter(|r| record_volume(r) > value)
        .copied()
        .collect()
}
