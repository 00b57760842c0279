//! Memoized daily aggregation.
//!
//! The cache key is the complete record set, compared structurally, so two
//! different logs can never share an entry.

use std::collections::HashMap;

use crate::analysis::volume::daily;
use crate::domain::{DailyVolume, TrainingRecord};

#[derive(Debug, Default)]
pub struct DailyCache {
    entries: HashMap<Vec<TrainingRecord>, Vec<DailyVolume>>,
    hits: usize,
}

impl DailyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Daily totals for `records`, computed at most once per distinct record set.
    pub fn daily(&mut self, records: &[TrainingRecord]) -> Vec<DailyVolume> {
        if let Some(found) = self.entries.get(records) {
            self.hits += 1;
            return found.clone();
        }
        let computed = daily(records);
        self.entries.insert(records.to_vec(), computed.clone());
        computed
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
