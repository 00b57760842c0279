//! Range and threshold restriction over any dated or volumetric series.
//!
//! Filters return a fresh subsequence in input order; an empty result is valid.

use chrono::NaiveDate;

use crate::domain::{Dated, Volumetric};
use crate::error::AnalysisError;

/// Rows with `start <= date <= end`.
pub fn by_date_range<T: Dated + Clone>(
    series: &[T],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<T>, AnalysisError> {
    if start > end {
        return Err(AnalysisError::InvalidRange { start, end });
    }

    let mut out = Vec::new();
    for (row, item) in series.iter().enumerate() {
        let date = item.date().ok_or(AnalysisError::InvalidDate { row })?;
        if date >= start && date <= end {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Rows whose volume strictly exceeds `min_exclusive`.
pub fn by_volume_threshold<T: Volumetric + Clone>(records: &[T], min_exclusive: u64) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.volume() > min_exclusive)
        .cloned()
        .collect()
}
