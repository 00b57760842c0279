//! Long <-> wide reshaping of the smoothed series.
//!
//! The wide table has one row per date and one column per window label, in the
//! order labels are first seen in the long series. Cells are `None` where the
//! long series has no point for that `(date, label)` pair, so the reshape is
//! lossless in both directions.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EwmPoint, WindowLabel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
    pub date: NaiveDate,
    pub values: Vec<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WideTable {
    pub labels: Vec<WindowLabel>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn column_index(&self, label: WindowLabel) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    /// Values of one column, `None` where missing.
    pub fn column(&self, label: WindowLabel) -> Option<Vec<Option<i64>>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// "Value now vs value at the start of the range" for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub label: WindowLabel,
    pub start: i64,
    pub now: i64,
    pub delta: i64,
}

/// Reshape long points into a date-indexed table.
pub fn pivot(points: &[EwmPoint]) -> WideTable {
    let mut labels: Vec<WindowLabel> = Vec::new();
    let mut index: HashMap<WindowLabel, usize> = HashMap::new();
    for p in points {
        index.entry(p.window).or_insert_with(|| {
            labels.push(p.window);
            labels.len() - 1
        });
    }

    let mut rows: BTreeMap<NaiveDate, Vec<Option<i64>>> = BTreeMap::new();
    for p in points {
        let cells = rows.entry(p.date).or_insert_with(|| vec![None; labels.len()]);
        cells[index[&p.window]] = Some(p.value);
    }

    WideTable {
        labels,
        rows: rows
            .into_iter()
            .map(|(date, values)| WideRow { date, values })
            .collect(),
    }
}

/// Inverse of [`pivot`]: one point per populated cell, row-major.
pub fn melt(table: &WideTable) -> Vec<EwmPoint> {
    table
        .rows
        .iter()
        .flat_map(|row| {
            table
                .labels
                .iter()
                .zip(&row.values)
                .filter_map(move |(&window, value)| {
                    value.map(|value| EwmPoint {
                        date: row.date,
                        window,
                        value,
                    })
                })
        })
        .collect()
}

/// Compare the first and last row of the table, per column.
///
/// Columns with a missing value at either end are skipped.
pub fn compare(table: &WideTable) -> Vec<Comparison> {
    let (Some(first), Some(last)) = (table.rows.first(), table.rows.last()) else {
        return Vec::new();
    };

    table
        .labels
        .iter()
        .enumerate()
        .filter_map(|(i, &label)| {
            let start = first.values[i]?;
            let now = last.values[i]?;
            Some(Comparison {
                label,
                start,
                now,
                delta: now - start,
            })
        })
        .collect()
}
