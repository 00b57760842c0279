//! Export charted data to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts:
//! - wide CSV: `date,<span>...,daily`, one row per date
//! - long JSON: `[{date, window, value}, ...]`
//! - training log CSV: `date,arrows,secs,reps` (or `date,volume`)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::analysis::WideTable;
use crate::domain::{EwmPoint, TrainingRecord, Workload};
use crate::error::AppError;

/// Write the wide table to a CSV file.
pub fn write_wide_csv(path: &Path, table: &WideTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_wide(file, table)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "wrote wide CSV");
    Ok(())
}

/// Write the wide table as CSV to any writer.
pub fn write_wide<W: Write>(writer: W, table: &WideTable) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string()];
    header.extend(table.labels.iter().map(|l| l.to_string()));
    out.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &table.rows {
        let mut fields = vec![row.date.to_string()];
        fields.extend(row.values.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
        out.write_record(&fields)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the long-format series to a JSON file.
pub fn write_series_json(path: &Path, series: &[EwmPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, series)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    tracing::info!(path = %path.display(), points = series.len(), "wrote series JSON");
    Ok(())
}

/// Write a training log in ISO date format.
///
/// Uses the component layout unless every record carries a pre-summed volume.
pub fn write_training_log<W: Write>(writer: W, records: &[TrainingRecord]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let all_volume = records.iter().all(|r| matches!(r.workload, Workload::Volume(_)));

    let header: &[&str] = if all_volume {
        &["date", "volume"]
    } else {
        &["date", "arrows", "secs", "reps"]
    };
    out.write_record(header)
        .map_err(|e| AppError::new(2, format!("Failed to write training log header: {e}")))?;

    let opt = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_default();
    for r in records {
        let date = r.date.format("%Y-%m-%d").to_string();
        let fields = match r.workload {
            Workload::Volume(v) if all_volume => vec![date, v.to_string()],
            Workload::Volume(v) => vec![date, v.to_string(), String::new(), String::new()],
            Workload::Components { arrows, secs, reps } => vec![date, opt(arrows), opt(secs), opt(reps)],
        };
        out.write_record(&fields)
            .map_err(|e| AppError::new(2, format!("Failed to write training log row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush training log: {e}")))?;
    Ok(())
}

/// Write a training log to a file.
pub fn write_training_log_csv(path: &Path, records: &[TrainingRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_training_log(file, records)?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote training log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pivot;
    use crate::domain::{DateFormat, WindowLabel};
    use crate::io::ingest::read_training_log;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    #[test]
    fn wide_csv_has_date_then_labels() {
        let table = pivot(&[
            EwmPoint { date: d(1), window: WindowLabel::Span(7), value: 100 },
            EwmPoint { date: d(1), window: WindowLabel::Daily, value: 100 },
            EwmPoint { date: d(2), window: WindowLabel::Span(7), value: 125 },
        ]);

        let mut buf = Vec::new();
        write_wide(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "date,7,daily\n2024-09-01,100,100\n2024-09-02,125,\n");
    }

    #[test]
    fn training_log_reads_back() {
        let records = vec![
            TrainingRecord::with_components(d(3), Some(72), Some(300), None),
            TrainingRecord::with_components(d(4), None, None, Some(20)),
        ];
        let mut buf = Vec::new();
        write_training_log(&mut buf, &records).unwrap();
        let back = read_training_log(buf.as_slice(), DateFormat::Iso).unwrap();
        assert_eq!(back.records, records);
    }
}
