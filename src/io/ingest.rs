//! CSV ingest and normalization.
//!
//! This module turns a training-log CSV into a clean list of `TrainingRecord`s.
//!
//! Accepted layouts:
//! - `date,volume` (pre-summed volume)
//! - `date` plus any of `arrows`, `secs`, `reps` (components; missing = 0)
//! - both of the above; a blank `volume` cell falls back to the components
//! - any other two-column file, read positionally as `date,volume`
//!
//! Bad rows are skipped and reported with their line number; a file with no
//! usable rows is an error (exit code 3).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DateFormat, TrainingRecord, Workload};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<TrainingRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Where the records came from (file path or "demo").
    pub source: String,
}

impl IngestedData {
    pub fn from_records(records: Vec<TrainingRecord>, source: impl Into<String>) -> Self {
        Self {
            rows_read: records.len(),
            records,
            row_errors: Vec::new(),
            source: source.into(),
        }
    }

    pub fn rows_used(&self) -> usize {
        self.records.len()
    }

    /// First and last session date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

/// Column positions resolved from the header row.
///
/// A row uses its `volume` cell when non-empty and the component columns
/// otherwise, so both kinds can be mixed in one file.
#[derive(Debug, Clone, Copy)]
struct Layout {
    date: usize,
    volume: Option<usize>,
    arrows: Option<usize>,
    secs: Option<usize>,
    reps: Option<usize>,
}

impl Layout {
    /// First column is the date, second the pre-summed volume.
    fn positional() -> Self {
        Self {
            date: 0,
            volume: Some(1),
            arrows: None,
            secs: None,
            reps: None,
        }
    }

    fn has_components(&self) -> bool {
        self.arrows.is_some() || self.secs.is_some() || self.reps.is_some()
    }
}

/// Load a training log CSV from disk.
pub fn load_training_log(path: &Path, date_format: DateFormat) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut data = read_training_log(file, date_format)?;
    data.source = path.display().to_string();
    tracing::info!(
        source = %data.source,
        rows_read = data.rows_read,
        rows_used = data.rows_used(),
        row_errors = data.row_errors.len(),
        "loaded training log"
    );
    Ok(data)
}

/// Parse a training log from any reader.
pub fn read_training_log<R: Read>(reader: R, date_format: DateFormat) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let layout = resolve_layout(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, layout, date_format) {
            Ok(r) => records.push(r),
            Err(message) => {
                tracing::debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::new(3, "No valid rows found in the training log."));
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        source: "<reader>".to_string(),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_layout(headers: &StringRecord) -> Result<Layout, AppError> {
    let header_map = build_header_map(headers);

    let Some(&date) = header_map.get("date") else {
        // The original two-column export has arbitrary header names.
        if headers.len() == 2 {
            return Ok(Layout::positional());
        }
        return Err(AppError::new(2, "Missing required column: `date`"));
    };

    let layout = Layout {
        date,
        volume: header_map.get("volume").copied(),
        arrows: header_map.get("arrows").copied(),
        secs: header_map.get("secs").copied(),
        reps: header_map.get("reps").copied(),
    };
    if layout.volume.is_some() || layout.has_components() {
        return Ok(layout);
    }

    // `date,<anything>` still reads as `date,volume`.
    if headers.len() == 2 {
        return Ok(Layout::positional());
    }

    Err(AppError::new(
        2,
        "Missing workload columns: expected `volume` or any of `arrows`, `secs`, `reps`.",
    ))
}

fn parse_row(record: &StringRecord, layout: Layout, date_format: DateFormat) -> Result<TrainingRecord, String> {
    let date = parse_date(get_required(record, layout.date, "date")?, date_format)?;

    if let Some(volume) = get_optional(record, layout.volume) {
        return Ok(TrainingRecord {
            date,
            workload: Workload::Volume(parse_count(volume, "volume")?),
        });
    }

    if !layout.has_components() {
        return Err("Missing required value: `volume`".to_string());
    }

    let arrows = parse_opt_count(record, layout.arrows, "arrows")?;
    let secs = parse_opt_count(record, layout.secs, "secs")?;
    let reps = parse_opt_count(record, layout.reps, "reps")?;
    Ok(TrainingRecord {
        date,
        workload: Workload::Components { arrows, secs, reps },
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_count(record: &StringRecord, idx: Option<usize>, name: &str) -> Result<Option<u32>, String> {
    get_optional(record, idx).map(|s| parse_count(s, name)).transpose()
}

/// Non-negative whole count. Spreadsheet exports often write `12.0`.
fn parse_count(s: &str, name: &str) -> Result<u32, String> {
    if let Ok(v) = s.parse::<u32>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(format!("Invalid `{name}` value '{s}' (expected a non-negative whole number).")),
    }
}

/// Parse a date in the caller-selected layout.
pub fn parse_date(s: &str, format: DateFormat) -> Result<NaiveDate, String> {
    for fmt in format.patterns() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected {}.", format.display_name()))
}
