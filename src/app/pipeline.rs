//! Shared "analysis pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> threshold -> daily totals -> EWM -> range filter -> pivot -> compare
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//!
//! Smoothing runs over the *whole* daily series before the range filter, so the
//! first value inside a range still carries the history that preceded it.

use chrono::NaiveDate;

use crate::analysis::{
    self, Comparison, DailyCache, VolumeStats, WideTable, by_date_range, by_volume_threshold, compare, pivot,
    smooth,
};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::{AnalysisConfig, DailyVolume, EwmPoint, TrainingRecord};
use crate::error::{AnalysisError, AppError};
use crate::io::ingest::{IngestedData, load_training_log};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    /// Sessions that passed the volume threshold.
    pub records: Vec<TrainingRecord>,
    pub daily: Vec<DailyVolume>,
    /// Long series restricted to the selected range.
    pub series: Vec<EwmPoint>,
    pub table: WideTable,
    pub comparison: Vec<Comparison>,
    pub stats: Option<VolumeStats>,
    /// Inclusive range actually applied.
    pub range: (NaiveDate, NaiveDate),
}

/// Load the training log named by the config, or the demo log.
pub fn load_input(config: &AnalysisConfig) -> Result<IngestedData, AppError> {
    match &config.csv_path {
        Some(path) => load_training_log(path, config.date_format),
        None => {
            let records = generate_sample(&SampleSpec::new(config.sample_seed, config.sample_days))?;
            tracing::info!(
                seed = config.sample_seed,
                days = config.sample_days,
                rows = records.len(),
                "using generated demo log"
            );
            Ok(IngestedData::from_records(records, "demo"))
        }
    }
}

/// Execute the full pipeline: load the input and analyse it.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let ingest = load_input(config)?;
    // One-shot run: the cache only pays off when the TUI re-slices.
    let mut cache = DailyCache::new();
    run_with_ingest(config, ingest, &mut cache)
}

/// Execute the pipeline over already-loaded records.
///
/// This is useful for the TUI where we want to re-slice without re-reading the
/// file; the cache keeps the daily aggregation from being recomputed.
pub fn run_with_ingest(
    config: &AnalysisConfig,
    ingest: IngestedData,
    cache: &mut DailyCache,
) -> Result<RunOutput, AppError> {
    let records = match config.min_volume {
        Some(min) => by_volume_threshold(&ingest.records, min),
        None => ingest.records.clone(),
    };

    let daily = cache.daily(&records);
    let range = resolve_range(config, &ingest)?;

    let full = smooth(&daily, &config.windows, config.start_value)?;
    let series = by_date_range(&full, range.0, range.1)?;
    let table = pivot(&series);
    let comparison = compare(&table);

    let in_range = by_date_range(&records, range.0, range.1)?;
    let volumes: Vec<u64> = in_range.iter().map(analysis::record_volume).collect();
    let stats = analysis::describe(&volumes);

    tracing::debug!(
        sessions = records.len(),
        days = daily.len(),
        points = series.len(),
        start = %range.0,
        end = %range.1,
        "analysis complete"
    );

    Ok(RunOutput {
        ingest,
        records,
        daily,
        series,
        table,
        comparison,
        stats,
        range,
    })
}

/// Fill unset range ends from the data span.
pub fn resolve_range(config: &AnalysisConfig, ingest: &IngestedData) -> Result<(NaiveDate, NaiveDate), AppError> {
    let (min, max) = ingest
        .date_span()
        .ok_or_else(|| AppError::new(3, "Training log has no sessions."))?;

    let start = config.start.unwrap_or(min);
    let end = config.end.unwrap_or(max);
    if start > end {
        return Err(AnalysisError::InvalidRange { start, end }.into());
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WindowLabel;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn ingest() -> IngestedData {
        IngestedData::from_records(
            vec![
                TrainingRecord::with_volume(d(1), 100),
                TrainingRecord::with_volume(d(2), 200),
                TrainingRecord::with_volume(d(4), 150),
                TrainingRecord::with_volume(d(4), 5),
            ],
            "test",
        )
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            windows: vec![7],
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn range_slices_after_smoothing() {
        let cfg = AnalysisConfig {
            start: Some(d(2)),
            ..config()
        };
        let mut cache = DailyCache::new();
        let run = run_with_ingest(&cfg, ingest(), &mut cache).unwrap();

        assert_eq!(run.range, (d(2), d(4)));
        assert_eq!(run.table.rows.len(), 2);
        // The first in-range EWM value still reflects 2024-04-01.
        // 0.25 * 155 + 0.75 * 125 = 132.5, which rounds half-to-even to 132.
        assert_eq!(run.table.column(WindowLabel::Span(7)), Some(vec![Some(125), Some(132)]));
        assert_eq!(run.comparison[0].delta, 7);
    }

    #[test]
    fn threshold_drops_sessions_before_aggregation() {
        let cfg = AnalysisConfig {
            min_volume: Some(10),
            ..config()
        };
        let mut cache = DailyCache::new();
        let run = run_with_ingest(&cfg, ingest(), &mut cache).unwrap();
        assert_eq!(run.records.len(), 3);
        assert_eq!(run.daily.last().map(|d| d.total), Some(150));
    }

    #[test]
    fn reslicing_reuses_the_daily_totals() {
        let mut cache = DailyCache::new();
        run_with_ingest(&config(), ingest(), &mut cache).unwrap();
        assert_eq!(cache.hits(), 0);

        let narrowed = AnalysisConfig {
            start: Some(d(2)),
            ..config()
        };
        run_with_ingest(&narrowed, ingest(), &mut cache).unwrap();
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reversed_range_is_an_input_error() {
        let cfg = AnalysisConfig {
            start: Some(d(4)),
            end: Some(d(1)),
            ..config()
        };
        let mut cache = DailyCache::new();
        let err = run_with_ingest(&cfg, ingest(), &mut cache).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn range_outside_the_data_is_empty_not_an_error() {
        let cfg = AnalysisConfig {
            start: Some(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2030, 2, 1).unwrap()),
            ..config()
        };
        let mut cache = DailyCache::new();
        let run = run_with_ingest(&cfg, ingest(), &mut cache).unwrap();
        assert!(run.series.is_empty());
        assert!(run.comparison.is_empty());
        assert!(run.stats.is_none());
    }
}
