//! ISO calendar enrichment and season-week numbering.
//!
//! Season weeks are numbered by rank: collect the distinct `(iso_year, iso_week)`
//! pairs, order them, and give each its zero-based position. Two dates in the
//! same ISO week always share a season week, whatever the input order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::analysis::volume::record_volume;
use crate::domain::{CalendarInfo, Dated, Enriched, TrainingRecord, WeeklyVolume};
use crate::error::AnalysisError;

type IsoKey = (u32, u32);

/// Calendar rows for each record, in input order.
pub fn enrich<T: Dated>(records: &[T]) -> Result<Vec<CalendarInfo>, AnalysisError> {
    let dates = collect_dates(records)?;
    let ranks = season_ranks(dates.iter().map(|(_, key)| *key));

    dates
        .into_iter()
        .enumerate()
        .map(|(row, (date, key))| {
            let week_start = monday_of(key).ok_or(AnalysisError::InvalidDate { row })?;
            Ok(CalendarInfo {
                date,
                iso_year: key.0,
                iso_week: key.1,
                iso_weekday: date.weekday().number_from_monday(),
                season_week: ranks[&key],
                week_start,
            })
        })
        .collect()
}

/// Join mode: each record next to its calendar row, same count and order.
pub fn enrich_joined<T: Dated + Clone>(records: &[T]) -> Result<Vec<Enriched<T>>, AnalysisError> {
    let calendar = enrich(records)?;
    Ok(records
        .iter()
        .cloned()
        .zip(calendar)
        .map(|(record, calendar)| Enriched { record, calendar })
        .collect())
}

/// Session volume summed per season week, ascending.
pub fn weekly_volume(records: &[TrainingRecord]) -> Result<Vec<WeeklyVolume>, AnalysisError> {
    let calendar = enrich(records)?;

    let mut weeks: BTreeMap<u32, WeeklyVolume> = BTreeMap::new();
    for (record, cal) in records.iter().zip(&calendar) {
        let entry = weeks.entry(cal.season_week).or_insert(WeeklyVolume {
            season_week: cal.season_week,
            iso_year: cal.iso_year,
            iso_week: cal.iso_week,
            week_start: cal.week_start,
            total: 0,
            sessions: 0,
        });
        entry.total += record_volume(record);
        entry.sessions += 1;
    }

    Ok(weeks.into_values().collect())
}

fn collect_dates<T: Dated>(records: &[T]) -> Result<Vec<(NaiveDate, IsoKey)>, AnalysisError> {
    records
        .iter()
        .enumerate()
        .map(|(row, r)| {
            let date = r.date().ok_or(AnalysisError::InvalidDate { row })?;
            let iso = date.iso_week();
            let year = u32::try_from(iso.year()).map_err(|_| AnalysisError::InvalidDate { row })?;
            Ok((date, (year, iso.week())))
        })
        .collect()
}

fn season_ranks(keys: impl Iterator<Item = IsoKey>) -> BTreeMap<IsoKey, u32> {
    let distinct: BTreeSet<IsoKey> = keys.collect();
    distinct
        .into_iter()
        .zip(0u32..)
        .collect()
}

fn monday_of((year, week): IsoKey) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn iso_attributes_follow_first_thursday_rule() {
        // 2021-01-03 is a Sunday that still belongs to ISO week 53 of 2020.
        let cal = enrich(&[d(2021, 1, 3), d(2021, 1, 4)]).unwrap();
        assert_eq!((cal[0].iso_year, cal[0].iso_week, cal[0].iso_weekday), (2020, 53, 7));
        assert_eq!((cal[1].iso_year, cal[1].iso_week, cal[1].iso_weekday), (2021, 1, 1));
        assert_eq!(cal[0].week_start, d(2020, 12, 28));
        assert_eq!(cal[1].week_start, d(2021, 1, 4));
        assert_eq!(cal[0].season_week, 0);
        assert_eq!(cal[1].season_week, 1);
    }

    #[test]
    fn season_week_ignores_input_order() {
        let dates = [
            d(2024, 1, 17), // week 3
            d(2024, 1, 2),  // week 1
            d(2024, 1, 19), // week 3
            d(2023, 12, 27), // 2023 week 52
            d(2024, 1, 4),  // week 1
        ];
        let cal = enrich(&dates).unwrap();
        let weeks: Vec<u32> = cal.iter().map(|c| c.season_week).collect();
        assert_eq!(weeks, vec![2, 1, 2, 0, 1]);
        assert_eq!(cal[0].week_start, cal[2].week_start);
        assert_eq!(cal[1].week_start, d(2024, 1, 1));
    }

    #[test]
    fn missing_date_is_rejected_with_row() {
        let dates = [Some(d(2024, 1, 1)), None];
        assert_eq!(enrich(&dates), Err(AnalysisError::InvalidDate { row: 1 }));
    }

    #[test]
    fn empty_input_gives_empty_calendar() {
        let none: [NaiveDate; 0] = [];
        assert!(enrich(&none).unwrap().is_empty());
    }

    #[test]
    fn join_mode_keeps_rows_in_place() {
        let records = vec![
            TrainingRecord::with_volume(d(2024, 2, 9), 10),
            TrainingRecord::with_volume(d(2024, 2, 1), 20),
        ];
        let joined = enrich_joined(&records).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].record, records[0]);
        assert_eq!(joined[0].calendar.date, d(2024, 2, 9));
        assert_eq!(joined[1].calendar.season_week, 0);
        assert_eq!(joined[0].calendar.season_week, 1);
    }

    #[test]
    fn weekly_volume_sums_per_iso_week() {
        let records = vec![
            TrainingRecord::with_volume(d(2024, 1, 8), 100),
            TrainingRecord::with_components(d(2024, 1, 1), Some(50), Some(20), None),
            TrainingRecord::with_volume(d(2024, 1, 14), 30),
        ];
        let weeks = weekly_volume(&records).unwrap();
        assert_eq!(weeks.len(), 2);
        assert_eq!((weeks[0].season_week, weeks[0].total, weeks[0].sessions), (0, 52, 1));
        assert_eq!((weeks[1].iso_week, weeks[1].total, weeks[1].sessions), (2, 130, 2));
        assert_eq!(weeks[1].week_start, d(2024, 1, 8));
    }
}
