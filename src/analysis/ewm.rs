//! Exponentially weighted moving averages over the daily series.
//!
//! For a span `n` the smoothing factor is `alpha = 2 / (n + 1)` and the series
//! follows the plain recurrence, with no bias adjustment:
//!
//! ```text
//! S_0 = x_0            (or the caller's start value)
//! S_t = alpha * x_t + (1 - alpha) * S_{t-1}
//! ```
//!
//! Smoothed values are rounded half-to-even before being stored as integers, so
//! `87.5 -> 88` and `2.5 -> 2`.
//!
//! The recurrence runs over consecutive *observations*, not calendar days: gaps
//! in the log are not zero-filled.

use rayon::prelude::*;

use crate::domain::{DailyVolume, EwmPoint, WindowLabel};
use crate::error::AnalysisError;

/// Smooth `daily` with every span in `windows`.
///
/// Rows come out grouped by date; within a date the spans appear in input
/// order, followed by the raw `daily` total.
pub fn smooth(
    daily: &[DailyVolume],
    windows: &[u32],
    start_override: Option<f64>,
) -> Result<Vec<EwmPoint>, AnalysisError> {
    validate_windows(windows)?;
    if let Some(s) = start_override {
        if !s.is_finite() {
            return Err(AnalysisError::InvalidStartValue(s));
        }
    }

    if daily.is_empty() {
        return Ok(Vec::new());
    }

    let totals: Vec<f64> = daily.iter().map(|d| d.total as f64).collect();

    // Spans are independent; each one only reads the shared totals.
    let columns: Vec<Vec<i64>> = windows
        .par_iter()
        .map(|&span| {
            ewm_values(&totals, span, start_override)
                .into_iter()
                .map(round_half_even)
                .collect()
        })
        .collect();

    let mut out = Vec::with_capacity(daily.len() * (windows.len() + 1));
    for (t, day) in daily.iter().enumerate() {
        for (col, &span) in columns.iter().zip(windows) {
            out.push(EwmPoint {
                date: day.date,
                window: WindowLabel::Span(span),
                value: col[t],
            });
        }
        out.push(EwmPoint {
            date: day.date,
            window: WindowLabel::Daily,
            value: i64::try_from(day.total).unwrap_or(i64::MAX),
        });
    }

    Ok(out)
}

/// Unrounded EWM of `values` for one span.
///
/// `start` replaces the first observation as the recurrence seed; later
/// observations are untouched.
pub fn ewm_values(values: &[f64], span: u32, start: Option<f64>) -> Vec<f64> {
    let Some((&first, rest)) = values.split_first() else {
        return Vec::new();
    };

    let alpha = 2.0 / (f64::from(span) + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut s = start.unwrap_or(first);
    out.push(s);
    for &x in rest {
        s = alpha * x + (1.0 - alpha) * s;
        out.push(s);
    }
    out
}

/// Parse a comma-separated span list such as `"10,30,90"`.
pub fn parse_windows(input: &str) -> Result<Vec<u32>, AnalysisError> {
    let windows = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| AnalysisError::InvalidWindow(format!("'{s}' is not a positive integer span.")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_windows(&windows)?;
    Ok(windows)
}

fn validate_windows(windows: &[u32]) -> Result<(), AnalysisError> {
    if windows.is_empty() {
        return Err(AnalysisError::InvalidWindow("at least one span is required.".to_string()));
    }
    for (i, &span) in windows.iter().enumerate() {
        if span == 0 {
            return Err(AnalysisError::InvalidWindow("spans must be >= 1.".to_string()));
        }
        if windows[..i].contains(&span) {
            return Err(AnalysisError::InvalidWindow(format!("span {span} is listed twice.")));
        }
    }
    Ok(())
}

fn round_half_even(v: f64) -> i64 {
    v.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(totals: &[u64]) -> Vec<DailyVolume> {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| DailyVolume {
                date: start + chrono::Duration::days(i as i64 * 2),
                total,
            })
            .collect()
    }

    fn column(points: &[EwmPoint], window: WindowLabel) -> Vec<i64> {
        points
            .iter()
            .filter(|p| p.window == window)
            .map(|p| p.value)
            .collect()
    }

    #[test]
    fn reproduces_reference_values() {
        let out = smooth(&series(&[100, 200, 150]), &[7], None).unwrap();
        assert_eq!(column(&out, WindowLabel::Span(7)), vec![100, 125, 131]);
        assert_eq!(column(&out, WindowLabel::Daily), vec![100, 200, 150]);
    }

    #[test]
    fn start_value_only_reseeds_the_recurrence() {
        let out = smooth(&series(&[100, 200, 150]), &[7], Some(50.0)).unwrap();
        // 87.5 rounds half-to-even to 88; 0.25*150 + 0.75*87.5 = 103.125.
        assert_eq!(column(&out, WindowLabel::Span(7)), vec![50, 88, 103]);
        assert_eq!(column(&out, WindowLabel::Daily), vec![100, 200, 150]);
    }

    #[test]
    fn raw_recurrence_has_no_bias_adjustment() {
        let v = ewm_values(&[100.0, 200.0, 150.0], 7, None);
        assert_eq!(v, vec![100.0, 125.0, 131.25]);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(131.25), 131);
        assert_eq!(round_half_even(87.5), 88);
    }

    #[test]
    fn rows_are_grouped_by_date_with_spans_in_input_order() {
        let daily = series(&[10, 20]);
        let out = smooth(&daily, &[30, 10], None).unwrap();
        let labels: Vec<WindowLabel> = out.iter().map(|p| p.window).collect();
        assert_eq!(
            labels,
            vec![
                WindowLabel::Span(30),
                WindowLabel::Span(10),
                WindowLabel::Daily,
                WindowLabel::Span(30),
                WindowLabel::Span(10),
                WindowLabel::Daily,
            ]
        );
        assert!(out[..3].iter().all(|p| p.date == daily[0].date));
        assert!(out[3..].iter().all(|p| p.date == daily[1].date));
    }

    #[test]
    fn span_one_tracks_the_input() {
        let out = smooth(&series(&[5, 9, 2]), &[1], None).unwrap();
        assert_eq!(column(&out, WindowLabel::Span(1)), vec![5, 9, 2]);
    }

    #[test]
    fn parallel_spans_match_sequential_computation() {
        let totals: Vec<u64> = (0..200).map(|i| (i * 37 % 101) as u64).collect();
        let daily = series(&totals);
        let windows = [7, 28, 112, 3];
        let out = smooth(&daily, &windows, None).unwrap();

        let xs: Vec<f64> = totals.iter().map(|&t| t as f64).collect();
        for &span in &windows {
            let expected: Vec<i64> = ewm_values(&xs, span, None)
                .into_iter()
                .map(round_half_even)
                .collect();
            assert_eq!(column(&out, WindowLabel::Span(span)), expected);
        }
    }

    #[test]
    fn empty_daily_gives_empty_series() {
        assert!(smooth(&[], &[7], None).unwrap().is_empty());
    }

    #[test]
    fn invalid_windows_are_rejected() {
        let daily = series(&[1]);
        assert!(matches!(smooth(&daily, &[], None), Err(AnalysisError::InvalidWindow(_))));
        assert!(matches!(smooth(&daily, &[0], None), Err(AnalysisError::InvalidWindow(_))));
        assert!(matches!(smooth(&daily, &[7, 7], None), Err(AnalysisError::InvalidWindow(_))));
        assert_eq!(
            smooth(&daily, &[7], Some(f64::NAN)).map(|_| ()).unwrap_err().to_string(),
            AnalysisError::InvalidStartValue(f64::NAN).to_string()
        );
    }

    #[test]
    fn parse_windows_accepts_lists_and_rejects_junk() {
        assert_eq!(parse_windows("10, 30,90").unwrap(), vec![10, 30, 90]);
        assert!(parse_windows("7,2.5").is_err());
        assert!(parse_windows("-3").is_err());
        assert!(parse_windows("0,7").is_err());
        assert!(parse_windows("").is_err());
    }
}
