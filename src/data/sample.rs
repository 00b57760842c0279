//! Synthetic training log generation.
//!
//! Used as the demo dataset when no CSV is supplied. The generator is seeded,
//! so the same `(seed, start, days)` always yields the same log.
//!
//! Shape of the season:
//! - a slow build over the first two thirds, then a taper
//! - a 4-week micro-cycle with a lighter fourth week
//! - rest days (no session at all) and occasional double sessions

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::TrainingRecord;
use crate::error::AppError;

/// Base arrows per session at the start of the season.
const BASE_ARROWS: f64 = 90.0;
/// Extra arrows per session at the peak of the build.
const PEAK_GAIN: f64 = 60.0;
/// Chance that a given day has no session.
const REST_PROB: f64 = 0.22;
/// Chance that a training day has a second session.
const DOUBLE_PROB: f64 = 0.12;

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub seed: u64,
    pub start: NaiveDate,
    pub days: usize,
}

impl SampleSpec {
    pub fn new(seed: u64, days: usize) -> Self {
        Self {
            seed,
            start: default_start(),
            days,
        }
    }
}

/// First Monday of October 2018, the start of the demo season.
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 10, 1).unwrap_or_default()
}

/// Generate a demo training log.
pub fn generate_sample(spec: &SampleSpec) -> Result<Vec<TrainingRecord>, AppError> {
    if spec.days == 0 {
        return Err(AppError::new(2, "Sample length must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::<f64>::new(0.0, 0.18)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::new();
    for i in 0..spec.days {
        let date = spec.start + Duration::days(i as i64);
        if rng.gen_bool(REST_PROB) {
            continue;
        }

        let level = season_level(i, spec.days) * cycle_factor(date);
        let sessions = if rng.gen_bool(DOUBLE_PROB) { 2 } else { 1 };
        for _ in 0..sessions {
            let jitter: f64 = (1.0 + noise.sample(&mut rng)).max(0.2);
            let arrows = (level * jitter).round().max(0.0) as u32;

            // Holding drills on roughly a third of sessions, strength on weekends.
            let secs = rng
                .gen_bool(0.35)
                .then(|| rng.gen_range(6..=30) * 10);
            let reps = (date.weekday().number_from_monday() >= 6).then(|| rng.gen_range(20..=60));

            out.push(TrainingRecord::with_components(date, Some(arrows), secs, reps));
        }
    }

    Ok(out)
}

/// Arrows per session implied by the season build/taper.
fn season_level(day: usize, days: usize) -> f64 {
    let u = day as f64 / days.max(1) as f64;
    let build = if u < 2.0 / 3.0 {
        u * 1.5
    } else {
        1.0 - (u - 2.0 / 3.0) * 1.5
    };
    BASE_ARROWS + PEAK_GAIN * build.clamp(0.0, 1.0)
}

/// Lighter fourth week of every four-week block.
fn cycle_factor(date: NaiveDate) -> f64 {
    if date.iso_week().week() % 4 == 0 { 0.7 } else { 1.0 }
}
