//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by value
//! - exported to JSON/CSV
//! - pivoted into display tables

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default EWM spans (acute, chronic, baseline).
pub const DEFAULT_WINDOWS: [u32; 3] = [10, 30, 90];

/// Alternative span preset (one week, four weeks, sixteen weeks).
pub const WEEKLY_WINDOWS: [u32; 3] = [7, 28, 112];

/// How the session workload was recorded.
///
/// A log either carries a pre-summed `volume` or the raw components it is
/// derived from. Missing components count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    Volume(u32),
    Components {
        arrows: Option<u32>,
        secs: Option<u32>,
        reps: Option<u32>,
    },
}

/// One logged training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub date: NaiveDate,
    pub workload: Workload,
}

impl TrainingRecord {
    pub fn with_volume(date: NaiveDate, volume: u32) -> Self {
        Self {
            date,
            workload: Workload::Volume(volume),
        }
    }

    pub fn with_components(
        date: NaiveDate,
        arrows: Option<u32>,
        secs: Option<u32>,
        reps: Option<u32>,
    ) -> Self {
        Self {
            date,
            workload: Workload::Components { arrows, secs, reps },
        }
    }
}

/// Total volume for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub total: u64,
}

/// Column label of the smoothed series: an EWM span or the raw daily total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WindowLabel {
    Span(u32),
    Daily,
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowLabel::Span(n) => write!(f, "{n}"),
            WindowLabel::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for WindowLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("daily") {
            return Ok(WindowLabel::Daily);
        }
        s.parse::<u32>()
            .map(WindowLabel::Span)
            .map_err(|_| format!("Unknown window label '{s}'."))
    }
}

impl From<WindowLabel> for String {
    fn from(value: WindowLabel) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for WindowLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One cell of the long-format smoothed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwmPoint {
    pub date: NaiveDate,
    pub window: WindowLabel,
    pub value: i64,
}

/// ISO calendar attributes of a date plus its rank among the season's weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub date: NaiveDate,
    pub iso_year: u32,
    pub iso_week: u32,
    pub iso_weekday: u32,
    /// Zero-based rank of `(iso_year, iso_week)` among the distinct weeks present.
    pub season_week: u32,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
}

/// A record paired with its calendar row (join mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enriched<T> {
    pub record: T,
    pub calendar: CalendarInfo,
}

/// Volume summed over one season week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyVolume {
    pub season_week: u32,
    pub iso_year: u32,
    pub iso_week: u32,
    pub week_start: NaiveDate,
    pub total: u64,
    pub sessions: usize,
}

/// Anything that carries a calendar date.
///
/// `None` models a null/unparseable date coming from a loosely typed source;
/// date-sensitive operations reject it.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;
}

impl Dated for NaiveDate {
    fn date(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}

impl Dated for Option<NaiveDate> {
    fn date(&self) -> Option<NaiveDate> {
        *self
    }
}

impl Dated for TrainingRecord {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Dated for DailyVolume {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Dated for EwmPoint {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Dated for CalendarInfo {
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Anything with a scalar workload.
pub trait Volumetric {
    fn volume(&self) -> u64;
}

impl Volumetric for TrainingRecord {
    fn volume(&self) -> u64 {
        crate::analysis::volume::record_volume(self)
    }
}

impl Volumetric for DailyVolume {
    fn volume(&self) -> u64 {
        self.total
    }
}

/// How dates are written in the input CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `YYYY-MM-DD` (also `YYYY/MM/DD`).
    Iso,
    /// `DD/MM/YYYY`, `DD-MM-YYYY`, `DD.MM.YYYY`.
    DayFirst,
    /// `MM/DD/YYYY`, `MM-DD-YYYY`.
    MonthFirst,
}

impl DateFormat {
    /// chrono patterns tried in order.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            DateFormat::Iso => &["%Y-%m-%d", "%Y/%m/%d"],
            DateFormat::DayFirst => &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"],
            DateFormat::MonthFirst => &["%m/%d/%Y", "%m-%d-%Y"],
        }
    }

    /// Human-readable layout for help and error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            DateFormat::Iso => "YYYY-MM-DD",
            DateFormat::DayFirst => "DD/MM/YYYY",
            DateFormat::MonthFirst => "MM/DD/YYYY",
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Training log to analyse. `None` means "use the generated demo log".
    pub csv_path: Option<PathBuf>,
    pub date_format: DateFormat,

    pub windows: Vec<u32>,
    /// Seed for the first EWM value instead of the first daily total.
    pub start_value: Option<f64>,

    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Keep only sessions whose volume strictly exceeds this.
    pub min_volume: Option<u64>,

    pub show_daily: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,

    pub sample_seed: u64,
    pub sample_days: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            date_format: DateFormat::DayFirst,
            windows: DEFAULT_WINDOWS.to_vec(),
            start_value: None,
            start: None,
            end: None,
            min_volume: None,
            show_daily: false,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_csv: None,
            export_json: None,
            sample_seed: 42,
            sample_days: 365,
        }
    }
}
