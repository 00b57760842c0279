//! The analytics core: volume aggregation, EWM smoothing, calendar enrichment,
//! filtering and reshaping.
//!
//! Everything here is a pure function of its inputs (no I/O, no logging).

pub mod cache;
pub mod calendar;
pub mod ewm;
pub mod filter;
pub mod pivot;
pub mod stats;
pub mod volume;

pub use cache::DailyCache;
pub use calendar::{enrich, enrich_joined, weekly_volume};
pub use ewm::{ewm_values, parse_windows, smooth};
pub use filter::{by_date_range, by_volume_threshold};
pub use pivot::{Comparison, WideRow, WideTable, compare, melt, pivot};
pub use stats::{VolumeStats, describe};
pub use volume::{above_threshold, daily, record_volume};
