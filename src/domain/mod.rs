//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records and the workload variant (`TrainingRecord`, `Workload`)
//! - pipeline outputs (`DailyVolume`, `EwmPoint`, `CalendarInfo`, ...)
//! - the `Dated` / `Volumetric` seams used by the filters
//! - run configuration (`AnalysisConfig`, `DateFormat`)

pub mod types;

pub use types::*;
