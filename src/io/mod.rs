//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - chart data and training log exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
