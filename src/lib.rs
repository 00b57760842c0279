//! `volume-trends` library crate.
//!
//! The binary (`vt`) is a thin wrapper around this library so that:
//!
//! - the analytics are testable without spawning processes
//! - the CLI and the TUI share one pipeline

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
