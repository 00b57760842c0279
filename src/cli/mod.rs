//! Command-line parsing for the training volume analyser.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analytics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DateFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "vt", version, about = "Training volume trends (daily totals + EWM averages)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Smooth a training log, print statistics/comparisons, and optionally plot/export.
    Analyse(AnalyseArgs),
    /// Print weekly volume grouped by season week.
    Calendar(InputArgs),
    /// Write the generated demo training log to a CSV file.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `vt analyse`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(AnalyseArgs),
}

/// Where the training log comes from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Training log CSV (`date,volume` or `date,arrows,secs,reps`).
    ///
    /// Falls back to `VT_CSV` (also read from `.env`), then to the generated demo log.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// How dates are written in the CSV.
    #[arg(long, value_enum, default_value_t = DateFormat::DayFirst)]
    pub date_format: DateFormat,

    /// Random seed for the demo log.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Length of the demo log in days.
    #[arg(long, default_value_t = 365)]
    pub sample_days: usize,
}

/// Options for analysing and viewing.
#[derive(Debug, Args, Clone)]
pub struct AnalyseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// EWM spans in days, comma-separated.
    #[arg(short = 'w', long, default_value = "10,30,90")]
    pub windows: String,

    /// First date to show (YYYY-MM-DD). Defaults to the first session.
    #[arg(long, value_parser = parse_iso_date)]
    pub start: Option<NaiveDate>,

    /// Last date to show (YYYY-MM-DD). Defaults to the last session.
    #[arg(long, value_parser = parse_iso_date)]
    pub end: Option<NaiveDate>,

    /// Drop sessions whose volume is not strictly above this.
    #[arg(long)]
    pub min_volume: Option<u64>,

    /// Seed the averages with this value instead of the first daily total.
    #[arg(long)]
    pub start_value: Option<f64>,

    /// Overlay daily totals on the chart.
    #[arg(long)]
    pub daily: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the charted table (one row per date) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the long-format series to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for writing the demo log.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Length of the log in days.
    #[arg(long, default_value_t = 365)]
    pub sample_days: usize,

    /// First day of the log (YYYY-MM-DD).
    #[arg(long, value_parser = parse_iso_date)]
    pub start: Option<NaiveDate>,
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyse_flags_parse() {
        let cli = Cli::parse_from([
            "vt", "analyse", "-f", "log.csv", "--date-format", "iso", "-w", "7,28,112", "--start", "2024-01-01",
            "--daily",
        ]);
        let Command::Analyse(args) = cli.command else {
            panic!("expected analyse");
        };
        assert_eq!(args.input.file, Some(PathBuf::from("log.csv")));
        assert_eq!(args.input.date_format, DateFormat::Iso);
        assert_eq!(args.windows, "7,28,112");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(args.daily);
        assert!(!args.no_plot);
    }

    #[test]
    fn bad_start_date_is_a_parse_error() {
        let res = Cli::try_parse_from(["vt", "analyse", "--start", "01/01/2024"]);
        assert!(res.is_err());
    }
}
