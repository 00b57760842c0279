//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the training log (or generates the demo log)
//! - runs the volume pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::analysis::{parse_windows, weekly_volume};
use crate::cli::{AnalyseArgs, Command, InputArgs, SampleArgs};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub mod pipeline;

/// Environment variable naming the default training log.
pub const CSV_ENV: &str = "VT_CSV";

/// Entry point for the `vt` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine.
    dotenvy::dotenv().ok();

    // `vt` and `vt -f log.csv` behave like `vt tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyse(args) => handle_analyse(args),
        Command::Calendar(args) => handle_calendar(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_analyse(args: AnalyseArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!("{}", crate::report::format_comparison(&run.comparison));
    println!("{}", crate::report::format_table(&run.table));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.table, config.show_daily, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_wide_csv(path, &run.table)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_series_json(path, &run.series)?;
    }

    Ok(())
}

fn handle_calendar(args: InputArgs) -> Result<(), AppError> {
    let mut config = AnalysisConfig::default();
    apply_input_args(&mut config, &args);

    let ingest = pipeline::load_input(&config)?;
    let weeks = weekly_volume(&ingest.records)?;

    println!("Source: {} ({} sessions)\n", ingest.source, ingest.rows_used());
    println!("{}", crate::report::format_weekly(&weeks));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let mut spec = SampleSpec::new(args.seed, args.sample_days);
    if let Some(start) = args.start {
        spec.start = start;
    }

    let records = generate_sample(&spec)?;
    crate::io::export::write_training_log_csv(&args.output, &records)?;
    println!("Wrote {} sessions to {}", records.len(), args.output.display());
    Ok(())
}

fn handle_tui(args: AnalyseArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    crate::tui::run(config)
}

/// Build the analysis config from parsed CLI arguments.
pub fn config_from_args(args: &AnalyseArgs) -> Result<AnalysisConfig, AppError> {
    let windows = parse_windows(&args.windows)?;

    let mut config = AnalysisConfig {
        windows,
        start_value: args.start_value,
        start: args.start,
        end: args.end,
        min_volume: args.min_volume,
        show_daily: args.daily,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        ..AnalysisConfig::default()
    };
    apply_input_args(&mut config, &args.input);
    Ok(config)
}

fn apply_input_args(config: &mut AnalysisConfig, input: &InputArgs) {
    config.csv_path = input.file.clone().or_else(csv_from_env);
    config.date_format = input.date_format;
    config.sample_seed = input.seed;
    config.sample_days = input.sample_days;
}

fn csv_from_env() -> Option<PathBuf> {
    std::env::var_os(CSV_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Rewrite argv so `vt` defaults to `vt tui`.
///
/// Rules:
/// - `vt`                      -> `vt tui`
/// - `vt -f log.csv ...`       -> `vt tui -f log.csv ...`
/// - `vt --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyse" | "calendar" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateFormat;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_binary_opens_tui() {
        assert_eq!(rewrite_args(argv(&["vt"])), argv(&["vt", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["vt", "-f", "log.csv"])),
            argv(&["vt", "tui", "-f", "log.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        for a in [
            argv(&["vt", "analyse", "-w", "7"]),
            argv(&["vt", "calendar"]),
            argv(&["vt", "--help"]),
            argv(&["vt", "-V"]),
        ] {
            assert_eq!(rewrite_args(a.clone()), a);
        }
    }

    #[test]
    fn config_maps_analyse_flags() {
        let cli = crate::cli::Cli::parse_from([
            "vt",
            "analyse",
            "-f",
            "log.csv",
            "--date-format",
            "iso",
            "-w",
            "7, 28",
            "--min-volume",
            "50",
            "--no-plot",
            "--daily",
        ]);
        let Command::Analyse(args) = cli.command else {
            panic!("expected analyse");
        };

        let config = config_from_args(&args).unwrap();
        assert_eq!(config.csv_path, Some(PathBuf::from("log.csv")));
        assert_eq!(config.date_format, DateFormat::Iso);
        assert_eq!(config.windows, vec![7, 28]);
        assert_eq!(config.min_volume, Some(50));
        assert!(!config.plot);
        assert!(config.show_daily);
    }

    #[test]
    fn bad_windows_exit_with_input_error() {
        let cli = crate::cli::Cli::parse_from(["vt", "analyse", "-f", "log.csv", "-w", "7,0"]);
        let Command::Analyse(args) = cli.command else {
            panic!("expected analyse");
        };
        let err = config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
