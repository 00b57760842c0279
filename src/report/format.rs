//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analytics code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analysis::{Comparison, VolumeStats, WideTable};
use crate::app::pipeline::RunOutput;
use crate::domain::{AnalysisConfig, WeeklyVolume, WindowLabel};

/// Names for the first three spans, shortest first.
const WINDOW_ROLES: [&str; 3] = ["Acute", "Chronic", "Baseline"];

/// Format the run summary (source, range, row counts, volume statistics).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== vt - Training Volume Trends ===\n");
    out.push_str(&format!("Source: {}\n", run.ingest.source));
    out.push_str(&format!("Range: {} .. {}\n", run.range.0, run.range.1));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}",
        run.ingest.rows_read,
        run.ingest.rows_used(),
        run.ingest.row_errors.len(),
    ));
    if let Some(min) = config.min_volume {
        out.push_str(&format!(" | above {min}: {}", run.records.len()));
    }
    out.push('\n');
    out.push_str(&format!(
        "Windows: {}{}\n",
        config
            .windows
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        config
            .start_value
            .map(|s| format!(" (seeded at {s})"))
            .unwrap_or_default(),
    ));

    for e in run.ingest.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if run.ingest.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", run.ingest.row_errors.len() - 5));
    }

    out.push_str("\nSession volume:\n");
    out.push_str(&format_stats(run.stats.as_ref()));
    out.push('\n');

    out
}

/// Format descriptive statistics as a two-column table.
pub fn format_stats(stats: Option<&VolumeStats>) -> String {
    let Some(s) = stats else {
        return "  (no sessions in range)\n".to_string();
    };

    let rows = [
        ("count", s.count as f64),
        ("mean", s.mean),
        ("std", s.std),
        ("min", s.min),
        ("25%", s.q25),
        ("50%", s.median),
        ("75%", s.q75),
        ("max", s.max),
    ];
    rows.iter()
        .map(|(name, v)| format!("  {name:<6} {v:>10.2}\n"))
        .collect()
}

/// Format "now vs start of range" for each smoothed window.
///
/// Windows are named by rank of span: the shortest is "Acute", then "Chronic",
/// then "Baseline"; any further spans are just labelled by their length.
pub fn format_comparison(comparison: &[Comparison]) -> String {
    let mut spans: Vec<u32> = comparison
        .iter()
        .filter_map(|c| match c.label {
            WindowLabel::Span(n) => Some(n),
            WindowLabel::Daily => None,
        })
        .collect();
    spans.sort_unstable();

    let mut out = String::new();
    for c in comparison {
        let WindowLabel::Span(n) = c.label else {
            continue;
        };
        let role = spans
            .iter()
            .position(|&s| s == n)
            .and_then(|i| WINDOW_ROLES.get(i))
            .copied()
            .unwrap_or("EWM");
        out.push_str(&format!(
            "{role} Volume ({n} days): {} ({:+})\n",
            c.now, c.delta
        ));
    }
    if out.is_empty() {
        out.push_str("(no data in range)\n");
    }
    out
}

/// Format the wide table with right-aligned columns.
pub fn format_table(table: &WideTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10}", "date"));
    for label in &table.labels {
        out.push_str(&format!(" {:>8}", label.to_string()));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("{:<10}", row.date));
        for v in &row.values {
            match v {
                Some(v) => out.push_str(&format!(" {v:>8}")),
                None => out.push_str(&format!(" {:>8}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

/// Format weekly volume grouped by season week.
pub fn format_weekly(weeks: &[WeeklyVolume]) -> String {
    let mut out = String::new();
    out.push_str("season_week  iso_week  week_start  sessions    volume\n");
    for w in weeks {
        out.push_str(&format!(
            "{:>11}  {:>4}-W{:02}  {}  {:>8}  {:>8}\n",
            w.season_week, w.iso_year, w.iso_week, w.week_start, w.sessions, w.total
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pivot;
    use crate::domain::EwmPoint;
    use chrono::NaiveDate;

    #[test]
    fn comparison_names_windows_by_span_rank() {
        let cmp = vec![
            Comparison { label: WindowLabel::Span(90), start: 50, now: 60, delta: 10 },
            Comparison { label: WindowLabel::Span(10), start: 80, now: 70, delta: -10 },
            Comparison { label: WindowLabel::Daily, start: 1, now: 2, delta: 1 },
        ];
        let txt = format_comparison(&cmp);
        assert_eq!(
            txt,
            "Chronic Volume (90 days): 60 (+10)\nAcute Volume (10 days): 70 (-10)\n"
        );
    }

    #[test]
    fn table_marks_missing_cells() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let table = pivot(&[
            EwmPoint { date: d, window: WindowLabel::Span(7), value: 12 },
            EwmPoint { date: d.succ_opt().unwrap(), window: WindowLabel::Daily, value: 3 },
        ]);
        let txt = format_table(&table);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "date              7    daily");
        assert_eq!(lines[1], "2024-01-01       12        -");
        assert_eq!(lines[2], "2024-01-02        -        3");
    }

    #[test]
    fn empty_stats_say_so() {
        assert_eq!(format_stats(None), "  (no sessions in range)\n");
    }
}
