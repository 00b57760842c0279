//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one line per EWM span, each with its own glyph (`*`, `+`, `#`, ...)
//! - optional daily totals as `|` bars rising from the bottom row

use chrono::NaiveDate;

use crate::analysis::WideTable;
use crate::domain::WindowLabel;

const SPAN_GLYPHS: [char; 5] = ['*', '+', '#', '~', '='];
const DAILY_GLYPH: char = '|';

/// Render the wide table as an ASCII chart.
pub fn render_ascii_plot(table: &WideTable, show_daily: bool, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (table.rows.first(), table.rows.last()) else {
        return "Plot: (no data in range)\n".to_string();
    };
    let base = first.date;
    let t_max = day_offset(base, last.date).max(1.0);

    let mut lines: Vec<(char, WindowLabel, Vec<(f64, f64)>)> = Vec::new();
    let mut glyphs = SPAN_GLYPHS.iter().copied().cycle();
    for label in &table.labels {
        if *label == WindowLabel::Daily {
            continue;
        }
        let glyph = glyphs.next().unwrap_or('*');
        lines.push((glyph, *label, column_points(table, *label, base)));
    }
    let bars = if show_daily {
        column_points(table, WindowLabel::Daily, base)
    } else {
        Vec::new()
    };

    let (y_min, y_max) = y_range(lines.iter().flat_map(|(_, _, pts)| pts.iter()).chain(bars.iter()))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first: bars only fill what the averages leave blank.
    for (glyph, _, pts) in &lines {
        draw_curve(&mut grid, pts, t_max, y_min, y_max, *glyph);
    }
    for &(t, y) in &bars {
        let x = map_x(t, 0.0, t_max, width);
        let top = map_y(y, y_min, y_max, height);
        for row in grid.iter_mut().skip(top) {
            if row[x] == ' ' {
                row[x] = DAILY_GLYPH;
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | volume=[{y_min:.1}, {y_max:.1}]\n",
        first.date, last.date
    ));

    let mut legend: Vec<String> = lines
        .iter()
        .map(|(glyph, label, _)| format!("{glyph} {label}"))
        .collect();
    if show_daily {
        legend.push(format!("{DAILY_GLYPH} daily"));
    }
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_offset(base: NaiveDate, date: NaiveDate) -> f64 {
    (date - base).num_days() as f64
}

fn column_points(table: &WideTable, label: WindowLabel, base: NaiveDate) -> Vec<(f64, f64)> {
    let Some(idx) = table.column_index(label) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter_map(|r| r.values[idx].map(|v| (day_offset(base, r.date), v as f64)))
        .collect()
}

fn y_range<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_max: f64, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, 0.0, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pivot;
    use crate::domain::EwmPoint;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let table = pivot(&[
            EwmPoint { date: d(1), window: WindowLabel::Span(7), value: 100 },
            EwmPoint { date: d(1), window: WindowLabel::Daily, value: 100 },
            EwmPoint { date: d(2), window: WindowLabel::Span(7), value: 110 },
            EwmPoint { date: d(2), window: WindowLabel::Daily, value: 110 },
        ]);

        let txt = render_ascii_plot(&table, false, 10, 5);
        let expected = concat!(
            "Plot: 2024-01-01 .. 2024-01-02 | volume=[99.5, 110.5]\n",
            "Legend: * 7\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn daily_bars_fill_below_the_value() {
        let table = pivot(&[
            EwmPoint { date: d(1), window: WindowLabel::Span(7), value: 10 },
            EwmPoint { date: d(1), window: WindowLabel::Daily, value: 0 },
            EwmPoint { date: d(3), window: WindowLabel::Span(7), value: 10 },
            EwmPoint { date: d(3), window: WindowLabel::Daily, value: 20 },
        ]);
        let txt = render_ascii_plot(&table, true, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(2).collect();
        assert_eq!(rows.len(), 5);
        assert!(txt.contains("| daily"));
        // The last column holds a full-height bar for the day at the maximum.
        assert!(rows.iter().all(|r| r.ends_with('|') || r.ends_with('*')));
    }

    #[test]
    fn empty_table_renders_placeholder() {
        assert_eq!(render_ascii_plot(&WideTable::default(), true, 20, 5), "Plot: (no data in range)\n");
    }
}
