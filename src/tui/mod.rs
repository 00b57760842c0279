//! Ratatui-based terminal UI.
//!
//! The TUI loads the training log once, then lets the user move the date range,
//! switch EWM span presets and toggle daily bars. Every change re-runs the
//! analysis pipeline on the in-memory records.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::analysis::DailyCache;
use crate::app::pipeline::{RunOutput, load_input, run_with_ingest};
use crate::domain::{AnalysisConfig, DEFAULT_WINDOWS, WEEKLY_WINDOWS, WindowLabel};
use crate::error::AppError;
use crate::io::ingest::IngestedData;

mod plotters_chart;

use plotters_chart::{SPAN_COLORS, VolumePlottersChart};

/// File written by the export key, relative to the working directory.
const EXPORT_FILE: &str = "volumes.csv";

const FIELD_COUNT: usize = 4;

/// Start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    // Load before touching the terminal so input errors print normally.
    let ingest = load_input(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, ingest)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: AnalysisConfig,
    ingest: IngestedData,
    cache: DailyCache,
    /// Full span of the log; the range can't leave it.
    bounds: (NaiveDate, NaiveDate),
    start: NaiveDate,
    end: NaiveDate,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: AnalysisConfig, ingest: IngestedData) -> Result<Self, AppError> {
        let bounds = ingest
            .date_span()
            .ok_or_else(|| AppError::new(3, "Training log has no sessions."))?;
        let start = config.start.unwrap_or(bounds.0).clamp(bounds.0, bounds.1);
        let end = config.end.unwrap_or(bounds.1).clamp(start, bounds.1);

        let mut app = Self {
            config,
            ingest,
            cache: DailyCache::new(),
            bounds,
            start,
            end,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refresh()?;
        app.status = format!("Loaded {} sessions from {}.", app.ingest.rows_used(), app.ingest.source);
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-7)?,
            KeyCode::Right => self.adjust_field(7)?,
            KeyCode::PageUp => self.adjust_field(-30)?,
            KeyCode::PageDown => self.adjust_field(30)?,
            KeyCode::Char('d') => {
                self.config.show_daily = !self.config.show_daily;
                self.status = format!("daily bars: {}", on_off(self.config.show_daily));
            }
            KeyCode::Char('r') => {
                self.start = self.bounds.0;
                self.end = self.bounds.1;
                self.refresh()?;
                self.status = "Range reset to the full log.".to_string();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        Ok(false)
    }

    fn adjust_field(&mut self, days: i64) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                self.start = shift(self.start, days).clamp(self.bounds.0, self.end);
                self.refresh()?;
                self.status = format!("start: {}", self.start);
            }
            1 => {
                self.end = shift(self.end, days).clamp(self.start, self.bounds.1);
                self.refresh()?;
                self.status = format!("end: {}", self.end);
            }
            2 => {
                self.config.windows = next_windows(&self.config.windows);
                self.refresh()?;
                self.status = format!("windows: {}", fmt_windows(&self.config.windows));
            }
            3 => {
                self.config.show_daily = !self.config.show_daily;
                self.status = format!("daily bars: {}", on_off(self.config.show_daily));
            }
            _ => {}
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), AppError> {
        self.config.start = Some(self.start);
        self.config.end = Some(self.end);
        let run = run_with_ingest(&self.config, self.ingest.clone(), &mut self.cache)?;
        self.run = Some(run);
        Ok(())
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = PathBuf::from(EXPORT_FILE);
        self.status = match crate::io::export::write_wide_csv(&path, &run.table) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("vt", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " - EWM average volume | {} | {} .. {}",
                self.ingest.source, self.start, self.end
            )),
        ]));

        let mut metrics: Vec<Span> = Vec::new();
        if let Some(run) = &self.run {
            let spans = self.config.windows.iter().enumerate();
            for (i, &w) in spans {
                let Some(c) = run.comparison.iter().find(|c| c.label == WindowLabel::Span(w)) else {
                    continue;
                };
                let rgb = SPAN_COLORS[i % SPAN_COLORS.len()];
                metrics.push(Span::styled(
                    format!("{w}d: {} ({:+})  ", c.now, c.delta),
                    Style::default().fg(Color::Rgb(rgb.0, rgb.1, rgb.2)),
                ));
            }
        }
        if metrics.is_empty() {
            metrics.push(Span::styled("no data in range", Style::default().fg(Color::Gray)));
        }
        lines.push(Line::from(metrics));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Average volume").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.run.as_ref().and_then(|run| chart_series(run, &self.config)) else {
            let msg = Paragraph::new("No sessions in the selected range.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let widget = VolumePlottersChart {
            lines: &series.lines,
            daily: &series.daily,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_volume,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Start: {}", self.start)),
            ListItem::new(format!("End: {}", self.end)),
            ListItem::new(format!("Windows: {}", fmt_windows(&self.config.windows))),
            ListItem::new(format!("Daily bars: {}", on_off(self.config.show_daily))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ ±1 week  PgUp/PgDn ±30 days  d daily  r reset  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for Plotters.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    lines: Vec<Vec<(f64, f64)>>,
    daily: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput, config: &AnalysisConfig) -> Option<ChartSeries> {
    let table = &run.table;
    let first = table.rows.first()?;
    let last = table.rows.last()?;

    let column = |label: WindowLabel| -> Vec<(f64, f64)> {
        let Some(idx) = table.column_index(label) else {
            return Vec::new();
        };
        table
            .rows
            .iter()
            .filter_map(|r| r.values[idx].map(|v| (day_number(r.date), v as f64)))
            .collect()
    };

    let lines: Vec<Vec<(f64, f64)>> = config
        .windows
        .iter()
        .map(|&w| column(WindowLabel::Span(w)))
        .collect();
    let daily = if config.show_daily {
        column(WindowLabel::Daily)
    } else {
        Vec::new()
    };

    let mut x0 = day_number(first.date);
    let mut x1 = day_number(last.date);
    if x1 <= x0 {
        x0 -= 1.0;
        x1 += 1.0;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in lines.iter().flatten().chain(daily.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = if y_min.is_finite() { y_min - 1.0 } else { 0.0 };
        y_max = if y_max.is_finite() { y_max + 1.0 } else { 1.0 };
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(ChartSeries {
        lines,
        daily,
        x_bounds: [x0, x1],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn next_windows(cur: &[u32]) -> Vec<u32> {
    if cur == DEFAULT_WINDOWS {
        WEEKLY_WINDOWS.to_vec()
    } else {
        DEFAULT_WINDOWS.to_vec()
    }
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(chrono::Duration::days(days)).unwrap_or(date)
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn fmt_windows(windows: &[u32]) -> String {
    windows.iter().map(|w| w.to_string()).collect::<Vec<_>>().join(", ")
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d %b %y").to_string())
        .unwrap_or_default()
}

fn fmt_axis_volume(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrainingRecord;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn window_presets_alternate() {
        assert_eq!(next_windows(&DEFAULT_WINDOWS), WEEKLY_WINDOWS.to_vec());
        assert_eq!(next_windows(&WEEKLY_WINDOWS), DEFAULT_WINDOWS.to_vec());
        assert_eq!(next_windows(&[5]), DEFAULT_WINDOWS.to_vec());
    }

    #[test]
    fn axis_dates_round_trip_day_numbers() {
        assert_eq!(fmt_axis_date(day_number(d(3))), "03 Feb 24");
    }

    #[test]
    fn chart_series_follows_config_windows() {
        let ingest = IngestedData::from_records(
            vec![
                TrainingRecord::with_volume(d(1), 100),
                TrainingRecord::with_volume(d(2), 200),
            ],
            "test",
        );
        let config = AnalysisConfig {
            windows: vec![7, 3],
            show_daily: true,
            ..AnalysisConfig::default()
        };
        let mut cache = DailyCache::new();
        let run = run_with_ingest(&config, ingest, &mut cache).unwrap();

        let series = chart_series(&run, &config).unwrap();
        assert_eq!(series.lines.len(), 2);
        assert_eq!(series.lines[0][1].1, 125.0);
        assert_eq!(series.lines[1][1].1, 150.0);
        assert_eq!(series.daily.len(), 2);
        assert_eq!(series.x_bounds, [day_number(d(1)), day_number(d(2))]);
        assert!(series.y_bounds[0] < 100.0 && series.y_bounds[1] > 200.0);
    }
}
