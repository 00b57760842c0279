//! Plotters-powered volume trend chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! The x axis is days since the common era (`NaiveDate::num_days_from_ce`), so
//! tick labels can be turned back into dates.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Line colors for the EWM spans, in span order.
pub const SPAN_COLORS: [RGBColor; 4] = [
    RGBColor(238, 102, 136), // acute
    RGBColor(102, 187, 221), // chronic
    RGBColor(187, 221, 34),  // baseline
    RGBColor(255, 255, 255),
];

const DAILY_COLOR: RGBColor = RGBColor(136, 136, 136);

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct VolumePlottersChart<'a> {
    /// One line per EWM span.
    pub lines: &'a [Vec<(f64, f64)>],
    /// Daily totals, drawn as vertical rules from zero.
    pub daily: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for VolumePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc("volume")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Daily bars underneath the averages.
            for &(x, y) in self.daily {
                chart.draw_series(LineSeries::new([(x, y0.max(0.0)), (x, y)], &DAILY_COLOR))?;
            }

            for (i, line) in self.lines.iter().enumerate() {
                let color = SPAN_COLORS[i % SPAN_COLORS.len()];
                chart.draw_series(LineSeries::new(line.iter().copied(), &color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
