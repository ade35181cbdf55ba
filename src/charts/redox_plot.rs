//! Redox and temperature time-series figures.
//!
//! One redox figure per wetland cell with a line per sensor depth (the mean
//! over the four stations), and one temperature figure with a line per
//! wetland plus the overall mean. Logger outages stay visible as gaps.

use std::error::Error;
use std::path::Path;

use chrono::NaiveDateTime;
use plotters::prelude::*;

use crate::charts::style::{series_color, CANVAS};
use crate::charts::ChartError;
use crate::config;
use crate::data::TimeTable;

/// Display window and axis overrides of a time-series figure.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesOptions {
    /// Restrict to this time window; full record when absent.
    pub window: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Fixed y-axis limits; invalid limits are warned about and ignored.
    pub y_limits: Option<(f64, f64)>,
}

/// Redox potentials of one wetland, one line per sensor depth.
pub fn redox_time_series(
    table: &TimeTable,
    wetland: u8,
    opts: &TimeSeriesOptions,
    out: &Path,
) -> Result<(), ChartError> {
    let table = apply_window(table, opts);
    if table.is_empty() {
        return Err(ChartError::Empty(format!("redox data of wetland {wetland}")));
    }

    let depths: [u16; 4] = [20, 40, 60, 80];
    let series: Vec<(String, Vec<f64>)> = depths
        .iter()
        .map(|&d| {
            let nodes = config::redox_node_group(wetland, d);
            (format!("{d} cm"), table.mean_across(&nodes))
        })
        .collect();

    draw_time_series(
        &table,
        &series,
        &format!("Redox potential - wetland {wetland}"),
        "redox potential (mV vs SHE)",
        opts.y_limits,
        out,
    )
    .map_err(|e| ChartError::Render(e.to_string()))
}

/// Water temperatures: one line per wetland and the overall mean in black.
pub fn temperature_time_series(
    table: &TimeTable,
    opts: &TimeSeriesOptions,
    out: &Path,
) -> Result<(), ChartError> {
    let table = apply_window(table, opts);
    if table.is_empty() {
        return Err(ChartError::Empty("temperature data".to_string()));
    }

    let mut series: Vec<(String, Vec<f64>)> = config::WETLANDS
        .iter()
        .map(|&w| {
            let nodes = config::temperature_node_group(w);
            (format!("wetland {w}"), table.mean_across(&nodes))
        })
        .collect();
    let all_nodes: Vec<String> = table.nodes().to_vec();
    series.push(("mean".to_string(), table.mean_across(&all_nodes)));

    draw_time_series(
        &table,
        &series,
        "Water temperature",
        "temperature (degC)",
        opts.y_limits,
        out,
    )
    .map_err(|e| ChartError::Render(e.to_string()))
}

fn apply_window(table: &TimeTable, opts: &TimeSeriesOptions) -> TimeTable {
    match opts.window {
        Some((start, end)) => table.window(start, end),
        None => table.clone(),
    }
}

/// Pick the y-range: requested limits when they are sane, the padded data
/// range otherwise.
fn resolve_y_range(series: &[(String, Vec<f64>)], requested: Option<(f64, f64)>) -> (f64, f64) {
    if let Some((lo, hi)) = requested {
        if lo < hi {
            return (lo, hi);
        }
        log::warn!("ignoring y-limits ({lo}, {hi}): lower bound must be below upper");
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, values) in series {
        for &v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if min > max {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

/// Split a series at its gaps so outages are not drawn as line segments.
fn gap_segments(times: &[NaiveDateTime], values: &[f64]) -> Vec<Vec<(NaiveDateTime, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(NaiveDateTime, f64)> = Vec::new();
    for (t, &v) in times.iter().zip(values) {
        if v.is_finite() {
            current.push((*t, v));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn draw_time_series(
    table: &TimeTable,
    series: &[(String, Vec<f64>)],
    caption: &str,
    y_desc: &str,
    y_limits: Option<(f64, f64)>,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let times = table.times();
    let (t0, t1) = (times[0], times[times.len() - 1]);
    let (y_min, y_max) = resolve_y_range(series, y_limits);

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(RangedDateTime::from(t0..t1), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("date")
        .y_desc(y_desc)
        .x_label_formatter(&|dt| dt.format("%b %y").to_string())
        .x_labels(8)
        .draw()?;

    for (i, (label, values)) in series.iter().enumerate() {
        let color = series_color(i);
        for segment in gap_segments(times, values) {
            chart.draw_series(LineSeries::new(segment, &color))?;
        }
        // one legend entry per series, not per segment
        chart
            .draw_series(std::iter::empty::<PathElement<(NaiveDateTime, f64)>>())?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_y_limits_fall_back_to_the_data_range() {
        let series = vec![("a".to_string(), vec![10.0, 20.0, f64::NAN])];
        let (lo, hi) = resolve_y_range(&series, Some((5.0, 5.0)));
        assert!(lo < 10.0 && hi > 20.0);
        assert_eq!(resolve_y_range(&series, Some((-100.0, 100.0))), (-100.0, 100.0));
    }

    #[test]
    fn gaps_split_the_line_into_segments() {
        let t = |h: u32| {
            chrono::NaiveDate::from_ymd_opt(2024, 8, 14)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        let times = vec![t(10), t(11), t(12), t(13)];
        let values = vec![1.0, f64::NAN, 2.0, 3.0];
        let segments = gap_segments(&times, &values);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 1);
        assert_eq!(segments[1].len(), 2);
    }
}
