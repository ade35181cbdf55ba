//! Breakthrough-curve figures: measured relative concentrations against the
//! advection-dispersion model.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::*;

use crate::charts::style::{series_color, CANVAS, WIDE_CANVAS};
use crate::charts::ChartError;
use crate::transport::{observed_points, AdeParameters};

/// Retardation factor of one compound as recorded in the breakthrough table.
fn retardation_of(table: &DataFrame, compound: &str) -> Result<f64, ChartError> {
    let filtered = table
        .clone()
        .lazy()
        .filter(col("compound").eq(lit(compound)))
        .collect()?;
    filtered
        .column("retardation")?
        .f64()?
        .get(0)
        .ok_or_else(|| ChartError::Empty(format!("no rows for {compound}")))
}

/// Time axis of a breakthrough panel: at least one model-travel time past
/// the last observation.
fn time_horizon(points: &[(f64, f64)], ade: &AdeParameters, r: f64) -> f64 {
    let last = points.last().map(|&(d, _)| d).unwrap_or(0.0);
    let travel = ade.distance * r / ade.velocity;
    (last * 1.2).max(travel * 1.5).max(30.0)
}

/// Side-by-side panels of one compound at several wells, measured points
/// plus the modelled curve.
pub fn breakthrough_panels(
    table: &DataFrame,
    ade: &AdeParameters,
    compound: &str,
    wells: &[String],
    out: &Path,
) -> Result<(), ChartError> {
    if wells.is_empty() {
        return Err(ChartError::Empty("no wells for breakthrough panels".to_string()));
    }
    let r = retardation_of(table, compound)?;
    let per_well: Vec<(String, Vec<(f64, f64)>)> = wells
        .iter()
        .map(|w| Ok((w.clone(), observed_points(table, compound, w)?)))
        .collect::<Result<_, crate::transport::TransportError>>()
        .map_err(|e| ChartError::Render(e.to_string()))?;

    draw_panels(&per_well, ade, r, compound, out).map_err(|e| ChartError::Render(e.to_string()))
}

fn draw_panels(
    per_well: &[(String, Vec<(f64, f64)>)],
    ade: &AdeParameters,
    r: f64,
    compound: &str,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(out, WIDE_CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let inner = root.titled(&format!("{compound} breakthrough"), ("sans-serif", 26))?;
    let panels = inner.split_evenly((1, per_well.len()));
    for (panel, (well, points)) in panels.iter().zip(per_well) {
        draw_single_panel(panel, well, points, ade, r)?;
    }
    root.present()?;
    Ok(())
}

fn draw_single_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    well: &str,
    points: &[(f64, f64)],
    ade: &AdeParameters,
    r: f64,
) -> Result<(), Box<dyn Error>> {
    let t_max = time_horizon(points, ade, r);
    let y_max = points
        .iter()
        .map(|&(_, c)| c)
        .fold(1.0f64, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(well, ("sans-serif", 20))
        .margin(8)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..t_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("time (days)")
        .y_desc("C/C0 (-)")
        .x_labels(6)
        .draw()?;

    let steps = 400;
    let model: Vec<(f64, f64)> = (0..=steps)
        .map(|i| {
            let t = t_max * i as f64 / steps as f64;
            (t, ade.relative_concentration(t, r))
        })
        .collect();
    chart
        .draw_series(LineSeries::new(model, &series_color(0)))?
        .label("ADE model")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], series_color(0)));

    chart
        .draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 5, series_color(1).filled())),
        )?
        .label("measured")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, series_color(1).filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// One panel, several compounds at the same well: the modelled curves show
/// how sorption spreads the fronts, the points carry the observations.
pub fn breakthrough_overlay(
    table: &DataFrame,
    ade: &AdeParameters,
    well: &str,
    compounds: &[String],
    out: &Path,
) -> Result<(), ChartError> {
    if compounds.is_empty() {
        return Err(ChartError::Empty("no compounds for overlay".to_string()));
    }
    let mut series: Vec<(String, f64, Vec<(f64, f64)>)> = Vec::new();
    for compound in compounds {
        let r = retardation_of(table, compound)?;
        let points = observed_points(table, compound, well)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        series.push((compound.clone(), r, points));
    }
    draw_overlay(&series, ade, well, out).map_err(|e| ChartError::Render(e.to_string()))
}

fn draw_overlay(
    series: &[(String, f64, Vec<(f64, f64)>)],
    ade: &AdeParameters,
    well: &str,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let t_max = series
        .iter()
        .map(|(_, r, points)| time_horizon(points, ade, *r))
        .fold(30.0f64, f64::max);
    let y_max = series
        .iter()
        .flat_map(|(_, _, points)| points.iter().map(|&(_, c)| c))
        .fold(1.0f64, f64::max)
        * 1.1;

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Breakthrough at {well}"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..t_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("time (days)")
        .y_desc("C/C0 (-)")
        .draw()?;

    let steps = 400;
    for (i, (compound, r, points)) in series.iter().enumerate() {
        let color = series_color(i);
        let model: Vec<(f64, f64)> = (0..=steps)
            .map(|k| {
                let t = t_max * k as f64 / steps as f64;
                (t, ade.relative_concentration(t, *r))
            })
            .collect();
        chart
            .draw_series(LineSeries::new(model, &color))?
            .label(compound.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 4, color.filled())),
        )?;
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

    fn table() -> DataFrame {
        DataFrame::new(vec![
            Column::new("round".into(), vec!["T0", "T1"]),
            Column::new("well".into(), vec!["CW1_EFF", "CW1_EFF"]),
            Column::new("compound".into(), vec!["benzene", "benzene"]),
            Column::new("days".into(), vec![0.0, 70.0]),
            Column::new("c_rel".into(), vec![0.0, 0.4]),
            Column::new("retardation".into(), vec![2.2, 2.2]),
        ])
        .unwrap()
    }

    #[test]
    fn retardation_reads_from_the_table() {
        assert!((retardation_of(&table(), "benzene").unwrap() - 2.2).abs() < 1e-12);
        assert!(retardation_of(&table(), "toluene").is_err());
    }

    #[test]
    fn horizon_reaches_past_data_and_travel_time() {
        let ade = AdeParameters {
            dispersivity: 0.4,
            velocity: 0.2,
            distance: 4.0,
        };
        let points = vec![(0.0, 0.0), (70.0, 0.4)];
        let horizon = time_horizon(&points, &ade, 2.0);
        assert!(horizon >= 70.0 * 1.2);
        assert!(horizon >= 4.0 * 2.0 / 0.2);
    }
}
