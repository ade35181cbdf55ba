//! Traffic-light overview figures of the electron-balance screening.
//!
//! Bar height is the electron balance, bar color the screening verdict.
//! The 2D figure groups the rounds per well; the 3D figure spreads the
//! rounds along the depth axis of one bar field.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use polars::prelude::DataFrame;

use crate::charts::style::{traffic_color, traffic_from_str, CANVAS};
use crate::charts::ChartError;
use crate::screening::TrafficLight;

/// Bars of one screening table: well, bar height and verdict. An undefined
/// balance gets a token height so the verdict color stays visible.
fn verdict_bars(df: &DataFrame) -> Result<Vec<(String, f64, TrafficLight)>, ChartError> {
    let wells = df.column("obs_well")?.str()?;
    let balances = df.column("e_balance")?.f64()?;
    let verdicts = df.column("na_traffic_light")?.str()?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let well = wells.get(i).unwrap_or_default().to_string();
        let balance = balances.get(i).unwrap_or(f64::NAN);
        let verdict = traffic_from_str(verdicts.get(i).unwrap_or_default());
        let height = if balance.is_finite() { balance } else { 0.05 };
        bars.push((well, height, verdict));
    }
    Ok(bars)
}

fn height_ceiling(rounds: &[(String, Vec<(String, f64, TrafficLight)>)]) -> f64 {
    let max = rounds
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|(_, h, _)| *h))
        .fold(0.0f64, f64::max);
    (max * 1.15).max(1.5)
}

/// Grouped 2D bar figure: the given wells on the x-axis, one bar per round.
pub fn traffic_bars(
    rounds: &[(String, DataFrame)],
    wells: &[String],
    out: &Path,
) -> Result<(), ChartError> {
    if rounds.is_empty() || wells.is_empty() {
        return Err(ChartError::Empty("screening rounds".to_string()));
    }
    let bars: Vec<(String, Vec<(String, f64, TrafficLight)>)> = rounds
        .iter()
        .map(|(label, df)| Ok((label.clone(), verdict_bars(df)?)))
        .collect::<Result<_, ChartError>>()?;

    draw_bars_2d(&bars, wells, out).map_err(|e| ChartError::Render(e.to_string()))
}

fn draw_bars_2d(
    rounds: &[(String, Vec<(String, f64, TrafficLight)>)],
    wells: &[String],
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let n_wells = wells.len();
    let n_rounds = rounds.len();
    let y_max = height_ceiling(rounds);

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Electron-balance screening", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n_wells as f64 - 0.5), 0f64..y_max)?;

    let well_labels = wells.to_vec();
    chart
        .configure_mesh()
        .x_desc("well")
        .y_desc("electron balance (-)")
        .x_labels(n_wells)
        .x_label_formatter(&move |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < well_labels.len() {
                well_labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .draw()?;

    // the green/yellow decision lines
    for (threshold, style) in [(1.0, BLACK.mix(0.5)), (0.75, BLACK.mix(0.25))] {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(-0.5, threshold), (n_wells as f64 - 0.5, threshold)],
            style,
        )))?;
    }

    let group_width = 0.8;
    let bar_width = group_width / n_rounds as f64;
    for (j, (_, bars)) in rounds.iter().enumerate() {
        for (i, well) in wells.iter().enumerate() {
            let Some((_, height, verdict)) = bars.iter().find(|(w, _, _)| w == well) else {
                continue;
            };
            let x0 = i as f64 - group_width / 2.0 + j as f64 * bar_width;
            let color = traffic_color(*verdict);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, 0.0), (x0 + bar_width * 0.9, *height)],
                color.filled(),
            )))?;
        }
    }

    for (verdict, label) in [
        (TrafficLight::Green, "balance >= 1"),
        (TrafficLight::Yellow, "balance >= 0.75"),
        (TrafficLight::Red, "balance < 0.75"),
        (TrafficLight::Unknown, "no demand"),
    ] {
        let color = traffic_color(verdict);
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
            .label(label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled())
            });
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// 3D bar field: the given wells along x, rounds along the depth axis.
pub fn traffic_bars_3d(
    rounds: &[(String, DataFrame)],
    wells: &[String],
    out: &Path,
) -> Result<(), ChartError> {
    if rounds.is_empty() || wells.is_empty() {
        return Err(ChartError::Empty("screening rounds".to_string()));
    }
    let bars: Vec<(String, Vec<(String, f64, TrafficLight)>)> = rounds
        .iter()
        .map(|(label, df)| Ok((label.clone(), verdict_bars(df)?)))
        .collect::<Result<_, ChartError>>()?;

    draw_bars_3d(&bars, wells, out).map_err(|e| ChartError::Render(e.to_string()))
}

/// The three faces of one bar that stay visible under the default camera.
fn bar_faces(x0: f64, x1: f64, h: f64, z0: f64, z1: f64) -> [Vec<(f64, f64, f64)>; 3] {
    [
        // top
        vec![(x0, h, z0), (x1, h, z0), (x1, h, z1), (x0, h, z1)],
        // front
        vec![(x0, 0.0, z0), (x1, 0.0, z0), (x1, h, z0), (x0, h, z0)],
        // side
        vec![(x1, 0.0, z0), (x1, 0.0, z1), (x1, h, z1), (x1, h, z0)],
    ]
}

fn draw_bars_3d(
    rounds: &[(String, Vec<(String, f64, TrafficLight)>)],
    wells: &[String],
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let n_wells = wells.len();
    let n_rounds = rounds.len();
    let y_max = height_ceiling(rounds);

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Electron-balance screening per round", ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(0f64..n_wells as f64, 0f64..y_max, 0f64..n_rounds as f64)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.9;
        pb.pitch = 0.25;
        pb.scale = 0.8;
        pb.into_matrix()
    });
    chart.configure_axes().draw()?;

    // far rounds first so nearer bars overdraw them
    for (j, (_, bars)) in rounds.iter().enumerate().rev() {
        for (i, well) in wells.iter().enumerate() {
            let Some((_, height, verdict)) = bars.iter().find(|(w, _, _)| w == well) else {
                continue;
            };
            let color = traffic_color(*verdict);
            let (x0, x1) = (i as f64 + 0.15, i as f64 + 0.85);
            let (z0, z1) = (j as f64 + 0.15, j as f64 + 0.85);
            let faces = bar_faces(x0, x1, *height, z0, z1);
            let shades = [1.0, 0.7, 0.5];
            for (face, shade) in faces.into_iter().zip(shades) {
                chart.draw_series(std::iter::once(Polygon::new(
                    face,
                    color.mix(shade).filled(),
                )))?;
            }
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn screening_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("obs_well".into(), vec!["INF", "CW1_EFF"]),
            Column::new("e_balance".into(), vec![2.0, f64::NAN]),
            Column::new("na_traffic_light".into(), vec!["green", "unknown"]),
        ])
        .unwrap()
    }

    #[test]
    fn bars_carry_height_and_verdict() {
        let bars = verdict_bars(&screening_df()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0], ("INF".to_string(), 2.0, TrafficLight::Green));
        // undefined balance keeps a token bar with its verdict
        assert_eq!(bars[1].1, 0.05);
        assert_eq!(bars[1].2, TrafficLight::Unknown);
    }

    #[test]
    fn ceiling_covers_the_tallest_bar() {
        let bars = vec![("T0".to_string(), verdict_bars(&screening_df()).unwrap())];
        let ceiling = height_ceiling(&bars);
        assert!(ceiling >= 2.0 * 1.15);
    }

    #[test]
    fn bar_faces_share_their_edges() {
        let [top, front, side] = bar_faces(0.0, 1.0, 2.0, 0.0, 1.0);
        assert_eq!(top.len(), 4);
        assert!(front.iter().all(|&(_, _, z)| z == 0.0));
        assert!(side.iter().all(|&(x, _, _)| x == 1.0));
        assert!(top.iter().all(|&(_, y, _)| y == 2.0));
    }
}
