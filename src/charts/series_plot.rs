//! Concentration-versus-time figures: one analyte followed through the
//! sampling rounds at selected wells, one line per well.

use std::error::Error;
use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;

use crate::charts::style::{series_color, CANVAS};
use crate::charts::ChartError;
use crate::data::LabRound;

/// (date, value) points of one analyte at one well across the rounds, in
/// round order. Normalisation divides by the influent of the same round;
/// rounds without a usable value are left out.
pub fn concentration_points(
    rounds: &[(&str, NaiveDate, &LabRound)],
    analyte: &str,
    well: &str,
    normalize: bool,
) -> Vec<(NaiveDate, f64)> {
    rounds
        .iter()
        .filter_map(|(_, date, round)| {
            let mut value = round.value(analyte, well)?;
            if normalize {
                let influent = round.value(analyte, "INF")?;
                if influent <= 0.0 {
                    return None;
                }
                value /= influent;
            }
            value.is_finite().then_some((*date, value))
        })
        .collect()
}

/// Time-series figure of one analyte at several wells.
pub fn compound_time_series(
    rounds: &[(&str, NaiveDate, &LabRound)],
    analyte: &str,
    wells: &[String],
    normalize: bool,
    out: &Path,
) -> Result<(), ChartError> {
    let series: Vec<(String, Vec<(NaiveDate, f64)>)> = wells
        .iter()
        .map(|well| {
            (
                well.clone(),
                concentration_points(rounds, analyte, well, normalize),
            )
        })
        .filter(|(_, points)| !points.is_empty())
        .collect();
    if series.is_empty() {
        return Err(ChartError::Empty(format!("time series of {analyte}")));
    }

    let unit = rounds
        .first()
        .and_then(|(_, _, round)| round.unit(analyte))
        .unwrap_or_default();
    let y_desc = if normalize {
        format!("{analyte} C/C(INF)")
    } else {
        format!("{analyte} ({unit})")
    };

    draw_time_series(&series, analyte, &y_desc, out)
        .map_err(|e| ChartError::Render(e.to_string()))
}

fn draw_time_series(
    series: &[(String, Vec<(NaiveDate, f64)>)],
    analyte: &str,
    y_desc: &str,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut d0 = NaiveDate::MAX;
    let mut d1 = NaiveDate::MIN;
    let mut y_max = f64::NEG_INFINITY;
    for (_, points) in series {
        for &(date, value) in points {
            d0 = d0.min(date);
            d1 = d1.max(date);
            y_max = y_max.max(value);
        }
    }
    if y_max <= 0.0 {
        y_max = 1.0;
    }
    y_max *= 1.1;
    // a single-round record still needs a non-degenerate axis
    if d0 == d1 {
        d1 = d1 + chrono::Duration::days(1);
    }

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{analyte} over the sampling rounds"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(d0..d1, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("sampling date")
        .y_desc(y_desc)
        .x_label_formatter(&|date| date.format("%b %y").to_string())
        .x_labels(6)
        .draw()?;

    for (i, (well, points)) in series.iter().enumerate() {
        let color = series_color(i);
        chart
            .draw_series(LineSeries::new(points.clone(), &color))?
            .label(well.as_str())
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
    use polars::prelude::*;

    fn round(inf: f64, eff: f64) -> LabRound {
        let df = DataFrame::new(vec![
            Column::new("analyte".into(), vec!["benzene"]),
            Column::new("unit".into(), vec!["µg/l"]),
            Column::new("INF".into(), vec![inf]),
            Column::new("CW1_EFF".into(), vec![eff]),
        ])
        .unwrap();
        LabRound::from_dataframe(df)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn points_follow_the_rounds_in_order() {
        let t0 = round(100.0, 10.0);
        let t1 = round(100.0, 40.0);
        let rounds: Vec<(&str, NaiveDate, &LabRound)> = vec![
            ("T0", date(2024, 8, 14), &t0),
            ("T1", date(2024, 10, 23), &t1),
        ];
        let points = concentration_points(&rounds, "benzene", "CW1_EFF", false);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], (date(2024, 8, 14), 10.0));
        assert_eq!(points[1], (date(2024, 10, 23), 40.0));
    }

    #[test]
    fn normalization_divides_by_the_round_influent() {
        let t1 = round(100.0, 40.0);
        let rounds: Vec<(&str, NaiveDate, &LabRound)> = vec![("T1", date(2024, 10, 23), &t1)];
        let points = concentration_points(&rounds, "benzene", "CW1_EFF", true);
        assert_eq!(points, vec![(date(2024, 10, 23), 0.4)]);
    }

    #[test]
    fn rounds_without_influent_drop_out_of_normalized_series() {
        let t0 = round(0.0, 10.0);
        let t1 = round(100.0, 40.0);
        let rounds: Vec<(&str, NaiveDate, &LabRound)> = vec![
            ("T0", date(2024, 8, 14), &t0),
            ("T1", date(2024, 10, 23), &t1),
        ];
        let points = concentration_points(&rounds, "benzene", "CW1_EFF", true);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].0, date(2024, 10, 23));
    }

    #[test]
    fn unknown_analyte_yields_no_points() {
        let t0 = round(100.0, 10.0);
        let rounds: Vec<(&str, NaiveDate, &LabRound)> = vec![("T0", date(2024, 8, 14), &t0)];
        assert!(concentration_points(&rounds, "toluene", "CW1_EFF", false).is_empty());
    }
}
