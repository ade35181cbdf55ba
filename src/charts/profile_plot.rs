//! Concentration profiles along the flow path of one wetland.
//!
//! X-axis: the wells from influent to effluent at one depth; one line per
//! sampling round. Optionally normalised to the influent, compensated for
//! dilution via the chloride tracer, and drawn with a dual-unit axis.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::charts::style::{series_color, CANVAS};
use crate::charts::ChartError;
use crate::config::{self, Depth};
use crate::data::LabRound;

#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    /// Divide by the influent concentration of the same round.
    pub normalize: bool,
    /// Scale each well by the chloride ratio influent/well, so pure dilution
    /// reads as a flat line.
    pub dilution_compensation: bool,
    /// Plot in mg/L with a secondary ug/L axis (for ug/L analytes).
    pub milligram_axis: bool,
}

/// Per-well profile values of one analyte, with the requested corrections.
pub fn profile_values(
    round: &LabRound,
    analyte: &str,
    wells: &[String],
    opts: &ProfileOptions,
) -> Vec<f64> {
    let mut values = round.series(analyte, wells);

    if opts.dilution_compensation {
        let chloride_inf = round.value("chloride", "INF").unwrap_or(f64::NAN);
        for (value, well) in values.iter_mut().zip(wells) {
            let chloride = round.value("chloride", well).unwrap_or(f64::NAN);
            if chloride > 0.0 && chloride_inf.is_finite() {
                *value *= chloride_inf / chloride;
            } else {
                *value = f64::NAN;
            }
        }
    }
    if opts.normalize {
        let influent = values.first().copied().unwrap_or(f64::NAN);
        for value in values.iter_mut() {
            if influent > 0.0 {
                *value /= influent;
            } else {
                *value = f64::NAN;
            }
        }
    } else if opts.milligram_axis {
        for value in values.iter_mut() {
            *value /= 1000.0;
        }
    }
    values
}

/// Profile figure of one analyte in one wetland at one depth, a line per
/// round.
pub fn concentration_profile(
    rounds: &[(&str, &LabRound)],
    analyte: &str,
    wetland: u8,
    depth: Depth,
    opts: &ProfileOptions,
    out: &Path,
) -> Result<(), ChartError> {
    if rounds.is_empty() {
        return Err(ChartError::Empty(format!("profile of {analyte}")));
    }
    let wells = config::well_sequence(wetland, depth);
    let series: Vec<(String, Vec<f64>)> = rounds
        .iter()
        .map(|(label, round)| (label.to_string(), profile_values(round, analyte, &wells, opts)))
        .collect();

    draw_profile(&series, &wells, analyte, wetland, depth, opts, out)
        .map_err(|e| ChartError::Render(e.to_string()))
}

fn y_description(analyte: &str, opts: &ProfileOptions) -> String {
    if opts.normalize {
        format!("{analyte} C/C(INF)")
    } else if opts.milligram_axis {
        format!("{analyte} (mg/L)")
    } else {
        format!("{analyte} concentration")
    }
}

fn draw_profile(
    series: &[(String, Vec<f64>)],
    wells: &[String],
    analyte: &str,
    wetland: u8,
    depth: Depth,
    opts: &ProfileOptions,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let n = wells.len();
    let mut y_max = f64::NEG_INFINITY;
    for (_, values) in series {
        for &v in values {
            if v.is_finite() {
                y_max = y_max.max(v);
            }
        }
    }
    if !y_max.is_finite() || y_max <= 0.0 {
        y_max = 1.0;
    }
    y_max *= 1.1;

    let root = BitMapBackend::new(out, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let caption = format!(
        "{analyte} along wetland {wetland} ({} wells)",
        depth.as_str()
    );
    let x_range = -0.5f64..(n as f64 - 0.5);
    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(caption, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(70);

    let well_labels = wells.to_vec();
    let x_formatter = move |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < well_labels.len() {
            well_labels[idx as usize].clone()
        } else {
            String::new()
        }
    };

    if opts.milligram_axis && !opts.normalize {
        // dual-unit axis: mg/L on the left, ug/L on the right
        let mut chart = builder
            .right_y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), 0f64..y_max)?
            .set_secondary_coord(x_range, 0f64..(y_max * 1000.0));
        chart
            .configure_mesh()
            .x_desc("well")
            .y_desc(y_description(analyte, opts))
            .x_labels(n)
            .x_label_formatter(&x_formatter)
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc(format!("{analyte} (\u{b5}g/L)"))
            .draw()?;
        draw_round_lines(&mut *chart, series)?;
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    } else {
        let mut chart = builder.build_cartesian_2d(x_range, 0f64..y_max)?;
        chart
            .configure_mesh()
            .x_desc("well")
            .y_desc(y_description(analyte, opts))
            .x_labels(n)
            .x_label_formatter(&x_formatter)
            .draw()?;
        draw_round_lines(&mut chart, series)?;
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_round_lines<DB: DrawingBackend, CT: CoordTranslate<From = (f64, f64)>>(
    chart: &mut ChartContext<DB, CT>,
    series: &[(String, Vec<f64>)],
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    for (i, (label, values)) in series.iter().enumerate() {
        let color = series_color(i);
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(x, &v)| (x as f64, v))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), &color))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 4, color.filled())),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn fixture() -> LabRound {
        let df = DataFrame::new(vec![
            Column::new("analyte".into(), vec!["benzene", "chloride"]),
            Column::new("unit".into(), vec!["µg/l", "mg/l"]),
            Column::new("INF".into(), vec![200.0, 100.0]),
            Column::new("CW1MF01".into(), vec![50.0, 50.0]),
        ])
        .unwrap();
        LabRound::from_dataframe(df)
    }

    fn wells() -> Vec<String> {
        vec!["INF".to_string(), "CW1MF01".to_string()]
    }

    #[test]
    fn normalization_divides_by_the_influent() {
        let opts = ProfileOptions {
            normalize: true,
            ..Default::default()
        };
        let values = profile_values(&fixture(), "benzene", &wells(), &opts);
        assert_eq!(values, vec![1.0, 0.25]);
    }

    #[test]
    fn dilution_compensation_uses_the_chloride_ratio() {
        let opts = ProfileOptions {
            dilution_compensation: true,
            ..Default::default()
        };
        // chloride halves, so the measured 50 scales back up to 100
        let values = profile_values(&fixture(), "benzene", &wells(), &opts);
        assert_eq!(values, vec![200.0, 100.0]);
    }

    #[test]
    fn milligram_axis_rescales_micrograms() {
        let opts = ProfileOptions {
            milligram_axis: true,
            ..Default::default()
        };
        let values = profile_values(&fixture(), "benzene", &wells(), &opts);
        assert_eq!(values, vec![0.2, 0.05]);
    }
}
