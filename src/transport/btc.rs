//! Breakthrough-curve assembly: melts the per-round lab tables into one
//! long observation table with elapsed time, exchanged pore volumes,
//! influent-normalised concentrations and the modelled breakthrough.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use crate::data::LabRound;
use crate::screening::to_ug_per_l;
use crate::transport::ade::AdeParameters;
use crate::transport::site::{CompoundProperties, SiteParameters};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("No sampling rounds to assemble")]
    NoRounds,
}

/// Builds the long breakthrough table from cleaned sampling rounds.
pub struct BtcBuilder<'a> {
    site: &'a SiteParameters,
    ade: &'a AdeParameters,
    compounds: &'a [(String, CompoundProperties)],
}

impl<'a> BtcBuilder<'a> {
    pub fn new(
        site: &'a SiteParameters,
        ade: &'a AdeParameters,
        compounds: &'a [(String, CompoundProperties)],
    ) -> Self {
        Self {
            site,
            ade,
            compounds,
        }
    }

    /// One row per round, well and compound. Time counts from the first
    /// round; concentrations are normalised against the influent of the
    /// same round (missing when the influent reads zero).
    pub fn build(
        &self,
        rounds: &[(&str, NaiveDate, &LabRound)],
        wells: &[String],
    ) -> Result<DataFrame, TransportError> {
        let (_, t0, _) = rounds.first().ok_or(TransportError::NoRounds)?;

        let mut round_col: Vec<String> = Vec::new();
        let mut well_col: Vec<String> = Vec::new();
        let mut compound_col: Vec<String> = Vec::new();
        let mut days_col: Vec<f64> = Vec::new();
        let mut tau_col: Vec<f64> = Vec::new();
        let mut conc_col: Vec<f64> = Vec::new();
        let mut c_rel_col: Vec<f64> = Vec::new();
        let mut r_col: Vec<f64> = Vec::new();
        let mut model_col: Vec<f64> = Vec::new();

        for (label, date, round) in rounds {
            let days = (*date - *t0).num_days() as f64;
            let tau = self.site.flow_rate * days / self.site.pore_volume();
            for (name, props) in self.compounds {
                let unit = round.unit(name).unwrap_or_default();
                let influent =
                    to_ug_per_l(round.value(name, "INF").unwrap_or(0.0), &unit);
                let r = props.retardation(self.site);
                let model = self.ade.relative_concentration(days, r);
                for well in wells {
                    let conc =
                        to_ug_per_l(round.value(name, well).unwrap_or(0.0), &unit);
                    let c_rel = if influent > 0.0 {
                        conc / influent
                    } else {
                        f64::NAN
                    };
                    round_col.push(label.to_string());
                    well_col.push(well.clone());
                    compound_col.push(name.clone());
                    days_col.push(days);
                    tau_col.push(tau);
                    conc_col.push(conc);
                    c_rel_col.push(c_rel);
                    r_col.push(r);
                    model_col.push(model);
                }
            }
        }

        let df = DataFrame::new(vec![
            Column::new("round".into(), round_col),
            Column::new("well".into(), well_col),
            Column::new("compound".into(), compound_col),
            Column::new("days".into(), days_col),
            Column::new("pore_volumes".into(), tau_col),
            Column::new("concentration".into(), conc_col),
            Column::new("c_rel".into(), c_rel_col),
            Column::new("retardation".into(), r_col),
            Column::new("ade_model".into(), model_col),
        ])?;
        Ok(df)
    }
}

/// Observed (days, c_rel) points of one compound at one well, in time order.
pub fn observed_points(
    table: &DataFrame,
    compound: &str,
    well: &str,
) -> Result<Vec<(f64, f64)>, TransportError> {
    let filtered = table
        .clone()
        .lazy()
        .filter(
            col("compound")
                .eq(lit(compound))
                .and(col("well").eq(lit(well))),
        )
        .sort(["days"], Default::default())
        .collect()?;
    let days = filtered.column("days")?.f64()?;
    let c_rel = filtered.column("c_rel")?.f64()?;
    Ok(days
        .into_iter()
        .zip(c_rel)
        .filter_map(|(d, c)| match (d, c) {
            (Some(d), Some(c)) if c.is_finite() => Some((d, c)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_round(inf: f64, eff: f64) -> LabRound {
        let df = DataFrame::new(vec![
            Column::new("analyte".into(), vec!["benzene"]),
            Column::new("unit".into(), vec!["µg/l"]),
            Column::new("INF".into(), vec![inf]),
            Column::new("CW1_EFF".into(), vec![eff]),
        ])
        .unwrap();
        LabRound::from_dataframe(df)
    }

    fn builder_parts() -> (SiteParameters, AdeParameters, Vec<(String, CompoundProperties)>) {
        let site = SiteParameters {
            bulk_density: 1.43,
            porosity: 0.4,
            flow_rate: 1.0,
            bulk_volume: 4.0,
            foc: 0.004,
        };
        let ade = AdeParameters {
            dispersivity: 0.4,
            velocity: 0.2,
            distance: 4.0,
        };
        let compounds = vec![(
            "benzene".to_string(),
            CompoundProperties {
                log_kow: 2.13,
                decay_rate: 0.05,
                molecular_weight: 78.11,
            },
        )];
        (site, ade, compounds)
    }

    #[test]
    fn elapsed_time_and_pore_volumes_count_from_the_first_round() {
        let (site, ade, compounds) = builder_parts();
        let builder = BtcBuilder::new(&site, &ade, &compounds);
        let t0 = fixture_round(100.0, 0.0);
        let t1 = fixture_round(100.0, 40.0);
        let d0 = NaiveDate::from_ymd_opt(2024, 8, 14).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 23).unwrap();
        let wells = vec!["CW1_EFF".to_string()];

        let table = builder
            .build(&[("T0", d0, &t0), ("T1", d1, &t1)], &wells)
            .unwrap();
        assert_eq!(table.height(), 2);

        let days = table.column("days").unwrap().f64().unwrap().clone();
        assert_eq!(days.get(0), Some(0.0));
        assert_eq!(days.get(1), Some(70.0));

        // one pore volume is 1.6 m3 at 1 m3/day
        let tau = table.column("pore_volumes").unwrap().f64().unwrap().clone();
        assert!((tau.get(1).unwrap() - 70.0 / 1.6).abs() < 1e-9);
    }

    #[test]
    fn concentrations_normalise_against_the_influent() {
        let (site, ade, compounds) = builder_parts();
        let builder = BtcBuilder::new(&site, &ade, &compounds);
        let t1 = fixture_round(100.0, 40.0);
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 23).unwrap();
        let wells = vec!["CW1_EFF".to_string()];

        let table = builder.build(&[("T1", d1, &t1)], &wells).unwrap();
        let c_rel = table.column("c_rel").unwrap().f64().unwrap().clone();
        assert!((c_rel.get(0).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_influent_leaves_the_ratio_undefined() {
        let (site, ade, compounds) = builder_parts();
        let builder = BtcBuilder::new(&site, &ade, &compounds);
        let t1 = fixture_round(0.0, 40.0);
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 23).unwrap();
        let wells = vec!["CW1_EFF".to_string()];

        let table = builder.build(&[("T1", d1, &t1)], &wells).unwrap();
        let c_rel = table.column("c_rel").unwrap().f64().unwrap().clone();
        assert!(c_rel.get(0).unwrap().is_nan());
    }

    #[test]
    fn observed_points_come_back_in_time_order() {
        let (site, ade, compounds) = builder_parts();
        let builder = BtcBuilder::new(&site, &ade, &compounds);
        let t0 = fixture_round(100.0, 10.0);
        let t1 = fixture_round(100.0, 40.0);
        let d0 = NaiveDate::from_ymd_opt(2024, 8, 14).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 23).unwrap();
        let wells = vec!["CW1_EFF".to_string()];

        // rounds deliberately out of order in the input
        let table = builder
            .build(&[("T0", d0, &t0), ("T1", d1, &t1)], &wells)
            .unwrap();
        let points = observed_points(&table, "benzene", "CW1_EFF").unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].0 < points[1].0);
        assert!((points[1].1 - 0.4).abs() < 1e-12);
    }
}
