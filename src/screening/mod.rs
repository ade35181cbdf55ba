//! Natural-Attenuation Screening Module
//! Electron-balance screening of one sampling round: available electron
//! acceptors versus the electron demand of the dissolved contaminants, a
//! traffic-light verdict per well, and intervention-value checks.

mod properties;

pub use properties::{AcceptorGroup, ContaminantGroup, ContaminantSpec, ElectronAcceptor};

use polars::prelude::*;
use thiserror::Error;

use crate::data::LabRound;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Round tables share no wells")]
    NoCommonWells,
}

/// Verdict of the electron-balance screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
    /// Balance undefined: no measurable electron demand.
    Unknown,
}

impl TrafficLight {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLight::Green => "green",
            TrafficLight::Yellow => "yellow",
            TrafficLight::Red => "red",
            TrafficLight::Unknown => "unknown",
        }
    }
}

/// Convert a lab value to mg/L based on its reported unit. Unknown units
/// pass through unchanged.
pub fn to_mg_per_l(value: f64, unit: &str) -> f64 {
    match unit.trim().to_lowercase().as_str() {
        "µg/l" | "ug/l" => value / 1000.0,
        "ng/l" => value / 1_000_000.0,
        _ => value,
    }
}

/// Convert a lab value to ug/L based on its reported unit.
pub fn to_ug_per_l(value: f64, unit: &str) -> f64 {
    match unit.trim().to_lowercase().as_str() {
        "mg/l" => value * 1000.0,
        "ng/l" => value / 1000.0,
        _ => value,
    }
}

/// Available electron acceptors at a well, in mmol electrons per litre.
pub fn reductor_total(round: &LabRound, well: &str, group: AcceptorGroup) -> f64 {
    group
        .acceptors()
        .iter()
        .map(|acceptor| {
            let value = round.value(acceptor.name, well).unwrap_or(0.0);
            let unit = round.unit(acceptor.name).unwrap_or_default();
            to_mg_per_l(value, &unit) / acceptor.molecular_weight * acceptor.electrons
        })
        .sum()
}

/// Electron demand of the dissolved contaminants at a well, in mmol
/// electrons per litre.
pub fn oxidator_total(round: &LabRound, well: &str, group: ContaminantGroup) -> f64 {
    group
        .contaminants()
        .iter()
        .map(|spec| {
            let value = round.value(spec.name, well).unwrap_or(0.0);
            let unit = round.unit(spec.name).unwrap_or_default();
            to_mg_per_l(value, &unit) / spec.molecular_weight * spec.electrons
        })
        .sum()
}

/// Ratio of available acceptors to contaminant demand. Undefined when there
/// is no demand.
pub fn electron_balance(reductors: f64, oxidators: f64) -> Option<f64> {
    (oxidators > 0.0).then(|| reductors / oxidators)
}

/// Screening verdict: a balance of one means just enough acceptors for full
/// mineralisation; below 0.75 the supply is clearly short.
pub fn traffic_light(balance: Option<f64>) -> TrafficLight {
    match balance {
        None => TrafficLight::Unknown,
        Some(b) if b >= 1.0 => TrafficLight::Green,
        Some(b) if b >= 0.75 => TrafficLight::Yellow,
        Some(_) => TrafficLight::Red,
    }
}

/// Summed contaminant concentration at a well, ug/L.
pub fn total_contaminants(round: &LabRound, well: &str, group: ContaminantGroup) -> f64 {
    group
        .contaminants()
        .iter()
        .map(|spec| {
            let value = round.value(spec.name, well).unwrap_or(0.0);
            let unit = round.unit(spec.name).unwrap_or_default();
            to_ug_per_l(value, &unit)
        })
        .sum()
}

/// Intervention-value check of one well: which contaminants exceed their
/// groundwater intervention value.
pub fn intervention_exceedances(
    round: &LabRound,
    well: &str,
    group: ContaminantGroup,
) -> Vec<&'static str> {
    group
        .contaminants()
        .iter()
        .filter(|spec| {
            let value = round.value(spec.name, well).unwrap_or(0.0);
            let unit = round.unit(spec.name).unwrap_or_default();
            to_ug_per_l(value, &unit) > spec.intervention_ug_l
        })
        .map(|spec| spec.name)
        .collect()
}

/// Full screening table of one round: one row per well with the electron
/// totals, the balance verdict and the intervention check.
pub fn screen_round(
    round: &LabRound,
    acceptors: AcceptorGroup,
    contaminants: ContaminantGroup,
) -> Result<DataFrame, ScreeningError> {
    let wells = round.wells();
    let mut sum_reductors = Vec::with_capacity(wells.len());
    let mut sum_oxidators = Vec::with_capacity(wells.len());
    let mut balances = Vec::with_capacity(wells.len());
    let mut verdicts = Vec::with_capacity(wells.len());
    let mut totals = Vec::with_capacity(wells.len());
    let mut exceed_traffic = Vec::with_capacity(wells.len());
    let mut exceed_counts = Vec::with_capacity(wells.len());
    let mut exceed_names = Vec::with_capacity(wells.len());

    for well in &wells {
        let red = reductor_total(round, well, acceptors);
        let oxi = oxidator_total(round, well, contaminants);
        let balance = electron_balance(red, oxi);
        sum_reductors.push(red);
        sum_oxidators.push(oxi);
        balances.push(balance.unwrap_or(f64::NAN));
        verdicts.push(traffic_light(balance).as_str().to_string());
        totals.push(total_contaminants(round, well, contaminants));

        let exceeded = intervention_exceedances(round, well, contaminants);
        exceed_traffic.push(
            if exceeded.is_empty() {
                TrafficLight::Green
            } else {
                TrafficLight::Red
            }
            .as_str()
            .to_string(),
        );
        exceed_counts.push(exceeded.len() as i64);
        exceed_names.push(exceeded.join(", "));
    }

    let df = DataFrame::new(vec![
        Column::new("obs_well".into(), wells),
        Column::new("sum_reductors".into(), sum_reductors),
        Column::new("sum_oxidators".into(), sum_oxidators),
        Column::new("e_balance".into(), balances),
        Column::new("na_traffic_light".into(), verdicts),
        Column::new("total_contaminants".into(), totals),
        Column::new("intervention_traffic".into(), exceed_traffic),
        Column::new("intervention_number".into(), exceed_counts),
        Column::new("intervention_contaminants".into(), exceed_names),
    ])?;
    Ok(df)
}

/// Side-by-side electron balances and verdicts of several rounds, one row
/// per well. Wells missing from a round read as missing values.
pub fn compare_rounds(rounds: &[(String, DataFrame)]) -> Result<DataFrame, ScreeningError> {
    let wells: Vec<String> = rounds
        .first()
        .map(|(_, df)| column_strings(df, "obs_well"))
        .transpose()?
        .ok_or(ScreeningError::NoCommonWells)?;

    let mut columns = vec![Column::new("obs_well".into(), wells.clone())];
    for (label, df) in rounds {
        let round_wells = column_strings(df, "obs_well")?;
        let balances = df.column("e_balance")?.f64()?;
        let verdicts = df.column("na_traffic_light")?.str()?;

        let mut balance_col = Vec::with_capacity(wells.len());
        let mut verdict_col = Vec::with_capacity(wells.len());
        for well in &wells {
            match round_wells.iter().position(|w| w == well) {
                Some(idx) => {
                    balance_col.push(balances.get(idx).unwrap_or(f64::NAN));
                    verdict_col.push(verdicts.get(idx).unwrap_or("unknown").to_string());
                }
                None => {
                    balance_col.push(f64::NAN);
                    verdict_col.push("unknown".to_string());
                }
            }
        }
        columns.push(Column::new(format!("e_balance_{label}").into(), balance_col));
        columns.push(Column::new(format!("traffic_{label}").into(), verdict_col));
    }
    Ok(DataFrame::new(columns)?)
}

fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<String>, PolarsError> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}
