//! Natural-attenuation screening of every cleaned sampling round: per-round
//! screening tables, the cross-round comparison, traffic-light figures and
//! concentration profiles along the flow paths.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use polars::prelude::DataFrame;
use rayon::prelude::*;

use wetland_screen::charts::{
    compound_time_series, concentration_profile, skip_if_empty, traffic_bars, traffic_bars_3d,
    ProfileOptions,
};
use wetland_screen::config::{self, Depth, StudyConfig};
use wetland_screen::data::{write_dataframe_csv, LabRound};
use wetland_screen::screening::{compare_rounds, screen_round, AcceptorGroup, ContaminantGroup};

fn main() -> Result<()> {
    env_logger::init();
    let study_file = env::args().nth(1).map(PathBuf::from);
    let config = StudyConfig::load_or_default(study_file.as_deref())
        .context("loading study configuration")?;

    fs::create_dir_all(&config.results_dir)?;
    fs::create_dir_all(&config.figures_dir)?;

    let mut rounds: Vec<(String, LabRound)> = Vec::new();
    for round in &config.rounds {
        let table = LabRound::from_csv(&round.cleaned_file)
            .with_context(|| format!("reading {}", round.cleaned_file.display()))?;
        rounds.push((round.label.clone(), table));
    }

    let mut screened: Vec<(String, DataFrame)> = Vec::new();
    for (label, table) in &rounds {
        let df = screen_round(table, AcceptorGroup::Ons, ContaminantGroup::BtexNaphthalene)
            .with_context(|| format!("screening round {label}"))?;
        let out = config.results_dir.join(format!("screening_{label}.csv"));
        write_dataframe_csv(&df, &out)?;
        info!("wrote {}", out.display());
        screened.push((label.clone(), df));
    }

    let comparison = compare_rounds(&screened).context("comparing rounds")?;
    let out = config.results_dir.join("screening_comparison.csv");
    write_dataframe_csv(&comparison, &out)?;
    info!("wrote {}", out.display());

    // One 2D figure per wetland and depth, one 3D overview across all wells.
    for wetland in config::WETLANDS {
        for depth in [Depth::Shallow, Depth::Deep] {
            let wells = config::well_sequence(wetland, depth);
            let out = config
                .figures_dir
                .join(format!("traffic_cw{wetland}_{}.png", depth.as_str()));
            skip_if_empty(traffic_bars(&screened, &wells, &out))
                .with_context(|| format!("traffic figure of wetland {wetland}"))?;
        }
    }
    skip_if_empty(traffic_bars_3d(
        &screened,
        &config::well_order(),
        &config.figures_dir.join("traffic_lights_3d.png"),
    ))
    .context("3D traffic figure")?;
    info!("wrote traffic-light figures");

    // Profile figures per wetland, depth and analyte, in parallel. BTEX and
    // naphthalene report in ug/L; the electron acceptors and the chloride
    // tracer are mg/L analytes and are drawn normalized to the influent.
    let round_refs: Vec<(&str, &LabRound)> = rounds
        .iter()
        .map(|(label, table)| (label.as_str(), table))
        .collect();
    let contaminant_opts = ProfileOptions {
        dilution_compensation: true,
        milligram_axis: true,
        ..Default::default()
    };
    let acceptor_opts = ProfileOptions {
        normalize: true,
        dilution_compensation: true,
        milligram_axis: false,
    };

    let mut jobs: Vec<(u8, Depth, &str, &ProfileOptions)> = Vec::new();
    for wetland in config::WETLANDS {
        for depth in [Depth::Shallow, Depth::Deep] {
            for &analyte in config::profile_contaminants() {
                jobs.push((wetland, depth, analyte, &contaminant_opts));
            }
            for &analyte in config::profile_acceptors() {
                jobs.push((wetland, depth, analyte, &acceptor_opts));
            }
        }
    }
    jobs.par_iter().try_for_each(|&(wetland, depth, analyte, opts)| {
        let out = config.figures_dir.join(format!(
            "profile_{analyte}_cw{wetland}_{}.png",
            depth.as_str()
        ));
        skip_if_empty(concentration_profile(
            &round_refs,
            analyte,
            wetland,
            depth,
            opts,
            &out,
        ))
        .with_context(|| format!("profile of {analyte} in wetland {wetland}"))
        .map(|_| ())
    })?;
    info!("wrote {} profile figures", jobs.len());

    // One concentration-versus-time figure per contaminant, influent against
    // the three effluents.
    let dated_refs: Vec<(&str, NaiveDate, &LabRound)> = config
        .rounds
        .iter()
        .zip(&rounds)
        .map(|(cfg, (label, table))| (label.as_str(), cfg.date, table))
        .collect();
    let series_wells: Vec<String> = std::iter::once("INF".to_string())
        .chain(config::WETLANDS.iter().map(|w| format!("CW{w}_EFF")))
        .collect();
    for &analyte in config::profile_contaminants() {
        let out = config.figures_dir.join(format!("timeseries_{analyte}.png"));
        skip_if_empty(compound_time_series(
            &dated_refs,
            analyte,
            &series_wells,
            false,
            &out,
        ))
        .with_context(|| format!("time series of {analyte}"))?;
    }
    info!("wrote concentration time series");

    Ok(())
}
