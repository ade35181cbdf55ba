//! Assembles the breakthrough table from the cleaned rounds and renders the
//! breakthrough-curve figures against the advection-dispersion model.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use wetland_screen::charts::{breakthrough_overlay, breakthrough_panels, skip_if_empty};
use wetland_screen::config::{self, StudyConfig};
use wetland_screen::data::{write_dataframe_csv, LabRound};
use wetland_screen::transport::BtcBuilder;

fn main() -> Result<()> {
    env_logger::init();
    let study_file = env::args().nth(1).map(PathBuf::from);
    let config = StudyConfig::load_or_default(study_file.as_deref())
        .context("loading study configuration")?;

    fs::create_dir_all(&config.results_dir)?;
    fs::create_dir_all(&config.figures_dir)?;

    let mut tables: Vec<(String, NaiveDate, LabRound)> = Vec::new();
    for round in &config.rounds {
        let table = LabRound::from_csv(&round.cleaned_file)
            .with_context(|| format!("reading {}", round.cleaned_file.display()))?;
        tables.push((round.label.clone(), round.date, table));
    }
    let round_refs: Vec<(&str, NaiveDate, &LabRound)> = tables
        .iter()
        .map(|(label, date, table)| (label.as_str(), *date, table))
        .collect();

    let effluents: Vec<String> = config::WETLANDS
        .iter()
        .map(|w| format!("CW{w}_EFF"))
        .collect();

    let compounds = config.compound_properties();
    let builder = BtcBuilder::new(&config.site, &config.ade, &compounds);
    let table = builder
        .build(&round_refs, &effluents)
        .context("assembling breakthrough table")?;

    let out = config.results_dir.join("breakthrough.csv");
    write_dataframe_csv(&table, &out)?;
    info!("wrote {}", out.display());

    for (name, _) in &compounds {
        let out = config
            .figures_dir
            .join(format!("btc_{}.png", name.replace(['(', ')', '+'], "")));
        skip_if_empty(breakthrough_panels(&table, &config.ade, name, &effluents, &out))
            .with_context(|| format!("breakthrough panels of {name}"))?;
    }
    info!("wrote breakthrough panels for {} compounds", compounds.len());

    let names = config.compound_names();
    for well in &effluents {
        let out = config.figures_dir.join(format!("btc_overlay_{well}.png"));
        skip_if_empty(breakthrough_overlay(&table, &config.ade, well, &names, &out))
            .with_context(|| format!("breakthrough overlay at {well}"))?;
    }
    info!("wrote breakthrough overlays");

    Ok(())
}
