//! Cleans the raw lab exports of every sampling round and writes the
//! analyte-by-well tables plus the screening input extracts.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use wetland_screen::config::StudyConfig;
use wetland_screen::data::{extract_contaminants, write_dataframe_csv, LabRound};
use wetland_screen::screening::ContaminantGroup;

fn main() -> Result<()> {
    env_logger::init();
    let study_file = env::args().nth(1).map(PathBuf::from);
    let config = StudyConfig::load_or_default(study_file.as_deref())
        .context("loading study configuration")?;

    fs::create_dir_all(&config.results_dir)?;

    let contaminants: Vec<&str> = ContaminantGroup::BtexNaphthalene
        .contaminants()
        .iter()
        .map(|c| c.name)
        .collect();

    for round in &config.rounds {
        info!("cleaning round {} from {}", round.label, round.raw_file.display());
        let cleaned = LabRound::from_workbook(&round.raw_file)
            .with_context(|| format!("cleaning {}", round.raw_file.display()))?;

        if let Some(dir) = round.cleaned_file.parent() {
            fs::create_dir_all(dir)?;
        }
        cleaned
            .write_csv(&round.cleaned_file)
            .with_context(|| format!("writing {}", round.cleaned_file.display()))?;
        info!("wrote {}", round.cleaned_file.display());

        // Screening input: the contaminant extract with coded sample ids.
        let time_point = round.label.trim_start_matches('T');
        let extract = extract_contaminants(&cleaned, &contaminants, time_point, &[])
            .with_context(|| format!("extracting contaminants of {}", round.label))?;
        let out = config
            .results_dir
            .join(format!("contaminants_{}.csv", round.label));
        write_dataframe_csv(&extract, &out)?;
        info!("wrote {}", out.display());
    }

    Ok(())
}
