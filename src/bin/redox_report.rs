//! Cleans the datalogger export and renders the redox and temperature
//! time-series figures.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use wetland_screen::charts::{
    redox_time_series, skip_if_empty, temperature_time_series, TimeSeriesOptions,
};
use wetland_screen::config::{self, StudyConfig};
use wetland_screen::data::clean_logger_export;

fn main() -> Result<()> {
    env_logger::init();
    let study_file = env::args().nth(1).map(PathBuf::from);
    let config = StudyConfig::load_or_default(study_file.as_deref())
        .context("loading study configuration")?;

    fs::create_dir_all(&config.figures_dir)?;

    info!("cleaning logger export {}", config.logger_file.display());
    let data = clean_logger_export(
        &config.logger_file,
        config.electrode_correction_mv,
        &config::logger_rename_map(),
    )
    .context("cleaning logger export")?;
    info!(
        "logger data covers {} hourly timestamps",
        data.redox.times().len()
    );

    let opts = TimeSeriesOptions::default();
    config::WETLANDS.par_iter().try_for_each(|&wetland| {
        let out = config.figures_dir.join(format!("redox_cw{wetland}.png"));
        skip_if_empty(redox_time_series(&data.redox, wetland, &opts, &out))
            .with_context(|| format!("redox figure of wetland {wetland}"))
            .map(|_| ())
    })?;
    info!("wrote redox figures");

    skip_if_empty(temperature_time_series(
        &data.temperature,
        &opts,
        &config.figures_dir.join("temperature.png"),
    ))
    .context("temperature figure")?;
    info!("wrote temperature figure");

    Ok(())
}
