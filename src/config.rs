//! Study configuration: file locations, site parameters, compound properties
//! and the sampling layout of the three wetland cells.
//!
//! The defaults describe the pilot as monitored; a JSON file with the same
//! shape can be passed to the binaries to process another dataset of the
//! same layout.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::ade::AdeParameters;
use crate::transport::site::{CompoundProperties, SiteParameters};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read study file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse study file: {0}")]
    Json(#[from] serde_json::Error),
}

/// One sampling round: the raw lab export, where its cleaned table lives and
/// when the samples were taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    pub label: String,
    pub raw_file: PathBuf,
    pub cleaned_file: PathBuf,
    pub date: NaiveDate,
}

/// A named contaminant with its transport-relevant properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundConfig {
    pub name: String,
    pub log_kow: f64,
    pub decay_rate: f64,
    pub molecular_weight: f64,
}

impl CompoundConfig {
    pub fn properties(&self) -> CompoundProperties {
        CompoundProperties {
            log_kow: self.log_kow,
            decay_rate: self.decay_rate,
            molecular_weight: self.molecular_weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    pub rounds: Vec<RoundConfig>,
    /// Datalogger export with the redox/temperature sensor data.
    pub logger_file: PathBuf,
    /// Correction towards the 3M KCl reference electrode, in mV.
    pub electrode_correction_mv: f64,
    pub site: SiteParameters,
    pub ade: AdeParameters,
    pub compounds: Vec<CompoundConfig>,
    pub results_dir: PathBuf,
    pub figures_dir: PathBuf,
}

impl Default for StudyConfig {
    fn default() -> Self {
        let rounds = [
            ("T0", "2024-08-14"),
            ("T1", "2024-10-23"),
            ("T2", "2025-01-07"),
            ("T3", "2025-02-18"),
        ]
        .iter()
        .map(|(label, date)| RoundConfig {
            label: label.to_string(),
            raw_file: PathBuf::from(format!("data/raw/resultaten_ronde_{label}.xlsx")),
            cleaned_file: PathBuf::from(format!("data/cleaned/cw_{label}_cleaned.csv")),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid default date"),
        })
        .collect();

        Self {
            rounds,
            logger_file: PathBuf::from("data/redox/cr1000x_measurements.dat"),
            electrode_correction_mv: 200.0,
            site: SiteParameters {
                bulk_density: 1.43,
                porosity: 0.4,
                flow_rate: 1.0,
                bulk_volume: 4.0,
                foc: 0.004,
            },
            ade: AdeParameters {
                dispersivity: 0.4,
                velocity: 0.2,
                distance: 4.0,
            },
            compounds: default_compounds(),
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("results/figures"),
        }
    }
}

impl StudyConfig {
    /// Load a study file, or fall back to the built-in pilot description.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let text = fs::read_to_string(p)?;
                Ok(serde_json::from_str(&text)?)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn compound_properties(&self) -> Vec<(String, CompoundProperties)> {
        self.compounds
            .iter()
            .map(|c| (c.name.clone(), c.properties()))
            .collect()
    }

    pub fn compound_names(&self) -> Vec<String> {
        self.compounds.iter().map(|c| c.name.clone()).collect()
    }
}

fn default_compounds() -> Vec<CompoundConfig> {
    [
        ("benzene", 2.13, 0.05, 78.11),
        ("toluene", 2.73, 0.03, 92.14),
        ("ethylbenzene", 3.15, 0.02, 106.17),
        ("o-xylene", 3.12, 0.02, 106.17),
        ("(m+p)-xylene", 3.18, 0.02, 106.17),
        ("naphthalene", 3.30, 0.01, 128.17),
        ("acenaphthylene", 3.94, 0.005, 152.17),
        ("acenaphtene", 3.92, 0.005, 154.20),
        ("fluorene", 4.18, 0.003, 166.22),
        ("phenanthrene", 4.46, 0.002, 178.23),
        ("anthracene", 4.45, 0.001, 178.23),
    ]
    .iter()
    .map(|&(name, log_kow, decay_rate, molecular_weight)| CompoundConfig {
        name: name.to_string(),
        log_kow,
        decay_rate,
        molecular_weight,
    })
    .collect()
}

/// The three wetland cells.
pub const WETLANDS: [u8; 3] = [1, 2, 3];

/// Fixed well order of the cleaned lab table: influent, then each wetland's
/// monitoring filters and effluent.
pub fn well_order() -> Vec<String> {
    let mut order = vec!["INF".to_string()];
    for w in WETLANDS {
        for mf in ["01", "02", "05", "06", "09", "10"] {
            order.push(format!("CW{w}MF{mf}"));
        }
        order.push(format!("CW{w}_EFF"));
    }
    order
}

/// Monitoring depth of a well or sensor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Shallow,
    Deep,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Shallow => "shallow",
            Depth::Deep => "deep",
        }
    }
}

/// Flow-path well sequence of one wetland at one depth, influent to effluent.
pub fn well_sequence(wetland: u8, depth: Depth) -> Vec<String> {
    let filters = match depth {
        Depth::Shallow => ["01", "05", "09"],
        Depth::Deep => ["02", "06", "10"],
    };
    let mut wells = vec!["INF".to_string()];
    for mf in filters {
        wells.push(format!("CW{wetland}MF{mf}"));
    }
    wells.push(format!("CW{wetland}_EFF"));
    wells
}

/// Rename map from logger channel names to sensor node codes.
///
/// Redox channels 1..=48 are laid out wetland-major (16 per wetland, four
/// stations of four depths each), temperature channels 1..=12 one per
/// station. `CW2S3-4` reads: wetland 2, station 3, depth level 4 (80 cm).
pub fn logger_rename_map() -> HashMap<String, String> {
    let mut map = HashMap::new();
    for ch in 1u32..=48 {
        let idx = ch - 1;
        let wetland = idx / 16 + 1;
        let station = (idx % 16) / 4 + 1;
        let level = idx % 4 + 1;
        map.insert(
            format!("redox_raw_Avg({ch})"),
            format!("CW{wetland}S{station}-{level}"),
        );
    }
    for ch in 1u32..=12 {
        let idx = ch - 1;
        let wetland = idx / 4 + 1;
        let station = idx % 4 + 1;
        map.insert(format!("temp_C_Avg({ch})"), format!("CW{wetland}S{station}"));
    }
    map
}

/// Redox nodes of one wetland at one depth (20, 40, 60 or 80 cm).
pub fn redox_node_group(wetland: u8, depth_cm: u16) -> Vec<String> {
    let level = match depth_cm {
        20 => 1,
        40 => 2,
        60 => 3,
        _ => 4,
    };
    (1..=4)
        .map(|station| format!("CW{wetland}S{station}-{level}"))
        .collect()
}

/// Temperature nodes of one wetland.
pub fn temperature_node_group(wetland: u8) -> Vec<String> {
    (1..=4).map(|station| format!("CW{wetland}S{station}")).collect()
}

/// Contaminants drawn as flow-path profiles and time series (ug/L analytes).
pub fn profile_contaminants() -> &'static [&'static str] {
    &[
        "benzene",
        "toluene",
        "ethylbenzene",
        "o-xylene",
        "(m+p)-xylene",
        "naphthalene",
    ]
}

/// Electron acceptors and the chloride tracer drawn as flow-path profiles
/// (mg/L analytes, plotted without the microgram rescaling).
pub fn profile_acceptors() -> &'static [&'static str] {
    &["Oxygen", "nitrate", "sulphates", "chloride"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_four_rounds_in_order() {
        let config = StudyConfig::default();
        let labels: Vec<_> = config.rounds.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["T0", "T1", "T2", "T3"]);
    }

    #[test]
    fn well_order_covers_all_cells() {
        let order = well_order();
        assert_eq!(order.len(), 1 + 3 * 7);
        assert_eq!(order[0], "INF");
        assert_eq!(order[7], "CW1_EFF");
        assert!(order.contains(&"CW3MF10".to_string()));
    }

    #[test]
    fn well_sequence_runs_influent_to_effluent() {
        assert_eq!(
            well_sequence(2, Depth::Deep),
            ["INF", "CW2MF02", "CW2MF06", "CW2MF10", "CW2_EFF"]
        );
        assert_eq!(
            well_sequence(1, Depth::Shallow),
            ["INF", "CW1MF01", "CW1MF05", "CW1MF09", "CW1_EFF"]
        );
    }

    #[test]
    fn logger_rename_maps_channel_blocks() {
        let map = logger_rename_map();
        assert_eq!(map["redox_raw_Avg(1)"], "CW1S1-1");
        assert_eq!(map["redox_raw_Avg(16)"], "CW1S4-4");
        assert_eq!(map["redox_raw_Avg(17)"], "CW2S1-1");
        assert_eq!(map["redox_raw_Avg(48)"], "CW3S4-4");
        assert_eq!(map["temp_C_Avg(5)"], "CW2S1");
    }

    #[test]
    fn redox_node_group_selects_depth_level() {
        assert_eq!(
            redox_node_group(3, 80),
            ["CW3S1-4", "CW3S2-4", "CW3S3-4", "CW3S4-4"]
        );
        assert_eq!(redox_node_group(1, 20)[0], "CW1S1-1");
    }

    #[test]
    fn profile_groups_cover_btex_and_acceptors() {
        let contaminants = profile_contaminants();
        for name in ["benzene", "toluene", "ethylbenzene", "o-xylene", "(m+p)-xylene"] {
            assert!(contaminants.contains(&name));
        }
        let acceptors = profile_acceptors();
        for name in ["Oxygen", "nitrate", "sulphates", "chloride"] {
            assert!(acceptors.contains(&name));
        }
        assert!(!acceptors.iter().any(|a| contaminants.contains(a)));
    }

    #[test]
    fn study_file_round_trips_through_json() {
        let config = StudyConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: StudyConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.rounds.len(), config.rounds.len());
        assert_eq!(back.site.porosity, config.site.porosity);
    }
}
