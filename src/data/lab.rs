//! Lab Export Cleanup Module
//! Turns the laboratory result workbook of one sampling round into an
//! analyte-by-well table ready for screening and plotting.
//!
//! The export carries analysis results on the `Analyseresultaten` sheet
//! (Dutch analyte names, a unit column, sample-number columns) and the
//! sample administration on `Watermonstergegevens`, which couples sample
//! numbers to well codes and holds the field oxygen readings.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use thiserror::Error;

use crate::config;
use crate::data::loader::{self, LoaderError, RawGrid};

#[derive(Error, Debug)]
pub enum LabError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export is missing the '{0}' row")]
    MissingRow(String),
    #[error("Key sheet is missing the '{0}' column")]
    MissingColumn(String),
    #[error("Cleaned table is missing well {0}")]
    MissingWell(String),
}

/// Dutch-to-English analyte dictionary of the lab export.
const TRANSLATIONS: &[(&str, &str)] = &[
    ("Projectcode", "Project code"),
    ("Projectnaam", "Project name"),
    ("Monsteromschrijving", "Sample description"),
    ("Rapport status", "Report status"),
    ("Validatie status", "Validation status"),
    ("Rapport Datum", "Report Date"),
    ("Start Datum", "Start Date"),
    ("Ijzer (2+)", "Iron II"),
    ("Mangaan (II)", "MN II"),
    ("cyanide (totaal)", "cyanid"),
    ("fosfor (totaal)", "phosphor"),
    ("benzeen", "benzene"),
    ("tolueen", "toluene"),
    ("ethylbenzeen", "ethylbenzene"),
    ("o-xyleen", "o-xylene"),
    ("p- en m-xyleen", "(m+p)-xylene"),
    ("xylenen (0.7 factor)", "sum xylenes (factor 0.7)"),
    ("totaal BTEX (0.7 factor)", "total BTEX (factor 0.7)"),
    ("naftaleen", "naphthalene"),
    ("fenol", "phenol"),
    ("acenaftyleen", "acenaphthylene"),
    ("acenafteen", "acenaphtene"),
    ("fluoreen", "fluorene"),
    ("fenantreen", "phenanthrene"),
    ("antraceen", "anthracene"),
    ("fluoranteen", "fluoranthene"),
    ("pyreen", "pyrene"),
    ("chryseen", "chrysene"),
    ("benzo(a)pyreen", "benzo(a)pyrene"),
    ("pak-totaal (16 van EPA)", "sum PAH (16 EPA)"),
    ("fractie C10-C12", "fraction C10-C12"),
    ("fractie C12-C22", "fraction C12-C22"),
    ("fractie C22-C30", "fraction C22-C30"),
    ("fractie C30-C40", "fraction C30-C40"),
    ("totaal olie C10 - C40", "total oil C10 - C40"),
    ("chloride", "chloride"),
    ("nitriet", "nitrite"),
    ("nitriet-N", "nitrite - N"),
    ("nitraat", "nitrate"),
    ("nitraat-N", "nitrate - N"),
    ("sulfaat", "sulphates"),
    ("Zuurstof", "Oxygen"),
];

/// Metadata rows that carry no measurements.
const DROP_ROWS: &[&str] = &[
    "Analysis",
    "Project code",
    "Project name",
    "Sample description",
    "Report status",
    "Validation status",
    "Report Date",
    "Start Date",
];

fn translate(analyte: &str) -> String {
    TRANSLATIONS
        .iter()
        .find(|(nl, _)| *nl == analyte)
        .map(|(_, en)| en.to_string())
        .unwrap_or_else(|| analyte.to_string())
}

/// Parse a lab value: detection-limit entries (`<0.1`) count as zero,
/// decimal commas are accepted, anything unparseable coerces to zero.
fn parse_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return 0.0;
    }
    trimmed.replace(',', ".").parse::<f64>().unwrap_or(0.0)
}

/// Cleaned analyte-by-well table of one sampling round.
///
/// Columns: `analyte` and `unit` (strings), then one numeric column per
/// well in the fixed study order.
#[derive(Debug, Clone)]
pub struct LabRound {
    df: DataFrame,
}

impl LabRound {
    /// Clean a raw lab workbook.
    pub fn from_workbook(path: &Path) -> Result<Self, LabError> {
        let results = loader::load_sheet(path, "Analyseresultaten")?;
        let key = loader::load_sheet(path, "Watermonstergegevens")?;
        Self::from_grids(&results, &key)
    }

    /// Clean the raw sheets of one round. `results` is the analysis sheet,
    /// `key` the sample-administration sheet.
    pub fn from_grids(results: &RawGrid, key: &RawGrid) -> Result<Self, LabError> {
        // The description row holds the sample identifiers that the key
        // sheet couples to well codes; its first data cell is the unit
        // column marker.
        let desc_idx = results
            .iter()
            .position(|row| row.first().map(String::as_str) == Some("Monsteromschrijving"))
            .ok_or_else(|| LabError::MissingRow("Monsteromschrijving".to_string()))?;
        let desc_row = &results[desc_idx];
        let n_cols = desc_row.len();

        let (sample_to_well, oxygen_by_well) = read_key_sheet(key)?;

        // Column ids: position 1 is the unit column, 2.. are samples renamed
        // to well codes where the key sheet knows them.
        let mut well_ids: Vec<String> = Vec::new();
        for cell in desc_row.iter().take(n_cols).skip(2) {
            let id = cell.trim().to_string();
            well_ids.push(sample_to_well.get(&id).cloned().unwrap_or(id));
        }

        let mut analytes: Vec<String> = Vec::new();
        let mut units: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();

        // Rows 0 and 1 are export preamble and the sample-number header.
        for (idx, row) in results.iter().enumerate().skip(2) {
            if idx == desc_idx {
                continue;
            }
            let name = translate(row.first().map(String::as_str).unwrap_or("").trim());
            if name.is_empty() || DROP_ROWS.contains(&name.as_str()) {
                continue;
            }
            let empty = (2..n_cols).all(|c| row.get(c).map(String::as_str).unwrap_or("").trim().is_empty());
            if empty {
                continue;
            }
            let unit = row.get(1).map(String::as_str).unwrap_or("").trim().to_string();
            let row_values: Vec<f64> = (2..n_cols)
                .map(|c| parse_value(row.get(c).map(String::as_str).unwrap_or("")))
                .collect();
            analytes.push(name);
            units.push(unit);
            values.push(row_values);
        }

        // Field oxygen lives on the key sheet and joins as an extra analyte.
        analytes.push("Oxygen".to_string());
        units.push("mg/l".to_string());
        values.push(
            well_ids
                .iter()
                .map(|well| oxygen_by_well.get(well).copied().unwrap_or(0.0))
                .collect(),
        );

        // Reorder into the fixed influent-to-effluent well order.
        let order = config::well_order();
        let mut columns = vec![
            Column::new("analyte".into(), analytes),
            Column::new("unit".into(), units),
        ];
        for well in &order {
            let pos = well_ids
                .iter()
                .position(|id| id == well)
                .ok_or_else(|| LabError::MissingWell(well.clone()))?;
            let series: Vec<f64> = values.iter().map(|row| row[pos]).collect();
            columns.push(Column::new(well.as_str().into(), series));
        }

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Wrap a table that is already in cleaned shape (`analyte`/`unit`
    /// string columns plus numeric well columns).
    pub fn from_dataframe(df: DataFrame) -> Self {
        Self { df }
    }

    /// Reload a cleaned table written by [`LabRound::write_csv`].
    pub fn from_csv(path: &Path) -> Result<Self, LabError> {
        let df = LazyCsvReader::new(path.to_string_lossy().as_ref())
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        // Whole-number wells may infer as integers; analysis wants floats.
        let mut columns: Vec<Column> = Vec::new();
        for col in df.get_columns() {
            if col.name() == "analyte" || col.name() == "unit" {
                columns.push(col.clone());
            } else {
                columns.push(col.cast(&DataType::Float64)?);
            }
        }
        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), LabError> {
        let mut df = self.df.clone();
        let file = File::create(path)?;
        CsvWriter::new(file).include_header(true).finish(&mut df)?;
        Ok(())
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Well columns, in table order.
    pub fn wells(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .filter(|name| name.as_str() != "analyte" && name.as_str() != "unit")
            .map(|name| name.to_string())
            .collect()
    }

    pub fn analytes(&self) -> Vec<String> {
        self.df
            .column("analyte")
            .ok()
            .and_then(|col| col.str().ok().map(|ca| ca.into_iter().flatten().map(String::from).collect()))
            .unwrap_or_default()
    }

    fn analyte_index(&self, analyte: &str) -> Option<usize> {
        let col = self.df.column("analyte").ok()?;
        let ca = col.str().ok()?;
        ca.into_iter().position(|v| v == Some(analyte))
    }

    pub fn unit(&self, analyte: &str) -> Option<String> {
        let idx = self.analyte_index(analyte)?;
        let ca = self.df.column("unit").ok()?.str().ok()?.clone();
        ca.get(idx).map(String::from)
    }

    pub fn value(&self, analyte: &str, well: &str) -> Option<f64> {
        let idx = self.analyte_index(analyte)?;
        self.df.column(well).ok()?.f64().ok()?.get(idx)
    }

    /// Values of one analyte across a well sequence; missing wells read as
    /// missing values.
    pub fn series(&self, analyte: &str, wells: &[String]) -> Vec<f64> {
        wells
            .iter()
            .map(|well| self.value(analyte, well).unwrap_or(f64::NAN))
            .collect()
    }
}

fn read_key_sheet(
    key: &RawGrid,
) -> Result<(HashMap<String, String>, HashMap<String, f64>), LabError> {
    let header = key
        .first()
        .ok_or_else(|| LabError::MissingColumn("Monsternummer".to_string()))?;
    let col_of = |name: &str| -> Result<usize, LabError> {
        header
            .iter()
            .position(|cell| cell.trim() == name)
            .ok_or_else(|| LabError::MissingColumn(name.to_string()))
    };
    let sample_col = col_of("Monsternummer")?;
    let well_col = col_of("Meetpunt")?;
    let oxygen_col = col_of("Zuurstof")?;

    let mut sample_to_well = HashMap::new();
    let mut oxygen_by_well = HashMap::new();
    for row in key.iter().skip(1) {
        let sample = row.get(sample_col).map(String::as_str).unwrap_or("").trim();
        let well = row.get(well_col).map(String::as_str).unwrap_or("").trim();
        if sample.is_empty() || well.is_empty() {
            continue;
        }
        sample_to_well.insert(sample.to_string(), well.to_string());
        let oxygen = parse_value(row.get(oxygen_col).map(String::as_str).unwrap_or(""));
        oxygen_by_well.insert(well.to_string(), oxygen);
    }
    Ok((sample_to_well, oxygen_by_well))
}

/// Build the NA-screening input table: a per-well view of the selected
/// contaminants with a generated sample coding and the unit row on top.
///
/// Codes follow the study convention `NL_CW_W_{round}{nn}`; the baseline
/// round `"0"` drops its round digit. Values listed in `round_to_int` are
/// rounded to whole numbers like the preprocessed exports were.
pub fn extract_contaminants(
    round: &LabRound,
    contaminants: &[&str],
    time_point: &str,
    round_to_int: &[&str],
) -> Result<DataFrame, LabError> {
    let selected: Vec<String> = round
        .analytes()
        .into_iter()
        .filter(|name| contaminants.iter().any(|c| name == c))
        .collect();

    let wells = round.wells();
    let tp = time_point.trim();

    let mut coding = vec!["unit".to_string()];
    let mut well_names = vec!["-".to_string()];
    for (i, well) in wells.iter().enumerate() {
        let counter = i + 1;
        if tp == "0" {
            coding.push(format!("NL_CW_W_{counter:02}"));
        } else {
            coding.push(format!("NL_CW_W_{tp}{counter:02}"));
        }
        well_names.push(well.clone());
    }

    let mut columns = vec![
        Column::new("Coding".into(), coding),
        Column::new("Well name".into(), well_names),
    ];
    for analyte in &selected {
        let mut cells = vec![round.unit(analyte).unwrap_or_default()];
        let as_int = round_to_int.iter().any(|c| analyte == c);
        for well in &wells {
            let value = round.value(analyte, well).unwrap_or(0.0);
            if as_int {
                cells.push(format!("{}", value.round() as i64));
            } else {
                cells.push(format!("{value}"));
            }
        }
        columns.push(Column::new(analyte.as_str().into(), cells));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write any table to CSV (results, screening inputs, comparisons).
pub fn write_dataframe_csv(df: &DataFrame, path: &Path) -> Result<(), LabError> {
    let mut df = df.clone();
    let file = File::create(path)?;
    CsvWriter::new(file).include_header(true).finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_sheets() -> (RawGrid, RawGrid) {
        let mut results_rows: Vec<Vec<String>> = grid(&[
            &["", "", "", ""],
            &["Analysis", "", "M001", "M002"],
            &["Monsteromschrijving", "-", "M001", "M002"],
            &["Projectcode", "", "P1", "P1"],
            &["benzeen", "µg/l", "120", "<0,5"],
            &["tolueen", "µg/l", "85,5", "12"],
            &["chloride", "mg/l", "240", "230"],
            &["leeg", "µg/l", "", ""],
        ]);
        // Key sheet couples both samples and provides field oxygen.
        let mut key_rows = vec![vec![
            "Monsternummer".to_string(),
            "Meetpunt".to_string(),
            "Zuurstof".to_string(),
        ]];
        key_rows.push(vec!["M001".to_string(), "INF".to_string(), "0,8".to_string()]);
        let mut wells: Vec<String> = crate::config::well_order();
        wells.retain(|w| w != "INF");
        // Map the second sample to CW1MF01 and pad every remaining well so
        // the fixed column order can be satisfied.
        key_rows.push(vec!["M002".to_string(), wells[0].clone(), "1,2".to_string()]);
        for (i, well) in wells.iter().enumerate().skip(1) {
            let sample = format!("M9{i:02}");
            key_rows.push(vec![sample.clone(), well.clone(), "0".to_string()]);
            for row in results_rows.iter_mut().skip(1) {
                if row[0] == "Monsteromschrijving" || row[0] == "Analysis" {
                    row.push(sample.clone());
                } else if row[0] == "leeg" {
                    row.push(String::new());
                } else if !row[0].is_empty() {
                    row.push("1".to_string());
                }
            }
        }
        (results_rows, key_rows)
    }

    #[test]
    fn cleans_translates_and_orders_the_export() {
        let (results, key) = sample_sheets();
        let round = LabRound::from_grids(&results, &key).unwrap();

        let analytes = round.analytes();
        assert!(analytes.contains(&"benzene".to_string()));
        assert!(analytes.contains(&"toluene".to_string()));
        assert!(analytes.contains(&"Oxygen".to_string()));
        // Metadata and all-empty rows are gone.
        assert!(!analytes.contains(&"Project code".to_string()));
        assert!(!analytes.contains(&"leeg".to_string()));

        // Fixed well order, starting at the influent.
        assert_eq!(round.wells()[0], "INF");
        assert_eq!(round.wells().len(), crate::config::well_order().len());
    }

    #[test]
    fn detection_limits_and_decimal_commas_are_coerced() {
        let (results, key) = sample_sheets();
        let round = LabRound::from_grids(&results, &key).unwrap();

        assert_eq!(round.value("benzene", "INF"), Some(120.0));
        assert_eq!(round.value("benzene", "CW1MF01"), Some(0.0)); // below detection limit
        assert_eq!(round.value("toluene", "INF"), Some(85.5));
        assert_eq!(round.unit("chloride").as_deref(), Some("mg/l"));
    }

    #[test]
    fn oxygen_merges_from_the_key_sheet() {
        let (results, key) = sample_sheets();
        let round = LabRound::from_grids(&results, &key).unwrap();

        assert_eq!(round.unit("Oxygen").as_deref(), Some("mg/l"));
        assert_eq!(round.value("Oxygen", "INF"), Some(0.8));
        assert_eq!(round.value("Oxygen", "CW1MF01"), Some(1.2));
    }

    #[test]
    fn screening_input_codes_wells_per_round() {
        let (results, key) = sample_sheets();
        let round = LabRound::from_grids(&results, &key).unwrap();

        let df = extract_contaminants(&round, &["benzene", "toluene"], "2", &["benzene"]).unwrap();
        let coding = df.column("Coding").unwrap().str().unwrap().clone();
        assert_eq!(coding.get(0), Some("unit"));
        assert_eq!(coding.get(1), Some("NL_CW_W_201"));
        assert_eq!(coding.get(2), Some("NL_CW_W_202"));

        let benzene = df.column("benzene").unwrap().str().unwrap().clone();
        assert_eq!(benzene.get(0), Some("µg/l"));
        assert_eq!(benzene.get(1), Some("120"));

        let df0 = extract_contaminants(&round, &["benzene"], "0", &[]).unwrap();
        let coding0 = df0.column("Coding").unwrap().str().unwrap().clone();
        assert_eq!(coding0.get(1), Some("NL_CW_W_01"));
    }
}
