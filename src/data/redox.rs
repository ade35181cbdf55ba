//! Datalogger Cleanup Module
//! Turns the CR1000X export into hourly redox and temperature tables with
//! sensor-node column names and the reference-electrode correction applied.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::data::loader::{self, LoaderError, RawGrid};

#[derive(Error, Debug)]
pub enum RedoxError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Logger export has no TIMESTAMP header row")]
    MissingHeader,
    #[error("Logger export has no RECORD column")]
    MissingRecordColumn,
    #[error("Logger export holds no data rows")]
    Empty,
    #[error("Unparseable timestamp: {0}")]
    BadTimestamp(String),
}

/// A time-indexed sensor table: one row per timestamp, one column per node.
#[derive(Debug, Clone)]
pub struct TimeTable {
    times: Vec<NaiveDateTime>,
    nodes: Vec<String>,
    /// Column-major values, `values[node][time]`; gaps are NaN.
    values: Vec<Vec<f64>>,
}

impl TimeTable {
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn column(&self, node: &str) -> Option<&[f64]> {
        let idx = self.nodes.iter().position(|n| n == node)?;
        Some(&self.values[idx])
    }

    /// Restrict to timestamps within `[start, end]`.
    pub fn window(&self, start: NaiveDateTime, end: NaiveDateTime) -> TimeTable {
        let keep: Vec<usize> = self
            .times
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= start && **t <= end)
            .map(|(i, _)| i)
            .collect();
        TimeTable {
            times: keep.iter().map(|&i| self.times[i]).collect(),
            nodes: self.nodes.clone(),
            values: self
                .values
                .iter()
                .map(|col| keep.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }

    /// Per-timestamp mean over a node group, skipping gaps. A timestamp with
    /// no valid reading in the group stays NaN.
    pub fn mean_across(&self, nodes: &[String]) -> Vec<f64> {
        let cols: Vec<&[f64]> = nodes.iter().filter_map(|n| self.column(n)).collect();
        (0..self.times.len())
            .map(|t| {
                let mut sum = 0.0;
                let mut count = 0usize;
                for col in &cols {
                    let v = col[t];
                    if !v.is_nan() {
                        sum += v;
                        count += 1;
                    }
                }
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect()
    }

}

/// Cleaned logger data, split by measurement kind.
#[derive(Debug, Clone)]
pub struct RedoxData {
    /// Redox potentials in mV vs SHE, nodes like `CW1S2-3`.
    pub redox: TimeTable,
    /// Water temperatures in degrees C, nodes like `CW1S2`.
    pub temperature: TimeTable,
}

/// Clean a CR1000X export file. `correction_mv` is added to every redox
/// reading to convert the 3M-KCl electrode potentials to SHE.
pub fn clean_logger_export(
    path: &Path,
    correction_mv: f64,
    rename: &HashMap<String, String>,
) -> Result<RedoxData, RedoxError> {
    let grid = loader::load_delimited(path)?;
    clean_logger_grid(&grid, correction_mv, rename)
}

/// Grid-level cleanup, shared with the tests.
pub fn clean_logger_grid(
    grid: &RawGrid,
    correction_mv: f64,
    rename: &HashMap<String, String>,
) -> Result<RedoxData, RedoxError> {
    // The vendor preamble varies in length; the column header is the row
    // whose first cell is TIMESTAMP.
    let header_idx = grid
        .iter()
        .position(|row| row.first().map(String::as_str) == Some("TIMESTAMP"))
        .ok_or(RedoxError::MissingHeader)?;
    let header = &grid[header_idx];
    let record_col = header
        .iter()
        .position(|cell| cell == "RECORD")
        .ok_or(RedoxError::MissingRecordColumn)?;

    // Rows between the header and the first RECORD=0 row are unit and
    // aggregation descriptors.
    let start_idx = grid
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .find(|(_, row)| row.get(record_col).map(String::as_str) == Some("0"))
        .map(|(i, _)| i)
        .ok_or(RedoxError::Empty)?;

    let mut redox_cols: Vec<(usize, String)> = Vec::new();
    let mut temp_cols: Vec<(usize, String)> = Vec::new();
    for (idx, name) in header.iter().enumerate() {
        let renamed = rename.get(name).cloned().unwrap_or_else(|| name.clone());
        if name.starts_with("redox") {
            redox_cols.push((idx, renamed));
        } else if name.starts_with("temp") {
            temp_cols.push((idx, renamed));
        }
        // TIMESTAMP becomes the index; RECORD and battery voltage are dropped.
    }

    let mut times: Vec<NaiveDateTime> = Vec::new();
    let mut redox_rows: Vec<Vec<f64>> = Vec::new();
    let mut temp_rows: Vec<Vec<f64>> = Vec::new();
    for row in grid.iter().skip(start_idx) {
        let stamp = row.first().map(String::as_str).unwrap_or("").trim().to_string();
        if stamp.is_empty() {
            continue;
        }
        let time = parse_timestamp(&stamp)?;
        times.push(time);
        redox_rows.push(
            redox_cols
                .iter()
                .map(|&(c, _)| parse_reading(row.get(c)) + correction_mv)
                .collect(),
        );
        temp_rows.push(temp_cols.iter().map(|&(c, _)| parse_reading(row.get(c))).collect());
    }
    if times.is_empty() {
        return Err(RedoxError::Empty);
    }

    let redox = reindex_hourly(
        &times,
        redox_cols.into_iter().map(|(_, n)| n).collect(),
        &redox_rows,
    );
    let temperature = reindex_hourly(
        &times,
        temp_cols.into_iter().map(|(_, n)| n).collect(),
        &temp_rows,
    );
    Ok(RedoxData { redox, temperature })
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, RedoxError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .map_err(|_| RedoxError::BadTimestamp(raw.to_string()))
}

fn parse_reading(cell: Option<&String>) -> f64 {
    let raw = cell.map(String::as_str).unwrap_or("").trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return f64::NAN;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Place the rows onto a full hourly index from first to last timestamp, so
/// logger outages show up as gaps instead of joined line segments.
fn reindex_hourly(times: &[NaiveDateTime], nodes: Vec<String>, rows: &[Vec<f64>]) -> TimeTable {
    let first = times[0];
    let last = times[times.len() - 1];
    let mut by_time: HashMap<NaiveDateTime, usize> = HashMap::new();
    for (i, t) in times.iter().enumerate() {
        by_time.insert(*t, i);
    }

    let mut index: Vec<NaiveDateTime> = Vec::new();
    let mut t = first;
    while t <= last {
        index.push(t);
        t = t + Duration::hours(1);
    }

    let values: Vec<Vec<f64>> = (0..nodes.len())
        .map(|col| {
            index
                .iter()
                .map(|stamp| by_time.get(stamp).map(|&row| rows[row][col]).unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    TimeTable {
        times: index,
        nodes,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::logger_rename_map;

    fn sample_grid() -> RawGrid {
        let mut header = vec!["TIMESTAMP".to_string(), "RECORD".to_string(), "batt_volt_Avg".to_string()];
        for ch in 1..=48 {
            header.push(format!("redox_raw_Avg({ch})"));
        }
        for ch in 1..=12 {
            header.push(format!("temp_C_Avg({ch})"));
        }

        let data_row = |stamp: &str, record: &str, redox: f64, temp: f64| -> Vec<String> {
            let mut row = vec![stamp.to_string(), record.to_string(), "12.4".to_string()];
            for _ in 0..48 {
                row.push(format!("{redox}"));
            }
            for _ in 0..12 {
                row.push(format!("{temp}"));
            }
            row
        };

        vec![
            vec!["TOA5".to_string(), "CR1000X".to_string()],
            header,
            vec!["TS".to_string(), "RN".to_string(), "Volts".to_string()],
            vec!["".to_string(), "".to_string(), "Avg".to_string()],
            data_row("2024-08-14 10:00:00", "0", -150.0, 18.5),
            data_row("2024-08-14 11:00:00", "1", -120.0, 19.0),
            // hour 12 missing, logger outage
            data_row("2024-08-14 13:00:00", "3", -100.0, 19.5),
        ]
    }

    #[test]
    fn header_detection_skips_the_vendor_preamble() {
        let data = clean_logger_grid(&sample_grid(), 200.0, &logger_rename_map()).unwrap();
        assert_eq!(data.redox.nodes().len(), 48);
        assert_eq!(data.temperature.nodes().len(), 12);
        assert!(data.redox.column("CW2S3-4").is_some());
        assert!(data.temperature.column("CW3S4").is_some());
    }

    #[test]
    fn electrode_correction_applies_to_redox_only() {
        let data = clean_logger_grid(&sample_grid(), 200.0, &logger_rename_map()).unwrap();
        let redox = data.redox.column("CW1S1-1").unwrap();
        assert_eq!(redox[0], 50.0); // -150 + 200
        let temp = data.temperature.column("CW1S1").unwrap();
        assert_eq!(temp[0], 18.5);
    }

    #[test]
    fn hourly_reindex_leaves_gaps_as_nan() {
        let data = clean_logger_grid(&sample_grid(), 200.0, &logger_rename_map()).unwrap();
        assert_eq!(data.redox.times().len(), 4); // 10:00 through 13:00
        let col = data.redox.column("CW1S1-1").unwrap();
        assert!(col[2].is_nan());
        assert_eq!(col[3], 100.0);
    }

    #[test]
    fn group_mean_skips_gaps() {
        let data = clean_logger_grid(&sample_grid(), 200.0, &logger_rename_map()).unwrap();
        let nodes = crate::config::temperature_node_group(1);
        let mean = data.temperature.mean_across(&nodes);
        assert_eq!(mean[0], 18.5);
        assert!(mean[2].is_nan());
    }

    #[test]
    fn window_restricts_the_index() {
        let data = clean_logger_grid(&sample_grid(), 200.0, &logger_rename_map()).unwrap();
        let start = NaiveDateTime::parse_from_str("2024-08-14 11:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let end = NaiveDateTime::parse_from_str("2024-08-14 13:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let cut = data.redox.window(start, end);
        assert_eq!(cut.times().len(), 3);
        assert_eq!(cut.column("CW1S1-1").unwrap()[0], 80.0);
    }
}
