//! Charts module - static PNG report figures.
//!
//! Four figure families: redox/temperature time series, concentration
//! profiles along the flow path, traffic-light screening overviews and
//! breakthrough curves against the advection-dispersion model.

pub mod btc_plot;
pub mod profile_plot;
pub mod redox_plot;
pub mod series_plot;
pub mod style;
pub mod traffic_plot;

pub use btc_plot::{breakthrough_overlay, breakthrough_panels};
pub use profile_plot::{concentration_profile, ProfileOptions};
pub use redox_plot::{redox_time_series, temperature_time_series, TimeSeriesOptions};
pub use series_plot::compound_time_series;
pub use traffic_plot::{traffic_bars, traffic_bars_3d};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render figure: {0}")]
    Render(String),
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    #[error("Nothing to plot: {0}")]
    Empty(String),
}

/// Figures are best-effort: a figure without data is logged and skipped,
/// every other failure propagates. Returns whether the figure was written.
pub fn skip_if_empty(result: Result<(), ChartError>) -> Result<bool, ChartError> {
    match result {
        Ok(()) => Ok(true),
        Err(ChartError::Empty(what)) => {
            log::warn!("skipping figure: no data for {what}");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_figures_are_skipped_and_real_failures_propagate() {
        assert!(skip_if_empty(Ok(())).unwrap());
        assert!(!skip_if_empty(Err(ChartError::Empty("redox data".into()))).unwrap());
        assert!(skip_if_empty(Err(ChartError::Render("bad canvas".into()))).is_err());
    }
}
