//! Analysis toolkit for a constructed-wetland field-monitoring pilot.
//!
//! The crate covers the full path from raw lab exports to report figures:
//! spreadsheet cleanup ([`data`]), natural-attenuation screening
//! ([`screening`]), breakthrough-curve modelling ([`transport`]) and PNG
//! figure generation ([`charts`]). The binaries under `src/bin/` wire these
//! together into fixed-path batch pipelines driven by [`config::StudyConfig`].

pub mod charts;
pub mod config;
pub mod data;
pub mod screening;
pub mod transport;
