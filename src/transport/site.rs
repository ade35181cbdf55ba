//! Site and compound parameters for the transport calculations.

use serde::{Deserialize, Serialize};

/// Physical description of one wetland bed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Dry bulk density of the bed material, g/cm3.
    pub bulk_density: f64,
    /// Effective porosity, dimensionless.
    pub porosity: f64,
    /// Influent flow rate, m3/day.
    pub flow_rate: f64,
    /// Bed volume, m3.
    pub bulk_volume: f64,
    /// Fraction organic carbon of the bed material.
    pub foc: f64,
}

impl SiteParameters {
    /// Water-filled volume of the bed, m3.
    pub fn pore_volume(&self) -> f64 {
        self.porosity * self.bulk_volume
    }

    /// Residence time of one pore volume, days.
    pub fn pore_volume_time(&self) -> f64 {
        self.pore_volume() / self.flow_rate
    }
}

/// Sorption and decay properties of one compound.
#[derive(Debug, Clone, Copy)]
pub struct CompoundProperties {
    /// log octanol-water partition coefficient.
    pub log_kow: f64,
    /// First-order decay rate, 1/day.
    pub decay_rate: f64,
    /// g/mol.
    pub molecular_weight: f64,
}

impl CompoundProperties {
    /// Organic-carbon partition coefficient, L/kg, from the Karickhoff-style
    /// correlation log Koc = log Kow - 0.211.
    pub fn koc(&self) -> f64 {
        10f64.powf(self.log_kow - 0.211)
    }

    /// Solid-water distribution coefficient, L/kg.
    pub fn kd(&self, foc: f64) -> f64 {
        foc * self.koc()
    }

    /// Retardation factor of the compound in the given bed.
    pub fn retardation(&self, site: &SiteParameters) -> f64 {
        1.0 + site.bulk_density / site.porosity * self.kd(site.foc)
    }
}
