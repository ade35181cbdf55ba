//! Electron bookkeeping tables for the natural-attenuation screening:
//! terminal electron acceptors and the contaminants they can oxidise.

/// A terminal electron acceptor as quantified by the lab.
#[derive(Debug, Clone, Copy)]
pub struct ElectronAcceptor {
    /// Analyte name in the cleaned lab table.
    pub name: &'static str,
    /// g/mol.
    pub molecular_weight: f64,
    /// Electrons accepted per molecule on full reduction.
    pub electrons: f64,
}

const OXYGEN: ElectronAcceptor = ElectronAcceptor {
    name: "Oxygen",
    molecular_weight: 32.0,
    electrons: 4.0,
};
const NITRATE: ElectronAcceptor = ElectronAcceptor {
    name: "nitrate",
    molecular_weight: 62.0,
    electrons: 5.0,
};
const SULPHATE: ElectronAcceptor = ElectronAcceptor {
    name: "sulphates",
    molecular_weight: 96.1,
    electrons: 8.0,
};
const IRON_II: ElectronAcceptor = ElectronAcceptor {
    name: "Iron II",
    molecular_weight: 55.8,
    electrons: 1.0,
};

/// Which acceptors count towards the reductor total. Dissolved iron-II is a
/// reduction product rather than an available acceptor, so it only joins in
/// the extended variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptorGroup {
    /// Oxygen, nitrate, sulphate.
    Ons,
    /// Oxygen, nitrate, sulphate and iron-II.
    OnsFe,
}

impl AcceptorGroup {
    pub fn acceptors(&self) -> &'static [ElectronAcceptor] {
        match self {
            AcceptorGroup::Ons => &[OXYGEN, NITRATE, SULPHATE],
            AcceptorGroup::OnsFe => &[OXYGEN, NITRATE, SULPHATE, IRON_II],
        }
    }
}

/// A contaminant with its electron demand and legal intervention value.
#[derive(Debug, Clone, Copy)]
pub struct ContaminantSpec {
    /// Analyte name in the cleaned lab table.
    pub name: &'static str,
    /// g/mol.
    pub molecular_weight: f64,
    /// Electrons released per molecule on full mineralisation.
    pub electrons: f64,
    /// Groundwater intervention value, ug/L.
    pub intervention_ug_l: f64,
}

const BENZENE: ContaminantSpec = ContaminantSpec {
    name: "benzene",
    molecular_weight: 78.11,
    electrons: 30.0,
    intervention_ug_l: 30.0,
};
const TOLUENE: ContaminantSpec = ContaminantSpec {
    name: "toluene",
    molecular_weight: 92.14,
    electrons: 36.0,
    intervention_ug_l: 1000.0,
};
const ETHYLBENZENE: ContaminantSpec = ContaminantSpec {
    name: "ethylbenzene",
    molecular_weight: 106.17,
    electrons: 42.0,
    intervention_ug_l: 150.0,
};
const O_XYLENE: ContaminantSpec = ContaminantSpec {
    name: "o-xylene",
    molecular_weight: 106.17,
    electrons: 42.0,
    intervention_ug_l: 70.0,
};
const MP_XYLENE: ContaminantSpec = ContaminantSpec {
    name: "(m+p)-xylene",
    molecular_weight: 106.17,
    electrons: 42.0,
    intervention_ug_l: 70.0,
};
const NAPHTHALENE: ContaminantSpec = ContaminantSpec {
    name: "naphthalene",
    molecular_weight: 128.17,
    electrons: 48.0,
    intervention_ug_l: 70.0,
};

/// Which contaminants count towards the oxidator total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContaminantGroup {
    Btex,
    BtexNaphthalene,
}

impl ContaminantGroup {
    pub fn contaminants(&self) -> &'static [ContaminantSpec] {
        match self {
            ContaminantGroup::Btex => &[BENZENE, TOLUENE, ETHYLBENZENE, O_XYLENE, MP_XYLENE],
            ContaminantGroup::BtexNaphthalene => &[
                BENZENE,
                TOLUENE,
                ETHYLBENZENE,
                O_XYLENE,
                MP_XYLENE,
                NAPHTHALENE,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptor_groups_differ_by_iron() {
        assert_eq!(AcceptorGroup::Ons.acceptors().len(), 3);
        let with_iron = AcceptorGroup::OnsFe.acceptors();
        assert_eq!(with_iron.len(), 4);
        assert!(with_iron.iter().any(|a| a.name == "Iron II"));
    }

    #[test]
    fn naphthalene_only_joins_the_extended_group() {
        assert!(!ContaminantGroup::Btex
            .contaminants()
            .iter()
            .any(|c| c.name == "naphthalene"));
        assert!(ContaminantGroup::BtexNaphthalene
            .contaminants()
            .iter()
            .any(|c| c.name == "naphthalene"));
    }
}
