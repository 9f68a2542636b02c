//! Physical units attached to estimation inputs
//!
//! Every number that enters the estimator carries a unit string. This module
//! resolves those strings against a [`UnitRegistry`] and expresses the value in
//! the canonical unit of the expected [`QuantityKind`]:
//!
//! | Kind | Canonical unit |
//! |------|----------------|
//! | Time | h |
//! | Concentration | mg/L |
//! | Mass (dose) | mg |
//! | Weight (bodyweight) | kg |
//!
//! The registry is an explicit value constructed by the caller and passed into
//! the estimator. Custom units (activity units, percent, counts) are added with
//! [`UnitRegistry::define`] or loaded from JSON.
//!
//! ```rust
//! use pkdb_nca::units::{QuantityKind, UnitRegistry};
//!
//! let registry = UnitRegistry::default();
//! let hours = registry.convert(90.0, "min", QuantityKind::Time).unwrap();
//! assert!((hours - 1.5).abs() < 1e-12);
//!
//! // A volume is not a dose
//! assert!(registry.convert(1.0, "L", QuantityKind::Mass).is_err());
//! ```

mod registry;

pub use registry::{UnitDefinition, UnitRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Base unit: h
    Time,
    /// Base unit: mg
    Mass,
    /// Base unit: L
    Volume,
    /// Mass per volume, base unit: mg/L
    MassConcentration,
    /// Amount of substance, base unit: µmol
    Amount,
    /// Amount per volume, base unit: µmol/L
    MolarConcentration,
    /// Biological activity, base unit: IU
    Activity,
    /// Ratios, counts and percentages
    Dimensionless,
}

impl Dimension {
    /// Dimension of `numerator / denominator`, if it is one we track
    pub fn ratio(numerator: Dimension, denominator: Dimension) -> Option<Dimension> {
        use Dimension::*;
        match (numerator, denominator) {
            (a, b) if a == b => Some(Dimensionless),
            (x, Dimensionless) => Some(x),
            (Mass, Volume) => Some(MassConcentration),
            (Amount, Volume) => Some(MolarConcentration),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Time => "time",
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::MassConcentration => "mass concentration",
            Dimension::Amount => "amount of substance",
            Dimension::MolarConcentration => "molar concentration",
            Dimension::Activity => "activity",
            Dimension::Dimensionless => "dimensionless",
        };
        write!(f, "{}", name)
    }
}

/// The role a quantity plays in an estimation, which fixes its canonical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Sampling times
    Time,
    /// Measured concentrations
    Concentration,
    /// Administered dose
    Mass,
    /// Bodyweight
    Weight,
}

impl QuantityKind {
    /// Dimension a unit must have to be accepted for this kind
    pub fn dimension(self) -> Dimension {
        match self {
            QuantityKind::Time => Dimension::Time,
            QuantityKind::Concentration => Dimension::MassConcentration,
            QuantityKind::Mass | QuantityKind::Weight => Dimension::Mass,
        }
    }

    /// Symbol of the canonical unit
    pub fn canonical_unit(self) -> &'static str {
        match self {
            QuantityKind::Time => "h",
            QuantityKind::Concentration => "mg/L",
            QuantityKind::Mass => "mg",
            QuantityKind::Weight => "kg",
        }
    }

    /// Size of the canonical unit in base units of its dimension
    pub(crate) fn canonical_factor(self) -> f64 {
        match self {
            QuantityKind::Weight => 1e6,
            _ => 1.0,
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuantityKind::Time => "time",
            QuantityKind::Concentration => "concentration",
            QuantityKind::Mass => "mass",
            QuantityKind::Weight => "weight",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised while resolving or converting units
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The unit exists but measures something else than expected
    #[error("Incompatible unit '{unit}': expected {expected}, found {found}")]
    IncompatibleUnit {
        unit: String,
        expected: QuantityKind,
        found: Dimension,
    },

    /// The unit symbol could not be resolved by the registry
    #[error("Unknown unit '{unit}' for {expected}")]
    UnknownUnit { unit: String, expected: QuantityKind },

    /// A custom definition with a non-positive or non-finite factor
    #[error("Invalid definition for unit '{unit}': factor {factor} must be positive and finite")]
    InvalidDefinition { unit: String, factor: f64 },
}
