use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Dimension, QuantityKind, UnitError};
use crate::PkError;

/// Built-in unit table: symbol, dimension, size in base units of the dimension
const DEFAULT_UNITS: &[(&str, Dimension, f64)] = &[
    // Time, base h
    ("h", Dimension::Time, 1.0),
    ("hr", Dimension::Time, 1.0),
    ("hour", Dimension::Time, 1.0),
    ("hours", Dimension::Time, 1.0),
    ("min", Dimension::Time, 1.0 / 60.0),
    ("minute", Dimension::Time, 1.0 / 60.0),
    ("minutes", Dimension::Time, 1.0 / 60.0),
    ("s", Dimension::Time, 1.0 / 3600.0),
    ("sec", Dimension::Time, 1.0 / 3600.0),
    ("second", Dimension::Time, 1.0 / 3600.0),
    ("d", Dimension::Time, 24.0),
    ("day", Dimension::Time, 24.0),
    ("days", Dimension::Time, 24.0),
    ("week", Dimension::Time, 168.0),
    ("wk", Dimension::Time, 168.0),
    ("yr", Dimension::Time, 8766.0),
    ("year", Dimension::Time, 8766.0),
    // Mass, base mg
    ("pg", Dimension::Mass, 1e-9),
    ("ng", Dimension::Mass, 1e-6),
    ("ug", Dimension::Mass, 1e-3),
    ("mcg", Dimension::Mass, 1e-3),
    ("mg", Dimension::Mass, 1.0),
    ("g", Dimension::Mass, 1e3),
    ("kg", Dimension::Mass, 1e6),
    // Volume, base L; lower-case l is a common spelling and clashes with nothing
    ("uL", Dimension::Volume, 1e-6),
    ("ul", Dimension::Volume, 1e-6),
    ("mL", Dimension::Volume, 1e-3),
    ("ml", Dimension::Volume, 1e-3),
    ("cL", Dimension::Volume, 1e-2),
    ("cl", Dimension::Volume, 1e-2),
    ("dL", Dimension::Volume, 1e-1),
    ("dl", Dimension::Volume, 1e-1),
    ("L", Dimension::Volume, 1.0),
    ("l", Dimension::Volume, 1.0),
    // Amount of substance, base µmol
    ("pmol", Dimension::Amount, 1e-6),
    ("nmol", Dimension::Amount, 1e-3),
    ("umol", Dimension::Amount, 1.0),
    ("mmol", Dimension::Amount, 1e3),
    ("mol", Dimension::Amount, 1e6),
    // Activity, base IU
    ("uIU", Dimension::Activity, 1e-6),
    ("mIU", Dimension::Activity, 1e-3),
    ("IU", Dimension::Activity, 1.0),
    ("iu", Dimension::Activity, 1.0),
    ("kIU", Dimension::Activity, 1e3),
    ("MIU", Dimension::Activity, 1e6),
    // Dimensionless
    ("dimensionless", Dimension::Dimensionless, 1.0),
    ("count", Dimension::Dimensionless, 1.0),
    ("none", Dimension::Dimensionless, 1.0),
    ("cups", Dimension::Dimensionless, 1.0),
    ("percent", Dimension::Dimensionless, 0.01),
    ("%", Dimension::Dimensionless, 0.01),
];

/// Definition of a single unit symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Symbol as written in input data, e.g. `"mg"` or `"IU"`
    pub symbol: String,
    /// Physical dimension
    pub dimension: Dimension,
    /// Size of one unit in base units of the dimension
    pub factor: f64,
}

impl UnitDefinition {
    pub fn new(symbol: impl Into<String>, dimension: Dimension, factor: f64) -> Self {
        Self {
            symbol: symbol.into(),
            dimension,
            factor,
        }
    }
}

/// Lookup table of recognized units
///
/// Symbols are case-sensitive (`mIU` and `MIU` differ by 1e9), matched
/// ignoring whitespace and with the micro sign (`µ` or `μ`) folded to `u`.
/// Volume units are listed in both `mL` and `ml` spellings. Symbols of the
/// form `a/b` that are not defined directly are resolved from their parts, so
/// `µg/mL` and `ng/ml` work without being listed.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDefinition>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for &(symbol, dimension, factor) in DEFAULT_UNITS {
            registry.insert(UnitDefinition::new(symbol, dimension, factor));
        }
        registry
    }
}

impl UnitRegistry {
    /// A registry without any units
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Default registry extended with the unit definitions in a JSON array
    ///
    /// ```rust
    /// use pkdb_nca::units::{QuantityKind, UnitRegistry};
    ///
    /// let json = r#"[{"symbol": "lb", "dimension": "mass", "factor": 453592.37}]"#;
    /// let registry = UnitRegistry::from_json(json).unwrap();
    /// let kg = registry.convert(154.0, "lb", QuantityKind::Weight).unwrap();
    /// assert!((kg - 69.853).abs() < 1e-3);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, PkError> {
        let definitions: Vec<UnitDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::default();
        for definition in definitions {
            registry.define(definition)?;
        }
        Ok(registry)
    }

    /// All definitions as a JSON array, sorted by symbol
    pub fn to_json(&self) -> Result<String, PkError> {
        Ok(serde_json::to_string_pretty(&self.definitions())?)
    }

    /// Add or replace a unit definition
    pub fn define(&mut self, definition: UnitDefinition) -> Result<(), UnitError> {
        if !definition.factor.is_finite() || definition.factor <= 0.0 {
            return Err(UnitError::InvalidDefinition {
                unit: definition.symbol,
                factor: definition.factor,
            });
        }
        self.insert(definition);
        Ok(())
    }

    /// Builder variant of [`UnitRegistry::define`]
    pub fn with_unit(mut self, definition: UnitDefinition) -> Result<Self, UnitError> {
        self.define(definition)?;
        Ok(self)
    }

    pub fn definitions(&self) -> Vec<UnitDefinition> {
        let mut defs: Vec<UnitDefinition> = self.units.values().cloned().collect();
        defs.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        defs
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolve a symbol to its dimension and size in base units
    pub fn resolve(&self, symbol: &str) -> Option<(Dimension, f64)> {
        let key = normalize(symbol);
        if let Some(def) = self.units.get(&key) {
            return Some((def.dimension, def.factor));
        }

        let (numerator, denominator) = key.split_once('/')?;
        if denominator.contains('/') {
            return None;
        }
        let numerator = self.units.get(numerator)?;
        let denominator = self.units.get(denominator)?;
        let dimension = Dimension::ratio(numerator.dimension, denominator.dimension)?;
        Some((dimension, numerator.factor / denominator.factor))
    }

    /// Multiplicative factor taking a value in `unit` to the canonical unit of `kind`
    pub fn factor(&self, unit: &str, kind: QuantityKind) -> Result<f64, UnitError> {
        let (dimension, factor) = self.resolve(unit).ok_or_else(|| UnitError::UnknownUnit {
            unit: unit.to_string(),
            expected: kind,
        })?;

        if dimension != kind.dimension() {
            return Err(UnitError::IncompatibleUnit {
                unit: unit.to_string(),
                expected: kind,
                found: dimension,
            });
        }

        Ok(factor / kind.canonical_factor())
    }

    /// Express `value` given in `unit` in the canonical unit of `kind`
    pub fn convert(&self, value: f64, unit: &str, kind: QuantityKind) -> Result<f64, UnitError> {
        Ok(value * self.factor(unit, kind)?)
    }

    /// Convert a series of possibly missing values; missing values stay missing
    pub fn convert_slice(
        &self,
        values: &[Option<f64>],
        unit: &str,
        kind: QuantityKind,
    ) -> Result<Vec<Option<f64>>, UnitError> {
        let factor = self.factor(unit, kind)?;
        Ok(values.iter().map(|v| v.map(|v| v * factor)).collect())
    }

    fn insert(&mut self, definition: UnitDefinition) {
        self.units.insert(normalize(&definition.symbol), definition);
    }
}

fn normalize(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\u{00B5}' | '\u{03BC}' => 'u',
            other => other,
        })
        .collect()
}
