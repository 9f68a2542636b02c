//! NCA types: options, the parameter record and warnings
//!
//! - [`EstimationOptions`] / [`RegressionOptions`]: configuration
//! - [`PKParameterSet`]: the estimation result
//! - [`PkParameter`]: one value with its unit, possibly unresolved
//! - [`Warning`]: why a parameter is unresolved or questionable

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

use super::terminal::{NotEstimable, RegressionResult};
use crate::PkError;

// ============================================================================
// Configuration Types
// ============================================================================

/// Terminal-phase regression options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionOptions {
    /// Minimum number of valid points in a window (default: 3, never less than 3)
    pub min_points: usize,
    /// Allow windows to start at Cmax itself (default: false)
    pub include_peak: bool,
    /// Adjusted R² values closer than this are treated as equal and the
    /// window with more points wins (default: 1e-4)
    pub adj_r_squared_tolerance: f64,
    /// Windows with R² below this are discarded (default: 0.0, no gate)
    pub min_r_squared: f64,
    /// Accepted fits with R² below this get a [`Warning::PoorFit`] (default: 0.9)
    pub warn_r_squared: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            min_points: 3,
            include_peak: false,
            adj_r_squared_tolerance: 1e-4,
            min_r_squared: 0.0,
            warn_r_squared: 0.9,
        }
    }
}

impl RegressionOptions {
    /// Effective minimum window size
    pub(crate) fn required_points(&self) -> usize {
        self.min_points.max(3)
    }
}

/// Complete estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationOptions {
    /// Terminal phase regression options
    pub regression: RegressionOptions,
    /// Extrapolated AUC share above which a warning is attached (default: 20.0 %)
    pub max_auc_extrap_pct: f64,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        Self {
            regression: RegressionOptions::default(),
            max_auc_extrap_pct: 20.0,
        }
    }
}

impl EstimationOptions {
    /// Options from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_regression(mut self, options: RegressionOptions) -> Self {
        self.regression = options;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.regression.min_points = min_points;
        self
    }

    pub fn with_include_peak(mut self, include_peak: bool) -> Self {
        self.regression.include_peak = include_peak;
        self
    }

    pub fn with_min_r_squared(mut self, min_r_squared: f64) -> Self {
        self.regression.min_r_squared = min_r_squared;
        self
    }

    pub fn with_max_auc_extrap_pct(mut self, pct: f64) -> Self {
        self.max_auc_extrap_pct = pct;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A single estimated parameter
///
/// `value` is `None` when the inputs did not allow the parameter to be
/// computed. The unit is always set, so absent values still document what
/// they would have been expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParameterRecord")]
pub struct PkParameter {
    value: Option<f64>,
    unit: String,
    present: bool,
}

/// Serialized form; `present` is recomputed from `value` on load
#[derive(Deserialize)]
struct ParameterRecord {
    value: Option<f64>,
    unit: String,
}

impl From<ParameterRecord> for PkParameter {
    fn from(record: ParameterRecord) -> Self {
        PkParameter::new(record.value, record.unit)
    }
}

impl PkParameter {
    /// Non-finite values are stored as absent
    pub fn new(value: Option<f64>, unit: impl Into<String>) -> Self {
        let value = value.filter(|v| v.is_finite());
        Self {
            present: value.is_some(),
            value,
            unit: unit.into(),
        }
    }

    pub fn absent(unit: impl Into<String>) -> Self {
        Self::new(None, unit)
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}

impl fmt::Display for PkParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{:.4} [{}]", v, self.unit),
            None => write!(f, "- [{}]", self.unit),
        }
    }
}

/// Parameters divided by bodyweight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyweightNormalized {
    pub bodyweight: PkParameter,
    pub dose: PkParameter,
    pub auc_last: PkParameter,
    pub auc_inf: PkParameter,
    pub clearance: PkParameter,
    pub vd: PkParameter,
}

/// Result of one estimation
///
/// All values are in canonical units. Every parameter resolves independently;
/// a partially populated record is a normal outcome and [`PKParameterSet::warnings`]
/// explains the gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PKParameterSet {
    /// Substance identifier carried over from the dose information
    pub substance: String,
    /// Maximum observed concentration
    pub cmax: PkParameter,
    /// Time of Cmax (first occurrence)
    pub tmax: PkParameter,
    /// Linear trapezoidal AUC to the last observation
    pub auc_last: PkParameter,
    /// AUC extrapolated to infinity
    pub auc_inf: PkParameter,
    /// Terminal elimination rate constant
    pub k_el: PkParameter,
    /// ln(2) / k_el
    pub half_life: PkParameter,
    /// dose / AUC_inf
    pub clearance: PkParameter,
    /// clearance / k_el
    pub vd: PkParameter,
    /// Observed point before Tmax closest to half of Cmax
    pub tmax_half: PkParameter,
    /// Concentration at `tmax_half`
    pub cmax_half: PkParameter,
    /// Share of AUC_inf that is extrapolated
    pub auc_pct_extrap: PkParameter,
    /// Dose and exposure per kg bodyweight, when the bodyweight is known
    pub per_bodyweight: Option<BodyweightNormalized>,
    /// Terminal regression details, when a fit was found
    pub regression: Option<RegressionResult>,
    /// Reasons for unresolved or questionable parameters
    pub warnings: Vec<Warning>,
}

impl PKParameterSet {
    /// Flatten present parameters to name-value pairs for export
    pub fn to_params(&self) -> HashMap<&'static str, f64> {
        let mut p = HashMap::new();
        for (name, param) in self.named() {
            if let Some(v) = param.value() {
                p.insert(name, v);
            }
        }

        if let Some(ref bw) = self.per_bodyweight {
            for (name, param) in [
                ("bodyweight", &bw.bodyweight),
                ("dose/bw", &bw.dose),
                ("auc_last/bw", &bw.auc_last),
                ("auc_inf/bw", &bw.auc_inf),
                ("clearance/bw", &bw.clearance),
                ("vd/bw", &bw.vd),
            ] {
                if let Some(v) = param.value() {
                    p.insert(name, v);
                }
            }
        }

        if let Some(ref reg) = self.regression {
            p.insert("r_squared", reg.r_squared);
            p.insert("adj_r_squared", reg.adj_r_squared);
            p.insert("intercept", reg.intercept);
        }

        p
    }

    /// Serialize the record to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, PkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Core parameters in report order
    pub fn named(&self) -> [(&'static str, &PkParameter); 11] {
        [
            ("cmax", &self.cmax),
            ("tmax", &self.tmax),
            ("auc_last", &self.auc_last),
            ("auc_inf", &self.auc_inf),
            ("k_el", &self.k_el),
            ("half_life", &self.half_life),
            ("clearance", &self.clearance),
            ("vd", &self.vd),
            ("tmax_half", &self.tmax_half),
            ("cmax_half", &self.cmax_half),
            ("auc_pct_extrap", &self.auc_pct_extrap),
        ]
    }
}

impl fmt::Display for PKParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "{}", self.substance)?;
        writeln!(f, "{}", rule)?;

        if let Some(ref reg) = self.regression {
            writeln!(f, "  {:<14}: {:>10.4}", "slope", -reg.k_el)?;
            writeln!(f, "  {:<14}: {:>10.4}", "intercept", reg.intercept)?;
            writeln!(f, "  {:<14}: {:>10.4}", "r_squared", reg.r_squared)?;
            writeln!(
                f,
                "  {:<14}: {}..={} ({} points)",
                "window", reg.first_index, reg.last_index, reg.n_points
            )?;
            writeln!(f, "{}", rule)?;
        }

        for (name, param) in self.named() {
            writeln!(f, "  {:<14}: {}", name, param)?;
        }

        if let Some(ref bw) = self.per_bodyweight {
            writeln!(f)?;
            for (name, param) in [
                ("bodyweight", &bw.bodyweight),
                ("dose/bw", &bw.dose),
                ("auc_last/bw", &bw.auc_last),
                ("auc_inf/bw", &bw.auc_inf),
                ("clearance/bw", &bw.clearance),
                ("vd/bw", &bw.vd),
            ] {
                writeln!(f, "  {:<14}: {}", name, param)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "{}", rule)?;
            for w in &self.warnings {
                writeln!(f, "  ! {}", w)?;
            }
        }
        Ok(())
    }
}

/// Why a parameter is unresolved or should be treated with care
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// No measured concentration in the series
    NoValidConcentrations,
    /// Fewer than two measured points, so no AUC
    InsufficientAucPoints { available: usize },
    /// Not enough positive points after Cmax for the terminal regression
    TooFewTerminalPoints { available: usize, required: usize },
    /// Every candidate window has a non-negative slope
    NoDecayingWindow,
    /// Decaying windows were all rejected by the minimum R² gate
    BelowMinRSquared { r_squared: f64, min_r_squared: f64 },
    /// Time and concentration arrays differ in length
    LengthMismatch { times: usize, concentrations: usize },
    /// The selected terminal fit is poor
    PoorFit { r_squared: f64, threshold: f64 },
    /// AUC extrapolation percentage exceeds threshold
    HighExtrapolation { pct: f64, threshold: f64 },
    /// No usable dose, so no clearance or volume
    MissingDose,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoValidConcentrations => write!(f, "No measured concentrations"),
            Warning::InsufficientAucPoints { available } => {
                write!(f, "AUC needs at least 2 measured points, got {}", available)
            }
            Warning::TooFewTerminalPoints {
                available,
                required,
            } => write!(
                f,
                "Terminal regression needs {} positive points after Cmax, got {}",
                required, available
            ),
            Warning::NoDecayingWindow => {
                write!(f, "No terminal window with decaying concentrations")
            }
            Warning::BelowMinRSquared {
                r_squared,
                min_r_squared,
            } => write!(
                f,
                "Best terminal window R²={:.4} below required {:.4}",
                r_squared, min_r_squared
            ),
            Warning::LengthMismatch {
                times,
                concentrations,
            } => write!(
                f,
                "{} times but {} concentrations",
                times, concentrations
            ),
            Warning::PoorFit {
                r_squared,
                threshold,
            } => write!(f, "k_el R²={:.4} below {:.4}", r_squared, threshold),
            Warning::HighExtrapolation { pct, threshold } => write!(
                f,
                "AUC extrapolation {:.1}% exceeds {:.1}% threshold",
                pct, threshold
            ),
            Warning::MissingDose => write!(f, "Dose not reported"),
        }
    }
}

impl From<NotEstimable> for Warning {
    fn from(reason: NotEstimable) -> Self {
        match reason {
            NotEstimable::LengthMismatch {
                times,
                concentrations,
            } => Warning::LengthMismatch {
                times,
                concentrations,
            },
            NotEstimable::TooFewPoints {
                available,
                required,
            } => Warning::TooFewTerminalPoints {
                available,
                required,
            },
            NotEstimable::NoDecayingWindow => Warning::NoDecayingWindow,
            NotEstimable::BelowMinRSquared {
                r_squared,
                min_r_squared,
            } => Warning::BelowMinRSquared {
                r_squared,
                min_r_squared,
            },
        }
    }
}
