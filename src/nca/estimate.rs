//! Parameter estimation for a single concentration-time curve
//!
//! [`Estimator`] ties the pieces together:
//!
//! 1. Convert inputs to canonical units (fails on incompatible units)
//! 2. Cmax / Tmax
//! 3. Terminal regression → k_el, half-life
//! 4. AUC_last, AUC_inf
//! 5. Clearance = dose / AUC_inf, Vd = clearance / k_el
//!
//! Steps 2–5 never fail; parameters that cannot be computed are absent.

use rayon::prelude::*;

use super::auc;
use super::profile::Profile;
use super::terminal::terminal_regression;
use super::types::{
    BodyweightNormalized, EstimationOptions, PKParameterSet, PkParameter, Warning,
};
use crate::data::{DoseInfo, TimeSeries};
use crate::units::{QuantityKind, UnitRegistry};
use crate::PkError;

const TIME: &str = "h";
const CONCENTRATION: &str = "mg/L";
const AUC: &str = "mg*h/L";
const RATE: &str = "1/h";
const CLEARANCE: &str = "L/h";
const VOLUME: &str = "L";
const PERCENT: &str = "%";

/// Estimates pharmacokinetic parameters with a fixed unit registry and options
///
/// The estimator holds no mutable state; one instance can serve any number of
/// threads.
///
/// ```rust
/// use pkdb_nca::data::{DoseInfo, TimeSeries};
/// use pkdb_nca::nca::Estimator;
///
/// let series = TimeSeries::from_values(
///     &[0.0, 1.0, 2.0, 4.0, 8.0],
///     &[0.0, 8.0, 6.0, 3.0, 0.8],
///     "h",
///     "mg/L",
/// )
/// .unwrap();
/// let dose = DoseInfo::new("caffeine", 100.0, "mg").with_bodyweight(70.0, "kg");
///
/// let pk = Estimator::default().estimate(&series, &dose).unwrap();
/// assert_eq!(pk.cmax.value(), Some(8.0));
/// assert!(pk.clearance.is_present());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    registry: UnitRegistry,
    options: EstimationOptions,
}

impl Estimator {
    pub fn new(registry: UnitRegistry, options: EstimationOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EstimationOptions {
        &self.options
    }

    /// Estimate all parameters for one curve
    ///
    /// # Errors
    ///
    /// Returns [`PkError::Unit`] when a unit is unknown or measures the wrong
    /// dimension. Insufficient data is not an error.
    pub fn estimate(
        &self,
        series: &TimeSeries,
        dose: &DoseInfo,
    ) -> Result<PKParameterSet, PkError> {
        let profile = Profile::from_series(series, &self.registry)?;
        let dose_factor = self.registry.factor(dose.dose_unit(), QuantityKind::Mass)?;
        let dose_mg = dose.dose().map(|d| d * dose_factor);
        let bodyweight_kg = match dose.bodyweight() {
            Some(bw) => Some(self.registry.convert(
                bw,
                dose.bodyweight_unit(),
                QuantityKind::Weight,
            )?),
            None => None,
        };

        let mut warnings = Vec::new();

        // Exposure
        let peak = profile.peak();
        if peak.is_none() {
            warnings.push(Warning::NoValidConcentrations);
        }
        let half_max = profile.half_max();

        // Terminal phase
        let regression = match terminal_regression(
            &profile.times,
            &profile.concentrations,
            &self.options.regression,
        ) {
            Ok(fit) => {
                if fit.r_squared < self.options.regression.warn_r_squared {
                    warnings.push(Warning::PoorFit {
                        r_squared: fit.r_squared,
                        threshold: self.options.regression.warn_r_squared,
                    });
                }
                Some(fit)
            }
            Err(reason) => {
                tracing::debug!(substance = dose.substance(), ?reason, "k_el not estimable");
                warnings.push(Warning::from(reason));
                None
            }
        };
        let k_el = regression.as_ref().map(|r| r.k_el);
        let half_life = regression.as_ref().map(|r| r.half_life);

        // AUC
        let auc_last = auc::auc_last(&profile.times, &profile.concentrations);
        if auc_last.is_none() && peak.is_some() {
            warnings.push(Warning::InsufficientAucPoints {
                available: profile.n_valid(),
            });
        }
        let auc_inf = match (auc_last, profile.clast(), k_el) {
            (Some(auc), Some(clast), Some(k)) => auc::auc_inf(auc, clast, k),
            _ => None,
        };
        let auc_pct_extrap = match (auc_last, auc_inf) {
            (Some(last), Some(inf)) => auc::auc_percent_extrapolated(last, inf),
            _ => None,
        };
        if let Some(pct) = auc_pct_extrap {
            if pct > self.options.max_auc_extrap_pct {
                warnings.push(Warning::HighExtrapolation {
                    pct,
                    threshold: self.options.max_auc_extrap_pct,
                });
            }
        }

        // Clearance and volume
        let dose_mg = dose_mg.filter(|d| *d > 0.0);
        if dose_mg.is_none() {
            warnings.push(Warning::MissingDose);
        }
        let clearance = match (dose_mg, auc_inf) {
            (Some(d), Some(auc)) if auc > 0.0 => Some(d / auc),
            _ => None,
        };
        let vd = match (clearance, k_el) {
            (Some(cl), Some(k)) => Some(cl / k),
            _ => None,
        };

        let per_bodyweight = bodyweight_kg.filter(|bw| *bw > 0.0).map(|bw| {
            let per = |v: Option<f64>| v.map(|v| v / bw);
            BodyweightNormalized {
                bodyweight: PkParameter::new(Some(bw), "kg"),
                dose: PkParameter::new(per(dose_mg), "mg/kg"),
                auc_last: PkParameter::new(per(auc_last), "mg*h/L/kg"),
                auc_inf: PkParameter::new(per(auc_inf), "mg*h/L/kg"),
                clearance: PkParameter::new(per(clearance), "L/h/kg"),
                vd: PkParameter::new(per(vd), "L/kg"),
            }
        });

        Ok(PKParameterSet {
            substance: dose.substance().to_string(),
            cmax: PkParameter::new(peak.map(|(_, c)| c), CONCENTRATION),
            tmax: PkParameter::new(peak.map(|(t, _)| t), TIME),
            auc_last: PkParameter::new(auc_last, AUC),
            auc_inf: PkParameter::new(auc_inf, AUC),
            k_el: PkParameter::new(k_el, RATE),
            half_life: PkParameter::new(half_life, TIME),
            clearance: PkParameter::new(clearance, CLEARANCE),
            vd: PkParameter::new(vd, VOLUME),
            tmax_half: PkParameter::new(half_max.map(|(t, _)| t), TIME),
            cmax_half: PkParameter::new(half_max.map(|(_, c)| c), CONCENTRATION),
            auc_pct_extrap: PkParameter::new(auc_pct_extrap, PERCENT),
            per_bodyweight,
            regression,
            warnings,
        })
    }

    /// Estimate independent curves in parallel, results in input order
    pub fn estimate_batch(
        &self,
        jobs: &[(TimeSeries, DoseInfo)],
    ) -> Vec<Result<PKParameterSet, PkError>> {
        jobs.par_iter()
            .map(|(series, dose)| self.estimate(series, dose))
            .collect()
    }
}

/// Estimate parameters from plain arrays with the default registry and options
///
/// A `NaN` bodyweight or dose counts as not reported.
///
/// # Errors
///
/// Returns [`PkError::Series`] for malformed arrays and [`PkError::Unit`] for
/// incompatible units.
#[allow(clippy::too_many_arguments)]
pub fn estimate(
    time: &[f64],
    concentration: &[Option<f64>],
    dose: f64,
    dose_unit: &str,
    bodyweight: f64,
    bodyweight_unit: &str,
    time_unit: &str,
    concentration_unit: &str,
    substance: &str,
) -> Result<PKParameterSet, PkError> {
    let series = TimeSeries::new(
        time.to_vec(),
        concentration.to_vec(),
        time_unit,
        concentration_unit,
    )?;
    let dose = DoseInfo::new(substance, dose, dose_unit).with_bodyweight(bodyweight, bodyweight_unit);
    Estimator::default().estimate(&series, &dose)
}
