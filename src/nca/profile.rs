//! Internal profile representation for NCA analysis
//!
//! The Profile struct is the concentration-time series converted to canonical
//! units (h, mg/L), with the key indices cached. It keeps the indexing of the
//! source [`TimeSeries`] so regression windows map back to the input.

use crate::data::TimeSeries;
use crate::units::{QuantityKind, UnitError, UnitRegistry};

#[derive(Debug, Clone)]
pub(crate) struct Profile {
    /// Time points in h
    pub times: Vec<f64>,
    /// Concentrations in mg/L, `None` where not measured
    pub concentrations: Vec<Option<f64>>,
    /// Index of Cmax (first occurrence)
    pub cmax_idx: Option<usize>,
    /// Index of the last measured concentration
    pub last_idx: Option<usize>,
}

impl Profile {
    /// Convert a series to canonical units
    ///
    /// # Errors
    /// Fails if the time or concentration unit is unknown or of the wrong dimension.
    pub fn from_series(series: &TimeSeries, registry: &UnitRegistry) -> Result<Self, UnitError> {
        let time_factor = registry.factor(series.time_unit(), QuantityKind::Time)?;
        let concentrations = registry.convert_slice(
            series.concentrations(),
            series.concentration_unit(),
            QuantityKind::Concentration,
        )?;
        let times: Vec<f64> = series.times().iter().map(|t| t * time_factor).collect();

        let mut cmax_idx: Option<usize> = None;
        for (i, c) in concentrations.iter().enumerate() {
            if let Some(c) = *c {
                let is_new_max = match cmax_idx {
                    None => true,
                    Some(j) => concentrations[j].is_some_and(|best| c > best),
                };
                if is_new_max {
                    cmax_idx = Some(i);
                }
            }
        }
        let last_idx = concentrations.iter().rposition(|c| c.is_some());

        Ok(Self {
            times,
            concentrations,
            cmax_idx,
            last_idx,
        })
    }

    pub fn n_valid(&self) -> usize {
        self.concentrations.iter().flatten().count()
    }

    /// (Tmax, Cmax)
    pub fn peak(&self) -> Option<(f64, f64)> {
        let i = self.cmax_idx?;
        Some((self.times[i], self.concentrations[i]?))
    }

    /// Last measured concentration
    pub fn clast(&self) -> Option<f64> {
        self.concentrations[self.last_idx?]
    }

    /// Measured point before Tmax whose concentration is closest to Cmax / 2
    ///
    /// Ties go to the earlier point.
    pub fn half_max(&self) -> Option<(f64, f64)> {
        let peak = self.cmax_idx?;
        let half = self.concentrations[peak]? / 2.0;

        let mut best: Option<(f64, f64)> = None;
        for i in 0..peak {
            if let Some(c) = self.concentrations[i] {
                let closer = best.map_or(true, |(_, b)| (c - half).abs() < (b - half).abs());
                if closer {
                    best = Some((self.times[i], c));
                }
            }
        }
        best
    }
}
