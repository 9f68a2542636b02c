//! Concentration-time series
//!
//! [`TimeSeries`] is the validated, immutable input to every estimation. It keeps
//! one entry per sampling time; a concentration that was not measured (or was
//! supplied as `NaN`) is stored as `None` and skipped by the algorithms, so
//! indices into the series stay stable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for malformed concentration-time input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Parallel arrays differ in length
    #[error("Array length mismatch: {times} times, {concentrations} concentrations")]
    LengthMismatch { times: usize, concentrations: usize },

    /// No sampling times at all
    #[error("Time series is empty")]
    Empty,

    /// A time value is NaN or infinite
    #[error("Time at index {index} is not finite")]
    NonFiniteTime { index: usize },

    /// Times must be non-decreasing
    #[error("Invalid time sequence: time at index {index} is smaller than its predecessor")]
    DecreasingTime { index: usize },

    /// Concentrations must be non-negative
    #[error("Negative concentration {value} at index {index}")]
    NegativeConcentration { index: usize, value: f64 },
}

/// Ordered (time, concentration) pairs with their units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    times: Vec<f64>,
    concentrations: Vec<Option<f64>>,
    time_unit: String,
    concentration_unit: String,
}

impl TimeSeries {
    /// Validate and build a series
    ///
    /// `Some(NaN)` and infinite concentrations are stored as missing.
    ///
    /// # Errors
    ///
    /// Returns a [`SeriesError`] if the arrays differ in length, the series is
    /// empty, a time is not finite, times decrease, or a concentration is negative.
    pub fn new(
        times: Vec<f64>,
        concentrations: Vec<Option<f64>>,
        time_unit: impl Into<String>,
        concentration_unit: impl Into<String>,
    ) -> Result<Self, SeriesError> {
        if times.len() != concentrations.len() {
            return Err(SeriesError::LengthMismatch {
                times: times.len(),
                concentrations: concentrations.len(),
            });
        }
        if times.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (index, &t) in times.iter().enumerate() {
            if !t.is_finite() {
                return Err(SeriesError::NonFiniteTime { index });
            }
            if index > 0 && t < times[index - 1] {
                return Err(SeriesError::DecreasingTime { index });
            }
        }

        let concentrations = concentrations
            .into_iter()
            .enumerate()
            .map(|(index, c)| match c {
                Some(value) if value.is_finite() => {
                    if value < 0.0 {
                        Err(SeriesError::NegativeConcentration { index, value })
                    } else {
                        Ok(Some(value))
                    }
                }
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            times,
            concentrations,
            time_unit: time_unit.into(),
            concentration_unit: concentration_unit.into(),
        })
    }

    /// Build a series from plain values, treating `NaN` as missing
    pub fn from_values(
        times: &[f64],
        concentrations: &[f64],
        time_unit: impl Into<String>,
        concentration_unit: impl Into<String>,
    ) -> Result<Self, SeriesError> {
        Self::new(
            times.to_vec(),
            concentrations
                .iter()
                .map(|&c| if c.is_nan() { None } else { Some(c) })
                .collect(),
            time_unit,
            concentration_unit,
        )
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn concentrations(&self) -> &[Option<f64>] {
        &self.concentrations
    }

    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn concentration_unit(&self) -> &str {
        &self.concentration_unit
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of points with a measured concentration
    pub fn n_valid(&self) -> usize {
        self.concentrations.iter().flatten().count()
    }

    /// Iterate over `(index, time, concentration)` for measured points only
    pub fn valid_points(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.times
            .iter()
            .zip(&self.concentrations)
            .enumerate()
            .filter_map(|(i, (&t, c))| c.map(|c| (i, t, c)))
    }
}
