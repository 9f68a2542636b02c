//! Terminal phase analysis: elimination rate constant and half-life
//!
//! The terminal elimination phase is fitted as
//!
//! ```text
//! ln(C) = ln(C0) - k_el * t
//! ```
//!
//! by ordinary least squares over a trailing window of points.
//!
//! # Window selection
//!
//! 1. Candidate points are the measured, positive concentrations after Cmax
//!    (Cmax itself too when [`RegressionOptions::include_peak`] is set), up to
//!    the last positive observation.
//! 2. Every trailing window with at least 3 of those points is fitted.
//! 3. Windows with a non-negative slope are rejected.
//! 4. Among the windows whose adjusted R² is within
//!    [`RegressionOptions::adj_r_squared_tolerance`] of the best adjusted R²,
//!    the longest wins.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::types::RegressionOptions;

/// A log-linear terminal phase fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Terminal elimination rate constant (1/time), always > 0
    pub k_el: f64,
    /// ln(2) / k_el
    pub half_life: f64,
    /// Intercept of ln(C) vs time
    pub intercept: f64,
    pub r_squared: f64,
    /// Adjusted R² accounting for number of points
    pub adj_r_squared: f64,
    /// Number of points used in regression
    pub n_points: usize,
    /// Index of the first series point in the window
    pub first_index: usize,
    /// Index of the last series point in the window
    pub last_index: usize,
    pub time_first: f64,
    pub time_last: f64,
    /// (time_last - time_first) / half_life
    pub span_ratio: f64,
}

impl RegressionResult {
    /// Indices into the series spanned by the regression window
    pub fn window(&self) -> RangeInclusive<usize> {
        self.first_index..=self.last_index
    }

    /// Back-extrapolated concentration at t = 0
    pub fn c0(&self) -> f64 {
        self.intercept.exp()
    }

    /// Fitted concentration at time `t`
    pub fn predict(&self, t: f64) -> f64 {
        (self.intercept - self.k_el * t).exp()
    }
}

/// Why no terminal fit exists
///
/// This is an expected outcome for short or non-decaying curves, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NotEstimable {
    /// `times` and `concentrations` differ in length
    LengthMismatch { times: usize, concentrations: usize },
    /// Not enough positive points after the peak
    TooFewPoints { available: usize, required: usize },
    /// Every candidate window has slope >= 0
    NoDecayingWindow,
    /// Decaying windows exist but all fall below [`RegressionOptions::min_r_squared`]
    BelowMinRSquared { r_squared: f64, min_r_squared: f64 },
}

/// Fit the terminal phase of a concentration-time curve
///
/// `times` and `concentrations` are parallel and must have the same length;
/// missing or non-positive concentrations are skipped. Indices in the result
/// refer to these slices.
///
/// # Examples
///
/// ```rust
/// use pkdb_nca::nca::{terminal_regression, RegressionOptions};
///
/// let times = [0.0, 1.0, 2.0, 4.0, 8.0, 12.0];
/// let concs: Vec<Option<f64>> = [0.0, 10.0, 8.0, 5.0, 2.0, 0.8]
///     .iter()
///     .map(|&c| Some(c))
///     .collect();
///
/// let fit = terminal_regression(&times, &concs, &RegressionOptions::default()).unwrap();
/// assert!(fit.k_el > 0.0);
/// assert_eq!(fit.last_index, 5);
/// ```
pub fn terminal_regression(
    times: &[f64],
    concentrations: &[Option<f64>],
    options: &RegressionOptions,
) -> Result<RegressionResult, NotEstimable> {
    if times.len() != concentrations.len() {
        return Err(NotEstimable::LengthMismatch {
            times: times.len(),
            concentrations: concentrations.len(),
        });
    }
    let required = options.required_points();
    let n = times.len();

    // Cmax, first occurrence
    let mut peak: Option<(usize, f64)> = None;
    for (i, c) in concentrations.iter().enumerate() {
        if let Some(c) = *c {
            if peak.map_or(true, |(_, best)| c > best) {
                peak = Some((i, c));
            }
        }
    }
    let Some((peak_idx, _)) = peak else {
        return Err(NotEstimable::TooFewPoints {
            available: 0,
            required,
        });
    };

    let start = if options.include_peak {
        peak_idx
    } else {
        peak_idx + 1
    };

    let candidates: Vec<usize> = (start..n)
        .filter(|&i| concentrations[i].is_some_and(|c| c > 0.0))
        .collect();

    if candidates.len() < required {
        return Err(NotEstimable::TooFewPoints {
            available: candidates.len(),
            required,
        });
    }

    let mut fits: Vec<RegressionResult> = Vec::new();
    let mut best_rejected_r_squared: Option<f64> = None;

    for n_points in required..=candidates.len() {
        let window = &candidates[candidates.len() - n_points..];
        let x: Vec<f64> = window.iter().map(|&i| times[i]).collect();
        let y: Vec<f64> = window
            .iter()
            .filter_map(|&i| concentrations[i].map(f64::ln))
            .collect();

        let Some((slope, intercept, r_squared)) = linear_regression(&x, &y) else {
            continue;
        };

        if slope >= 0.0 {
            tracing::trace!(n_points, slope, "rejecting non-decaying window");
            continue;
        }
        if r_squared < options.min_r_squared {
            tracing::trace!(n_points, r_squared, "rejecting window below minimum R²");
            best_rejected_r_squared =
                Some(best_rejected_r_squared.map_or(r_squared, |best| best.max(r_squared)));
            continue;
        }

        let k_el = -slope;
        let half_life = std::f64::consts::LN_2 / k_el;
        let nf = n_points as f64;
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / (nf - 2.0);
        let time_first = x[0];
        let time_last = x[x.len() - 1];

        fits.push(RegressionResult {
            k_el,
            half_life,
            intercept,
            r_squared,
            adj_r_squared,
            n_points,
            first_index: window[0],
            last_index: window[window.len() - 1],
            time_first,
            time_last,
            span_ratio: (time_last - time_first) / half_life,
        });
    }

    // Every window within tolerance of the best adjusted R² ties; the longest wins
    let max_adj = fits
        .iter()
        .map(|fit| fit.adj_r_squared)
        .fold(f64::NEG_INFINITY, f64::max);
    let threshold = max_adj - options.adj_r_squared_tolerance;
    let best = fits
        .into_iter()
        .filter(|fit| fit.adj_r_squared >= threshold)
        .max_by_key(|fit| fit.n_points);

    match (best, best_rejected_r_squared) {
        (Some(fit), _) => {
            tracing::debug!(
                k_el = fit.k_el,
                adj_r_squared = fit.adj_r_squared,
                first = fit.first_index,
                last = fit.last_index,
                "selected terminal window"
            );
            Ok(fit)
        }
        (None, Some(r_squared)) => Err(NotEstimable::BelowMinRSquared {
            r_squared,
            min_r_squared: options.min_r_squared,
        }),
        (None, None) => Err(NotEstimable::NoDecayingWindow),
    }
}

/// [`terminal_regression`] with the reason discarded
pub fn lambda_z(
    times: &[f64],
    concentrations: &[Option<f64>],
    options: &RegressionOptions,
) -> Option<RegressionResult> {
    terminal_regression(times, concentrations, options).ok()
}

/// Simple linear regression: y = a + b*x
///
/// Returns (slope, intercept, r_squared)
fn linear_regression(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let n_f = n as f64;
    let x_mean: f64 = x.iter().sum::<f64>() / n_f;
    let y_mean: f64 = y.iter().sum::<f64>() / n_f;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let x_diff = xi - x_mean;
        let y_diff = yi - y_mean;
        ss_xy += x_diff * y_diff;
        ss_xx += x_diff * x_diff;
        ss_yy += y_diff * y_diff;
    }

    // All samples at the same time
    if ss_xx.abs() < 1e-15 {
        return None;
    }

    let slope = ss_xy / ss_xx;
    let intercept = y_mean - slope * x_mean;

    let r_squared = if ss_yy.abs() < 1e-15 {
        1.0
    } else {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    };

    Some((slope, intercept, r_squared))
}
