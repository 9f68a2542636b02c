//! Area Under the Curve (AUC) calculation functions
//!
//! Linear trapezoidal rule between adjacent measured points:
//!
//! ```text
//! AUC_segment = (C₁ + C₂) / 2 × (t₂ - t₁)
//! ```
//!
//! Missing concentrations are skipped: the segment is taken between the
//! neighbouring measured points rather than integrating to zero.
//!
//! The terminal extrapolation adds the area under the fitted exponential tail:
//!
//! ```text
//! AUC_inf = AUC_last + C_last / k_el
//! ```

/// AUC for a single segment; 0 when `t2 <= t1`
///
/// ```rust
/// use pkdb_nca::nca::auc_segment;
///
/// let auc = auc_segment(0.0, 10.0, 1.0, 8.0);
/// assert!((auc - 9.0).abs() < 1e-10); // (10 + 8) / 2 * 1
/// ```
#[inline]
pub fn auc_segment(t1: f64, c1: f64, t2: f64, c2: f64) -> f64 {
    let dt = t2 - t1;
    if dt <= 0.0 {
        return 0.0;
    }
    (c1 + c2) / 2.0 * dt
}

fn measured<'a>(
    times: &'a [f64],
    concentrations: &'a [Option<f64>],
) -> impl Iterator<Item = (f64, f64)> + 'a {
    times
        .iter()
        .zip(concentrations)
        .filter_map(|(&t, c)| c.map(|c| (t, c)))
}

/// AUC from the first to the last measured point
///
/// Returns `None` with fewer than two measured points or when the slices
/// differ in length.
///
/// # Examples
///
/// ```rust
/// use pkdb_nca::nca::auc_last;
///
/// let times = [0.0, 1.0, 2.0, 4.0];
/// let concs = [Some(0.0), Some(10.0), None, Some(4.0)];
///
/// // 0-1: 5, 1-4 bridged over the missing sample: (10 + 4) / 2 * 3 = 21
/// assert_eq!(auc_last(&times, &concs), Some(26.0));
/// ```
pub fn auc_last(times: &[f64], concentrations: &[Option<f64>]) -> Option<f64> {
    if times.len() != concentrations.len() {
        return None;
    }
    let mut points = measured(times, concentrations);
    let (mut t_prev, mut c_prev) = points.next()?;

    let mut n_segments = 0;
    let mut auc = 0.0;
    for (t, c) in points {
        auc += auc_segment(t_prev, c_prev, t, c);
        t_prev = t;
        c_prev = c;
        n_segments += 1;
    }

    (n_segments > 0).then_some(auc)
}

/// Running AUC at every point of the series
///
/// Missing points carry `None`; measured points carry the integral from the
/// first measured point up to themselves. `None` when the slices differ in
/// length.
pub fn auc_cumulative(
    times: &[f64],
    concentrations: &[Option<f64>],
) -> Option<Vec<Option<f64>>> {
    if times.len() != concentrations.len() {
        return None;
    }
    let mut previous: Option<(f64, f64)> = None;
    let mut auc = 0.0;

    Some(
        times
            .iter()
            .zip(concentrations)
            .map(|(&t, c)| {
                let c = (*c)?;
                if let Some((t_prev, c_prev)) = previous {
                    auc += auc_segment(t_prev, c_prev, t, c);
                }
                previous = Some((t, c));
                Some(auc)
            })
            .collect(),
    )
}

/// AUC extrapolated to infinity
///
/// `None` unless `k_el` is positive and finite.
pub fn auc_inf(auc_last: f64, clast: f64, k_el: f64) -> Option<f64> {
    if !(k_el.is_finite() && k_el > 0.0) {
        return None;
    }
    Some(auc_last + clast / k_el)
}

/// Percent of AUC_inf that is extrapolated
///
/// %AUC_extrap = (AUC_inf - AUC_last) / AUC_inf × 100
pub fn auc_percent_extrapolated(auc_last: f64, auc_inf: f64) -> Option<f64> {
    if auc_inf <= 0.0 {
        return None;
    }
    Some((auc_inf - auc_last) / auc_inf * 100.0)
}
