//! Conversion between error measures
//!
//! Reported study data rarely carries every error measure. Given a count and a
//! mean, any one of the standard deviation (SD), standard error of the mean (SE)
//! and coefficient of variation (CV) determines the other two:
//!
//! ```text
//! SD = SE * sqrt(n) = CV * mean
//! SE = SD / sqrt(n)
//! CV = SD / mean
//! ```
//!
//! Inputs are [`Measure`]s: either a scalar or a vector of possibly missing
//! elements. Scalars broadcast against vectors. A conversion that lacks the
//! inputs it needs resolves to `None`; it never fails. Elements that cannot be
//! computed (missing input, zero mean for CV, count below one) are missing in
//! the result while the rest of the vector is still computed.

use serde::{Deserialize, Serialize};

/// A scalar or per-element error statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Scalar(f64),
    Vector(Vec<Option<f64>>),
}

impl Measure {
    /// Vector measure from plain values, `NaN` marks a missing element
    pub fn from_values(values: &[f64]) -> Self {
        Measure::Vector(
            values
                .iter()
                .map(|&v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        )
    }

    /// Number of elements, `None` for a scalar
    pub fn len(&self) -> Option<usize> {
        match self {
            Measure::Scalar(_) => None,
            Measure::Vector(values) => Some(values.len()),
        }
    }

    /// Element `i`, or the scalar value for any `i`; non-finite values are missing
    pub fn get(&self, i: usize) -> Option<f64> {
        let value = match self {
            Measure::Scalar(v) => Some(*v),
            Measure::Vector(values) => values.get(i).copied().flatten(),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Measure::Scalar(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Option<f64>]> {
        match self {
            Measure::Vector(values) => Some(values),
            Measure::Scalar(_) => None,
        }
    }

    /// A non-finite scalar counts as not reported
    fn is_present(&self) -> bool {
        match self {
            Measure::Scalar(v) => v.is_finite(),
            Measure::Vector(_) => true,
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::Scalar(value)
    }
}

impl From<Vec<f64>> for Measure {
    fn from(values: Vec<f64>) -> Self {
        Measure::from_values(&values)
    }
}

impl From<Vec<Option<f64>>> for Measure {
    fn from(values: Vec<Option<f64>>) -> Self {
        Measure::Vector(values)
    }
}

fn present(measure: Option<&Measure>) -> Option<&Measure> {
    measure.filter(|m| m.is_present())
}

/// sqrt(n) for a usable count
fn sqrt_count(n: f64) -> Option<f64> {
    (n >= 1.0).then(|| n.sqrt())
}

/// Apply `f` element by element, broadcasting scalars
///
/// Returns `None` when all inputs are scalars and `f` yields nothing, or when
/// vectors of different lengths are combined.
fn elementwise<const N: usize>(
    inputs: [&Measure; N],
    f: impl Fn([f64; N]) -> Option<f64>,
) -> Option<Measure> {
    let mut len: Option<usize> = None;
    for input in &inputs {
        if let Some(n) = input.len() {
            match len {
                Some(prev) if prev != n => {
                    tracing::warn!(
                        left = prev,
                        right = n,
                        "cannot broadcast error measures of different lengths"
                    );
                    return None;
                }
                _ => len = Some(n),
            }
        }
    }

    let eval = |i: usize| -> Option<f64> {
        let mut values = [0.0; N];
        for (value, input) in values.iter_mut().zip(&inputs) {
            *value = input.get(i)?;
        }
        f(values).filter(|v| v.is_finite())
    };

    match len {
        None => eval(0).map(Measure::Scalar),
        Some(n) => Some(Measure::Vector((0..n).map(eval).collect())),
    }
}

/// Standard deviation from SE and count, or else from CV and mean
pub fn compute_sd(
    se: Option<&Measure>,
    count: Option<&Measure>,
    cv: Option<&Measure>,
    mean: Option<&Measure>,
) -> Option<Measure> {
    if let (Some(se), Some(count)) = (present(se), present(count)) {
        elementwise([se, count], |[se, n]| Some(se * sqrt_count(n)?))
    } else if let (Some(cv), Some(mean)) = (present(cv), present(mean)) {
        elementwise([cv, mean], |[cv, mean]| Some(cv * mean))
    } else {
        None
    }
}

/// Standard error from SD and count, or else from CV, mean and count
pub fn compute_se(
    sd: Option<&Measure>,
    count: Option<&Measure>,
    cv: Option<&Measure>,
    mean: Option<&Measure>,
) -> Option<Measure> {
    if let (Some(sd), Some(count)) = (present(sd), present(count)) {
        elementwise([sd, count], |[sd, n]| Some(sd / sqrt_count(n)?))
    } else if let (Some(cv), Some(mean), Some(count)) =
        (present(cv), present(mean), present(count))
    {
        elementwise([cv, mean, count], |[cv, mean, n]| {
            Some(cv * mean / sqrt_count(n)?)
        })
    } else {
        None
    }
}

/// Coefficient of variation from SD and mean, or else from SE, count and mean
///
/// Elements with a mean of exactly zero are missing in the result.
pub fn compute_cv(
    sd: Option<&Measure>,
    count: Option<&Measure>,
    se: Option<&Measure>,
    mean: Option<&Measure>,
) -> Option<Measure> {
    if let (Some(sd), Some(mean)) = (present(sd), present(mean)) {
        elementwise([sd, mean], |[sd, mean]| (mean != 0.0).then(|| sd / mean))
    } else if let (Some(se), Some(count), Some(mean)) =
        (present(se), present(count), present(mean))
    {
        elementwise([se, count, mean], |[se, n, mean]| {
            if mean == 0.0 {
                return None;
            }
            Some(se * sqrt_count(n)? / mean)
        })
    } else {
        None
    }
}

/// The error statistics reported for one measurement
///
/// Only the measures that were actually reported are set. Use
/// [`ErrorMeasureSet::resolved`] to obtain a copy in which SD, SE and CV are
/// derived where the reported subset allows it.
///
/// ```rust
/// use pkdb_nca::data::ErrorMeasureSet;
///
/// let reported = ErrorMeasureSet::new().with_mean(10.0).with_sd(2.0).with_count(4.0);
/// let resolved = reported.resolved();
/// assert_eq!(resolved.se.and_then(|m| m.as_scalar()), Some(1.0));
/// assert_eq!(resolved.cv.and_then(|m| m.as_scalar()), Some(0.2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMeasureSet {
    pub mean: Option<Measure>,
    pub sd: Option<Measure>,
    pub se: Option<Measure>,
    pub cv: Option<Measure>,
    pub count: Option<Measure>,
}

impl ErrorMeasureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mean(mut self, mean: impl Into<Measure>) -> Self {
        self.mean = Some(mean.into());
        self
    }

    pub fn with_sd(mut self, sd: impl Into<Measure>) -> Self {
        self.sd = Some(sd.into());
        self
    }

    pub fn with_se(mut self, se: impl Into<Measure>) -> Self {
        self.se = Some(se.into());
        self
    }

    pub fn with_cv(mut self, cv: impl Into<Measure>) -> Self {
        self.cv = Some(cv.into());
        self
    }

    pub fn with_count(mut self, count: impl Into<Measure>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Copy with missing SD, SE and CV derived from the reported measures
    ///
    /// Reported values are never overwritten. SD is derived first and then
    /// used for SE and CV, so the result does not depend on field order.
    pub fn resolved(&self) -> Self {
        let count = self.count.as_ref();
        let mean = self.mean.as_ref();

        let sd = self
            .sd
            .clone()
            .filter(Measure::is_present)
            .or_else(|| compute_sd(self.se.as_ref(), count, self.cv.as_ref(), mean));
        let se = self
            .se
            .clone()
            .filter(Measure::is_present)
            .or_else(|| compute_se(sd.as_ref(), count, self.cv.as_ref(), mean));
        let cv = self
            .cv
            .clone()
            .filter(Measure::is_present)
            .or_else(|| compute_cv(sd.as_ref(), count, se.as_ref(), mean));

        Self {
            mean: self.mean.clone(),
            sd,
            se,
            cv,
            count: self.count.clone(),
        }
    }
}
