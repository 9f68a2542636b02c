//! Non-Compartmental Analysis (NCA) of a single concentration-time curve
//!
//! # Key Parameters
//!
//! | Parameter | Description | Unit |
//! |-----------|-------------|------|
//! | Cmax | Maximum observed concentration | mg/L |
//! | Tmax | Time of maximum concentration | h |
//! | AUClast | Linear trapezoidal AUC to the last observation | mg*h/L |
//! | AUCinf | AUC extrapolated to infinity | mg*h/L |
//! | k_el | Terminal elimination rate constant | 1/h |
//! | t½ | Half-life, ln(2)/k_el | h |
//! | CL | Clearance, dose / AUCinf | L/h |
//! | Vd | Volume of distribution, CL / k_el | L |
//!
//! # Usage
//!
//! ```rust
//! use pkdb_nca::nca::estimate;
//!
//! let pk = estimate(
//!     &[0.0, 1.0, 2.0, 4.0, 8.0],
//!     &[Some(0.0), Some(8.0), Some(6.0), Some(3.0), Some(0.8)],
//!     100.0,
//!     "mg",
//!     70.0,
//!     "kg",
//!     "h",
//!     "mg/L",
//!     "caffeine",
//! )
//! .unwrap();
//!
//! println!("{}", pk);
//! ```
//!
//! Parameters that cannot be computed are absent rather than errors:
//!
//! ```rust
//! use pkdb_nca::nca::estimate;
//!
//! // Only one sample after the peak: no terminal phase
//! let pk = estimate(
//!     &[0.0, 1.0, 2.0],
//!     &[Some(0.0), Some(8.0), Some(6.0)],
//!     100.0, "mg", f64::NAN, "kg", "h", "mg/L", "caffeine",
//! )
//! .unwrap();
//! assert!(pk.cmax.is_present());
//! assert!(pk.auc_last.is_present());
//! assert!(!pk.k_el.is_present());
//! assert!(!pk.clearance.is_present());
//! ```

mod auc;
mod estimate;
mod profile;
mod terminal;
mod types;

pub use auc::{auc_cumulative, auc_inf, auc_last, auc_percent_extrapolated, auc_segment};
pub use estimate::{estimate, Estimator};
pub use terminal::{lambda_z, terminal_regression, NotEstimable, RegressionResult};
pub use types::{
    BodyweightNormalized, EstimationOptions, PKParameterSet, PkParameter, RegressionOptions,
    Warning,
};
