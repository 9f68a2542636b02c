//! Pharmacokinetic parameter estimation and error-measure conversion
//!
//! - [`units`]: unit registry and conversion to canonical units
//! - [`data`]: validated inputs and SD/SE/CV conversion
//! - [`nca`]: terminal regression, AUC and the parameter estimator
//!
//! Everything is a pure function of its inputs; estimations can run on any
//! number of threads without coordination.

pub mod data;
pub mod error;
pub mod nca;
pub mod units;

pub use crate::data::{DoseInfo, ErrorMeasureSet, Measure, SeriesError, TimeSeries};
pub use crate::nca::{estimate, EstimationOptions, Estimator, PKParameterSet, PkParameter};
pub use crate::units::{QuantityKind, UnitError, UnitRegistry};
pub use error::PkError;

pub mod prelude {
    pub use crate::data::{
        compute_cv, compute_sd, compute_se, DoseInfo, ErrorMeasureSet, Measure, TimeSeries,
    };
    pub use crate::nca::{
        estimate, EstimationOptions, Estimator, PKParameterSet, PkParameter, RegressionOptions,
        RegressionResult, Warning,
    };
    pub use crate::units::{Dimension, QuantityKind, UnitDefinition, UnitRegistry};
    pub use crate::PkError;
}
