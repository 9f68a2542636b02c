pub mod dose;
pub mod error_measures;
pub mod series;
pub use dose::DoseInfo;
pub use error_measures::{compute_cv, compute_sd, compute_se, ErrorMeasureSet, Measure};
pub use series::{SeriesError, TimeSeries};
