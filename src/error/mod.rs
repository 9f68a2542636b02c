use thiserror::Error;

use crate::data::SeriesError;
use crate::units::UnitError;

#[derive(Error, Debug)]
pub enum PkError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
