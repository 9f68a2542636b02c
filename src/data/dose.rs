use serde::{Deserialize, Serialize};

/// Dosing metadata for one estimation
///
/// The dose must be the absolute administered amount. Doses reported per
/// bodyweight (e.g. mg/kg) have to be multiplied by the bodyweight first.
/// A non-finite dose or bodyweight is treated as not reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseInfo {
    substance: String,
    dose: f64,
    dose_unit: String,
    bodyweight: Option<f64>,
    bodyweight_unit: String,
}

impl DoseInfo {
    pub fn new(substance: impl Into<String>, dose: f64, dose_unit: impl Into<String>) -> Self {
        Self {
            substance: substance.into(),
            dose,
            dose_unit: dose_unit.into(),
            bodyweight: None,
            bodyweight_unit: "kg".to_string(),
        }
    }

    /// Attach the subject's (or group's mean) bodyweight
    pub fn with_bodyweight(mut self, bodyweight: f64, unit: impl Into<String>) -> Self {
        self.bodyweight = Some(bodyweight);
        self.bodyweight_unit = unit.into();
        self
    }

    pub fn substance(&self) -> &str {
        &self.substance
    }

    /// Dose amount, `None` when not finite
    pub fn dose(&self) -> Option<f64> {
        Some(self.dose).filter(|d| d.is_finite())
    }

    pub fn dose_unit(&self) -> &str {
        &self.dose_unit
    }

    /// Bodyweight, `None` when absent or not finite
    pub fn bodyweight(&self) -> Option<f64> {
        self.bodyweight.filter(|bw| bw.is_finite())
    }

    pub fn bodyweight_unit(&self) -> &str {
        &self.bodyweight_unit
    }
}
