//! Training-harness settings consumed by the loss functions.
//!
//! The values that the surrounding training pipeline shares with this crate
//! (cost asymmetry weights and batch geometry) are carried explicitly in
//! [`LossSettings`] rather than read from process-wide state, so a settings
//! value is always traceable to the call site that supplied it.

use crate::error::{LossError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shared configuration for constructing and evaluating losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossSettings {
    /// Punishment constant applied when a positive label is scored low
    pub false_negative_punishment: f64,
    /// Punishment constant applied when a negative label is scored high
    pub false_positive_punishment: f64,
    /// Size of the class vocabulary
    pub num_classes: usize,
    /// Number of examples per training batch
    pub batch_size: usize,
}

impl Default for LossSettings {
    fn default() -> Self {
        Self {
            false_negative_punishment: 1.0,
            false_positive_punishment: 1.0,
            num_classes: 4716,
            batch_size: 1024,
        }
    }
}

impl LossSettings {
    /// Create settings with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the false negative punishment weight.
    pub fn with_false_negative_punishment(mut self, weight: f64) -> Result<Self> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(LossError::invalid_parameter(
                "false_negative_punishment",
                &weight.to_string(),
                "must be positive and finite",
            ));
        }
        self.false_negative_punishment = weight;
        Ok(self)
    }

    /// Set the false positive punishment weight.
    pub fn with_false_positive_punishment(mut self, weight: f64) -> Result<Self> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(LossError::invalid_parameter(
                "false_positive_punishment",
                &weight.to_string(),
                "must be positive and finite",
            ));
        }
        self.false_positive_punishment = weight;
        Ok(self)
    }

    /// Set the class vocabulary size.
    pub fn with_num_classes(mut self, num_classes: usize) -> Result<Self> {
        if num_classes == 0 {
            return Err(LossError::invalid_parameter(
                "num_classes",
                "0",
                "must be positive",
            ));
        }
        self.num_classes = num_classes;
        Ok(self)
    }

    /// Set the training batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(LossError::invalid_parameter(
                "batch_size",
                "0",
                "must be positive",
            ));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize settings to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants that the builder methods enforce.
    pub fn validate(&self) -> Result<()> {
        if !(self.false_negative_punishment > 0.0 && self.false_negative_punishment.is_finite()) {
            return Err(LossError::configuration(
                "false_negative_punishment must be positive and finite",
            ));
        }
        if !(self.false_positive_punishment > 0.0 && self.false_positive_punishment.is_finite()) {
            return Err(LossError::configuration(
                "false_positive_punishment must be positive and finite",
            ));
        }
        if self.num_classes == 0 {
            return Err(LossError::configuration("num_classes must be positive"));
        }
        if self.batch_size == 0 {
            return Err(LossError::configuration("batch_size must be positive"));
        }
        Ok(())
    }

    /// Verify that a score matrix has the configured `[batch_size, num_classes]`
    /// geometry. The training pipeline produces fixed-shape batches, so a
    /// mismatch here means the caller wired the wrong settings to the model.
    pub fn check_geometry(&self, scores: &Array2<f64>) -> Result<()> {
        let expected = (self.batch_size, self.num_classes);
        if scores.dim() != expected {
            return Err(LossError::dimension_mismatch(
                format!("[{}, {}]", expected.0, expected.1),
                format!("[{}, {}]", scores.nrows(), scores.ncols()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_default_settings() {
        let settings = LossSettings::default();
        assert_eq!(settings.false_negative_punishment, 1.0);
        assert_eq!(settings.false_positive_punishment, 1.0);
        assert_eq!(settings.num_classes, 4716);
        assert_eq!(settings.batch_size, 1024);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_validation() {
        assert!(LossSettings::new().with_false_negative_punishment(2.0).is_ok());
        assert!(LossSettings::new().with_false_negative_punishment(0.0).is_err());
        assert!(LossSettings::new().with_false_positive_punishment(-1.0).is_err());
        assert!(LossSettings::new().with_num_classes(0).is_err());
        assert!(LossSettings::new().with_batch_size(0).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let settings = LossSettings::new()
            .with_false_negative_punishment(4.0)
            .unwrap()
            .with_num_classes(25)
            .unwrap();

        let json = settings.to_json().unwrap();
        let parsed = LossSettings::from_json(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let json = r#"{
            "false_negative_punishment": 0.0,
            "false_positive_punishment": 1.0,
            "num_classes": 10,
            "batch_size": 4
        }"#;
        assert!(matches!(
            LossSettings::from_json(json),
            Err(LossError::Configuration { .. })
        ));
    }

    #[test]
    fn test_check_geometry() {
        let settings = LossSettings::new()
            .with_batch_size(2)
            .unwrap()
            .with_num_classes(3)
            .unwrap();

        assert!(settings.check_geometry(&Array2::zeros((2, 3))).is_ok());
        assert!(matches!(
            settings.check_geometry(&Array2::zeros((2, 4))),
            Err(LossError::DimensionMismatch { .. })
        ));
    }
}
