//! Per-class binary cross entropy losses.
//!
//! Both variants treat every (example, class) cell as an independent binary
//! decision, sum the per-cell costs across the class vocabulary and average
//! over the batch. The weighted variant prices false negatives and false
//! positives separately, which matters when the label vocabulary is sparse
//! and a missed positive should cost more than a spurious one.

use crate::config::LossSettings;
use crate::error::{LossError, Result};
use crate::losses::{check_batch_pair, Loss};
use ndarray::{Array2, Zip};

/// Guard added inside both logarithms so a hard 0 or 1 score stays finite.
const EPSILON: f64 = 1e-6;

/// Cross entropy with independently tunable false-negative and
/// false-positive costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedCrossEntropyLoss {
    false_negative_punishment: f64,
    false_positive_punishment: f64,
}

impl WeightedCrossEntropyLoss {
    /// Create a weighted cross entropy loss with the given punishment
    /// weights. Both must be positive and finite.
    pub fn new(false_negative_punishment: f64, false_positive_punishment: f64) -> Result<Self> {
        if !(false_negative_punishment > 0.0 && false_negative_punishment.is_finite()) {
            return Err(LossError::invalid_parameter(
                "false_negative_punishment",
                &false_negative_punishment.to_string(),
                "must be positive and finite",
            ));
        }
        if !(false_positive_punishment > 0.0 && false_positive_punishment.is_finite()) {
            return Err(LossError::invalid_parameter(
                "false_positive_punishment",
                &false_positive_punishment.to_string(),
                "must be positive and finite",
            ));
        }
        Ok(Self {
            false_negative_punishment,
            false_positive_punishment,
        })
    }

    /// Take the punishment weights from shared settings.
    pub fn from_settings(settings: &LossSettings) -> Result<Self> {
        Self::new(
            settings.false_negative_punishment,
            settings.false_positive_punishment,
        )
    }

    /// The configured false negative punishment weight.
    pub fn false_negative_punishment(&self) -> f64 {
        self.false_negative_punishment
    }

    /// The configured false positive punishment weight.
    pub fn false_positive_punishment(&self) -> f64 {
        self.false_positive_punishment
    }
}

impl Default for WeightedCrossEntropyLoss {
    fn default() -> Self {
        Self {
            false_negative_punishment: 1.0,
            false_positive_punishment: 1.0,
        }
    }
}

impl Loss for WeightedCrossEntropyLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        _positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;

        let fn_weight = self.false_negative_punishment;
        let fp_weight = self.false_positive_punishment;
        let total = Zip::from(predictions)
            .and(labels)
            .fold(0.0, |acc, &p, &y| {
                acc - (fn_weight * y * (p + EPSILON).ln()
                    + fp_weight * (1.0 - y) * (1.0 - p + EPSILON).ln())
            });

        Ok(total / predictions.nrows() as f64)
    }

    fn name(&self) -> &'static str {
        "weighted_cross_entropy"
    }
}

/// Plain per-class binary cross entropy, the unweighted special case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossEntropyLoss;

impl Loss for CrossEntropyLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        _positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;

        let total = Zip::from(predictions)
            .and(labels)
            .fold(0.0, |acc, &p, &y| {
                acc - (y * (p + EPSILON).ln() + (1.0 - y) * (1.0 - p + EPSILON).ln())
            });

        Ok(total / predictions.nrows() as f64)
    }

    fn name(&self) -> &'static str {
        "cross_entropy"
    }
}
