//! Softmax loss over an L1-normalized label distribution.

use crate::error::Result;
use crate::losses::{check_batch_pair, Loss};
use crate::utils::log_softmax_rows;
use ndarray::Array2;

/// Guard for the label row sum so an all-zero row divides safely.
const EPSILON: f64 = 1e-8;

/// Softmax loss that treats each example's labels as a distribution.
///
/// Each label row is normalized to sum to one, the predictions are pushed
/// through a softmax across the class axis, and the loss is the negative
/// dot product of the normalized labels with the log activations. Unlike a
/// one-hot cross entropy this supports more than one positive label per
/// example: two positives each carry half the probability mass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftmaxLoss;

impl Loss for SoftmaxLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        _positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;

        let log_activations = log_softmax_rows(predictions);
        let mut total = 0.0;
        for (label_row, log_row) in labels.rows().into_iter().zip(log_activations.rows()) {
            let row_sum = label_row.sum().max(EPSILON);
            let row_loss: f64 = label_row
                .iter()
                .zip(log_row.iter())
                .map(|(&y, &log_p)| y / row_sum * log_p)
                .sum();
            total -= row_loss;
        }

        Ok(total / predictions.nrows() as f64)
    }

    fn name(&self) -> &'static str {
        "softmax"
    }
}
