//! Margin hinge losses.

use crate::error::{LossError, Result};
use crate::losses::{check_batch_pair, Loss};
use ndarray::{Array2, Zip};
use rayon::prelude::*;

/// One-vs-rest hinge on labels rescaled to {-1, +1}.
///
/// Predictions trained by this loss live in [-1, +1] rather than behaving
/// like probabilities. The subgradient at the hinge kink makes optimization
/// converge slower than a smooth loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HingeLoss {
    margin: f64,
}

impl HingeLoss {
    /// Create a hinge loss with the given margin. Must be non-negative
    /// and finite.
    pub fn new(margin: f64) -> Result<Self> {
        if !(margin >= 0.0 && margin.is_finite()) {
            return Err(LossError::invalid_parameter(
                "margin",
                &margin.to_string(),
                "must be non-negative and finite",
            ));
        }
        Ok(Self { margin })
    }

    /// The configured margin.
    pub fn margin(&self) -> f64 {
        self.margin
    }
}

impl Default for HingeLoss {
    fn default() -> Self {
        Self { margin: 1.0 }
    }
}

impl Loss for HingeLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        _positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;

        let margin = self.margin;
        let total = Zip::from(predictions)
            .and(labels)
            .fold(0.0, |acc, &p, &y| {
                let sign = 2.0 * y - 1.0;
                acc + (margin - sign * p).max(0.0)
            });

        Ok(total / predictions.nrows() as f64)
    }

    fn name(&self) -> &'static str {
        "hinge"
    }
}

/// Pairwise ranking hinge between positive and negative classes.
///
/// For every (positive class j, negative class k) pair within an example the
/// loss is `max(0, margin - pred[j] + pred[k])`: a positive class must
/// outscore every negative class by the margin. Examples whose labels are
/// all zero or all one have no such pairs and contribute nothing. The
/// per-example pair scan is quadratic in the vocabulary size, so rows are
/// processed in parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealHingeLoss {
    margin: f64,
}

impl RealHingeLoss {
    /// Create a ranking hinge loss with the given margin. Must be
    /// non-negative and finite.
    pub fn new(margin: f64) -> Result<Self> {
        if !(margin >= 0.0 && margin.is_finite()) {
            return Err(LossError::invalid_parameter(
                "margin",
                &margin.to_string(),
                "must be non-negative and finite",
            ));
        }
        Ok(Self { margin })
    }

    /// The configured margin.
    pub fn margin(&self) -> f64 {
        self.margin
    }
}

impl Default for RealHingeLoss {
    fn default() -> Self {
        Self { margin: 0.2 }
    }
}

impl Loss for RealHingeLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        _positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;

        let margin = self.margin;
        let total: f64 = (0..predictions.nrows())
            .into_par_iter()
            .map(|i| {
                let pred = predictions.row(i);
                let label = labels.row(i);
                let mut row_total = 0.0;
                for (j, &yj) in label.iter().enumerate() {
                    if yj == 0.0 {
                        continue;
                    }
                    for (k, &yk) in label.iter().enumerate() {
                        let weight = yj * (1.0 - yk);
                        if weight == 0.0 {
                            continue;
                        }
                        row_total += weight * (margin - pred[j] + pred[k]).max(0.0);
                    }
                }
                row_total
            })
            .sum();

        Ok(total / predictions.nrows() as f64)
    }

    fn name(&self) -> &'static str {
        "real_hinge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_hinge_exact_value() {
        let predictions = array![[0.5, -0.5]];
        let labels = array![[1.0, 0.0]];

        let loss = HingeLoss::default()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();

        // signs [1, -1]; max(0, 1 - 0.5) + max(0, 1 - 0.5) = 1.0
        assert_abs_diff_eq!(loss, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hinge_zero_at_margin_boundary() {
        let predictions = array![[1.0, -1.0]];
        let labels = array![[1.0, 0.0]];

        let loss = HingeLoss::default()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();
        assert_abs_diff_eq!(loss, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hinge_custom_margin() {
        let predictions = array![[0.4, -0.4]];
        let labels = array![[1.0, 0.0]];

        let loss = HingeLoss::new(0.5)
            .unwrap()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();

        // max(0, 0.5 - 0.4) per cell
        assert_abs_diff_eq!(loss, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_hinge_mean_over_batch() {
        let predictions = array![[0.5, -0.5], [1.0, -1.0]];
        let labels = array![[1.0, 0.0], [1.0, 0.0]];

        let loss = HingeLoss::default()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();

        // Rows contribute 1.0 and 0.0.
        assert_abs_diff_eq!(loss, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_real_hinge_exact_value() {
        let predictions = array![[0.8, 0.3]];
        let labels = array![[1.0, 0.0]];

        let loss = RealHingeLoss::new(0.6)
            .unwrap()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();

        // One (positive, negative) pair: max(0, 0.6 - 0.8 + 0.3)
        assert_abs_diff_eq!(loss, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_real_hinge_satisfied_margin_is_zero() {
        let predictions = array![[0.8, 0.3]];
        let labels = array![[1.0, 0.0]];

        let loss = RealHingeLoss::default()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();
        assert_abs_diff_eq!(loss, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_real_hinge_sums_all_pairs() {
        let predictions = array![[0.9, 0.2, 0.5]];
        let labels = array![[1.0, 0.0, 1.0]];

        let loss = RealHingeLoss::new(0.5)
            .unwrap()
            .calculate_loss(&predictions, None, &labels)
            .unwrap();

        // Pairs (0,1) and (2,1): max(0, 0.5 - 0.7) + max(0, 0.5 - 0.3)
        assert_abs_diff_eq!(loss, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_real_hinge_rows_without_pairs_contribute_zero() {
        let predictions = array![[0.9, 0.2], [0.1, 0.4]];
        let all_zero = array![[0.0, 0.0], [0.0, 0.0]];
        let all_one = array![[1.0, 1.0], [1.0, 1.0]];

        let zero_loss = RealHingeLoss::default()
            .calculate_loss(&predictions, None, &all_zero)
            .unwrap();
        let one_loss = RealHingeLoss::default()
            .calculate_loss(&predictions, None, &all_one)
            .unwrap();

        assert_abs_diff_eq!(zero_loss, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(one_loss, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_margin_rejected() {
        assert!(matches!(
            HingeLoss::new(-1.0),
            Err(LossError::InvalidParameter { .. })
        ));
        assert!(matches!(
            RealHingeLoss::new(f64::NAN),
            Err(LossError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let predictions = array![[0.5, -0.5]];
        let labels = array![[1.0]];

        let result = HingeLoss::default().calculate_loss(&predictions, None, &labels);
        assert!(matches!(result, Err(LossError::DimensionMismatch { .. })));
    }
}
