//! Numeric utility functions shared by the loss implementations.

use ndarray::Array2;

/// Floor applied to row norms so that all-zero rows normalize to zero
/// instead of dividing by zero.
const NORM_FLOOR: f64 = 1e-12;

/// L2-normalize each row of a matrix.
///
/// Rows whose norm falls below the floor are returned unchanged (an all-zero
/// row stays all-zero).
pub fn l2_normalize_rows(matrix: &Array2<f64>) -> Array2<f64> {
    let mut normalized = matrix.to_owned();
    for mut row in normalized.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt().max(NORM_FLOOR);
        row.mapv_inplace(|v| v / norm);
    }
    normalized
}

/// Row-wise log-softmax with max-subtraction for numerical stability.
///
/// Equivalent to `ln(softmax(row))` without the underflow of exponentiating
/// large-magnitude scores first.
pub fn log_softmax_rows(matrix: &Array2<f64>) -> Array2<f64> {
    let mut out = matrix.to_owned();
    for mut row in out.rows_mut() {
        let max = row.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| v - max);
        let log_sum = row.iter().map(|v| v.exp()).sum::<f64>().ln();
        row.mapv_inplace(|v| v - log_sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_l2_normalize_rows_unit_norm() {
        let matrix = array![[3.0, 4.0], [0.6, 0.8]];
        let normalized = l2_normalize_rows(&matrix);

        for row in normalized.rows() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(normalized[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(normalized[[0, 1]], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_l2_normalize_zero_row() {
        let matrix = array![[0.0, 0.0, 0.0]];
        let normalized = l2_normalize_rows(&matrix);
        assert!(normalized.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_log_softmax_rows() {
        let matrix = array![[2.0, 1.0, 0.0]];
        let log_probs = log_softmax_rows(&matrix);

        // Probabilities recovered from log-space must sum to one.
        let total: f64 = log_probs.iter().map(|v| v.exp()).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);

        let z = (2.0_f64.exp() + 1.0_f64.exp() + 1.0).ln();
        assert_abs_diff_eq!(log_probs[[0, 0]], 2.0 - z, epsilon = 1e-12);
    }

    #[test]
    fn test_log_softmax_large_scores() {
        let matrix = array![[1000.0, 999.0]];
        let log_probs = log_softmax_rows(&matrix);
        assert!(log_probs.iter().all(|v| v.is_finite()));
    }
}
