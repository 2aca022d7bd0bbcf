//! # MLL - Multi-Label Loss Library
//!
//! Scalar loss functions for training multi-label classifiers against a
//! fixed class vocabulary, built on `ndarray`.
//!
//! ## Features
//!
//! - **One contract**: every variant implements the [`Loss`](losses::Loss)
//!   trait and reduces a `[batch, num_classes]` score matrix to one scalar
//! - **Asymmetric costs**: weighted cross entropy prices false negatives
//!   and false positives independently
//! - **Ranking losses**: one-vs-rest and pairwise hinge margins for scores
//!   trained in [-1, +1]
//! - **Hard-negative mining**: a cosine hinge over learned class embeddings
//!   that upweights negative classes rivaling an example's own positives
//! - **Explicit configuration**: harness-wide settings travel in a
//!   serializable [`LossSettings`](config::LossSettings) value, and the
//!   stochastic resampling takes an explicit seed
//!
//! ## Quick Start
//!
//! ```rust
//! use mll::prelude::*;
//! use ndarray::array;
//!
//! # fn main() -> mll::Result<()> {
//! let predictions = array![[0.9, 0.1]];
//! let labels = array![[1.0, 0.0]];
//!
//! let loss = CrossEntropyLoss.calculate_loss(&predictions, None, &labels)?;
//! assert!(loss.is_finite() && loss >= 0.0);
//!
//! // Or select a variant by name and let settings drive construction.
//! let settings = LossSettings::new()
//!     .with_batch_size(1)?
//!     .with_num_classes(2)?;
//! let kind: LossKind = "CrossEntropyLoss".parse()?;
//! let same = mll::losses::calculate(kind, &settings, &predictions, None, &labels)?;
//! assert_eq!(loss, same);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Core modules
pub mod config;
pub mod losses;
pub mod utils;

// Error handling
pub mod error;

// Re-exports for convenience
pub use error::{LossError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::LossSettings;
    pub use crate::error::{LossError, Result};
    pub use crate::losses::{
        calculate, CosineHingeLoss, CrossEntropyLoss, HingeLoss, Loss, LossKind, RealHingeLoss,
        SoftmaxLoss, WeightedCrossEntropyLoss,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use ndarray::array;

    #[test]
    fn test_every_variant_produces_finite_loss() {
        let predictions = array![[0.7, 0.2], [0.1, 0.6]];
        let labels = array![[1.0, 0.0], [0.0, 1.0]];
        let positives = array![[0.9, 0.1], [0.2, 0.8]];

        let variants: Vec<Box<dyn Loss>> = vec![
            Box::new(WeightedCrossEntropyLoss::default()),
            Box::new(CrossEntropyLoss),
            Box::new(SoftmaxLoss),
            Box::new(HingeLoss::default()),
            Box::new(RealHingeLoss::default()),
            Box::new(CosineHingeLoss::default().with_seed(3)),
        ];

        for variant in &variants {
            let value = variant
                .calculate_loss(&predictions, Some(&positives), &labels)
                .unwrap();
            assert!(
                value.is_finite() && value >= 0.0,
                "{} produced {}",
                variant.name(),
                value
            );
        }
    }

    #[test]
    fn test_settings_driven_selection() {
        let settings = LossSettings::new()
            .with_batch_size(2)
            .unwrap()
            .with_num_classes(2)
            .unwrap();
        let predictions = array![[0.5, -0.5], [0.9, -0.2]];
        let labels = array![[1.0, 0.0], [1.0, 0.0]];

        let value = calculate(LossKind::Hinge, &settings, &predictions, None, &labels).unwrap();
        assert!(value >= 0.0);
    }
}
