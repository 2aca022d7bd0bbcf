//! Loss functions for multi-label classification
//!
//! This module provides the loss variants used to train a multi-label
//! classifier against a fixed class vocabulary, behind a single [`Loss`]
//! capability trait. Each variant reduces a batch of per-class prediction
//! scores and binary label indicators (plus, for the cosine variant, learned
//! class embeddings) to one scalar objective.

use crate::config::LossSettings;
use crate::error::{LossError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod cosine;
pub mod cross_entropy;
pub mod hinge;
pub mod softmax;

pub use cosine::CosineHingeLoss;
pub use cross_entropy::{CrossEntropyLoss, WeightedCrossEntropyLoss};
pub use hinge::{HingeLoss, RealHingeLoss};
pub use softmax::SoftmaxLoss;

/// Capability contract satisfied by every loss variant.
///
/// Implementors compute the average loss of the examples in a mini-batch:
/// `predictions` and `labels` are `[batch, num_classes]` matrices, and
/// `positives` carries the `[num_classes, embed_dim]` class embeddings for
/// variants that rank against them (all others ignore it).
pub trait Loss {
    /// Calculate the scalar loss for one mini-batch.
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64>;

    /// Get the name of the loss function.
    fn name(&self) -> &'static str;
}

/// Enumeration of the available loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    /// Cross entropy with asymmetric false-negative/false-positive costs
    WeightedCrossEntropy,
    /// Plain per-class binary cross entropy
    CrossEntropy,
    /// Softmax over classes against an L1-normalized label distribution
    Softmax,
    /// One-vs-rest margin hinge on {-1, +1} rescaled labels
    Hinge,
    /// Pairwise ranking hinge between positive and negative classes
    RealHinge,
    /// Cosine similarity hinge with adaptive hard-negative mining
    CosineHinge,
}

impl LossKind {
    /// Get the name of the loss function.
    pub fn name(&self) -> &'static str {
        match self {
            LossKind::WeightedCrossEntropy => "weighted_cross_entropy",
            LossKind::CrossEntropy => "cross_entropy",
            LossKind::Softmax => "softmax",
            LossKind::Hinge => "hinge",
            LossKind::RealHinge => "real_hinge",
            LossKind::CosineHinge => "cosine_hinge",
        }
    }

    /// Check whether this loss ranks predictions against class embeddings.
    pub fn requires_embeddings(&self) -> bool {
        matches!(self, LossKind::CosineHinge)
    }

    /// Construct the loss this kind names, taking parameter values from
    /// the given settings and defaults for everything else.
    pub fn build(&self, settings: &LossSettings) -> Result<Box<dyn Loss>> {
        settings.validate()?;
        Ok(match self {
            LossKind::WeightedCrossEntropy => {
                Box::new(WeightedCrossEntropyLoss::from_settings(settings)?)
            }
            LossKind::CrossEntropy => Box::new(CrossEntropyLoss),
            LossKind::Softmax => Box::new(SoftmaxLoss),
            LossKind::Hinge => Box::new(HingeLoss::default()),
            LossKind::RealHinge => Box::new(RealHingeLoss::default()),
            LossKind::CosineHinge => Box::new(CosineHingeLoss::default()),
        })
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for LossKind {
    fn default() -> Self {
        LossKind::CrossEntropy
    }
}

impl FromStr for LossKind {
    type Err = LossError;

    /// Parse a loss name. Accepts both the snake-case names reported by
    /// [`LossKind::name`] and the type-name spellings used in training
    /// harness configuration files (e.g. `CrossEntropyLoss`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weighted_cross_entropy" | "WeightedCrossEntropyLoss" => {
                Ok(LossKind::WeightedCrossEntropy)
            }
            "cross_entropy" | "CrossEntropyLoss" => Ok(LossKind::CrossEntropy),
            "softmax" | "SoftmaxLoss" => Ok(LossKind::Softmax),
            "hinge" | "HingeLoss" => Ok(LossKind::Hinge),
            "real_hinge" | "RealHingeLoss" => Ok(LossKind::RealHinge),
            "cosine_hinge" | "CosineHingeLoss" => Ok(LossKind::CosineHinge),
            other => Err(LossError::configuration(format!(
                "unknown loss function: {}",
                other
            ))),
        }
    }
}

/// Calculate a loss selected by kind, with settings-driven construction and
/// batch geometry checks.
///
/// This is the entry point a training loop calls once per step. On top of
/// the per-variant computation it verifies that `predictions` matches the
/// configured `[batch_size, num_classes]` geometry and rejects non-finite
/// results, so a diverging model surfaces as an error instead of a NaN
/// propagating into the optimizer.
pub fn calculate(
    kind: LossKind,
    settings: &LossSettings,
    predictions: &Array2<f64>,
    positives: Option<&Array2<f64>>,
    labels: &Array2<f64>,
) -> Result<f64> {
    settings.check_geometry(predictions)?;
    let loss = kind.build(settings)?;
    let value = loss.calculate_loss(predictions, positives, labels)?;
    if !value.is_finite() {
        return Err(LossError::numerical(format!(
            "{} loss is not finite: {}",
            kind, value
        )));
    }
    log::debug!(
        "{} loss over [{}, {}] batch: {}",
        kind,
        predictions.nrows(),
        predictions.ncols(),
        value
    );
    Ok(value)
}

/// Check that predictions and labels form a valid, non-empty batch pair.
pub(crate) fn check_batch_pair(predictions: &Array2<f64>, labels: &Array2<f64>) -> Result<()> {
    if predictions.dim() != labels.dim() {
        return Err(LossError::dimension_mismatch(
            format!("{:?}", predictions.dim()),
            format!("{:?}", labels.dim()),
        ));
    }
    if predictions.is_empty() {
        return Err(LossError::data("cannot compute loss on an empty batch"));
    }
    Ok(())
}
