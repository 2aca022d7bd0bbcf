//! Cosine similarity hinge with adaptive hard-negative mining.

use crate::error::{LossError, Result};
use crate::losses::{check_batch_pair, Loss};
use crate::utils::l2_normalize_rows;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_distr::{Distribution, Uniform};

/// Cosine hinge loss over learned class embeddings.
///
/// Predictions and class embeddings are compared in cosine space. For each
/// example the weakest similarity among its true classes marks the line
/// below which a negative class is harmless; negative classes scoring above
/// it are hard negatives that already rival the example's own positives.
/// The hinge compares every class similarity against the similarity to a
/// randomly resampled positive class, and hard negatives are weighted up by
/// `adaptive_weight` on top of the plain negative term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosineHingeLoss {
    margin: f64,
    adaptive_weight: f64,
    seed: Option<u64>,
}

impl CosineHingeLoss {
    /// Create a cosine hinge loss. The margin must be non-negative and
    /// finite; the adaptive weight must be finite, and any value at or
    /// below zero disables the hard-negative term.
    pub fn new(margin: f64, adaptive_weight: f64) -> Result<Self> {
        if !(margin >= 0.0 && margin.is_finite()) {
            return Err(LossError::invalid_parameter(
                "margin",
                &margin.to_string(),
                "must be non-negative and finite",
            ));
        }
        if !adaptive_weight.is_finite() {
            return Err(LossError::invalid_parameter(
                "adaptive_weight",
                &adaptive_weight.to_string(),
                "must be finite",
            ));
        }
        Ok(Self {
            margin,
            adaptive_weight,
            seed: None,
        })
    }

    /// Fix the seed of the resampling generator, making every evaluation
    /// through the [`Loss`] trait reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured margin.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// The configured hard-negative weight.
    pub fn adaptive_weight(&self) -> f64 {
        self.adaptive_weight
    }

    /// Cosine similarity of every example against every class embedding.
    ///
    /// Returns the full `[batch, num_classes]` similarity matrix without
    /// any loss reduction, for inference-time scoring.
    pub fn confidence(
        &self,
        predictions: &Array2<f64>,
        positives: &Array2<f64>,
    ) -> Result<Array2<f64>> {
        check_embeddings(predictions, positives)?;
        let norm_pred = l2_normalize_rows(predictions);
        let norm_pos = l2_normalize_rows(positives);
        Ok(norm_pred.dot(&norm_pos.t()))
    }

    /// Calculate the loss with a caller-supplied random source.
    pub fn calculate_loss_with_rng<R: Rng + ?Sized>(
        &self,
        predictions: &Array2<f64>,
        positives: &Array2<f64>,
        labels: &Array2<f64>,
        rng: &mut R,
    ) -> Result<f64> {
        check_batch_pair(predictions, labels)?;
        check_embeddings(predictions, positives)?;

        let (batch, num_classes) = predictions.dim();
        let norm_pred = l2_normalize_rows(predictions);
        let norm_pos = l2_normalize_rows(positives);
        let sim_pos = norm_pred.dot(&norm_pos.t());

        // Weakest true-class similarity per example. The shifted product
        // keeps unlabeled cells at zero, so the row minimum lands on the
        // worst labeled similarity, or 1.0 when the row has no labels.
        let mut min_sim = Array1::<f64>::zeros(batch);
        for i in 0..batch {
            let row_min = sim_pos
                .row(i)
                .iter()
                .zip(labels.row(i).iter())
                .map(|(&s, &y)| (s - 1.0) * y)
                .fold(f64::INFINITY, f64::min);
            min_sim[i] = row_min + 1.0;
        }

        // One resampled positive class per class slot, drawn the way the
        // positive index list tiles out to the vocabulary size: a slot
        // picks a uniform position in [0, num_classes) of the tiled list.
        let slot = Uniform::new(0, num_classes);
        let mut sampled = vec![0usize; batch * num_classes];
        for i in 0..batch {
            let positive_indices: Vec<usize> = labels
                .row(i)
                .iter()
                .enumerate()
                .filter(|(_, &y)| y > 0.0)
                .map(|(j, _)| j)
                .collect();
            if positive_indices.is_empty() {
                return Err(LossError::data(format!(
                    "example {} has no positive labels to resample",
                    i
                )));
            }
            for j in 0..num_classes {
                let pick = slot.sample(rng);
                sampled[i * num_classes + j] = positive_indices[pick % positive_indices.len()];
            }
        }

        let mut adaptive_total = 0.0;
        let mut origin_total = 0.0;
        let mut raw_total = 0.0;
        for i in 0..batch {
            for j in 0..num_classes {
                let y = labels[[i, j]];
                let reverse = 1.0 - y;
                let sim = sim_pos[[i, j]];
                let sim_sample = norm_pred
                    .row(i)
                    .dot(&norm_pos.row(sampled[i * num_classes + j]));
                let hinge = (sim - sim_sample + self.margin).max(0.0);
                raw_total += hinge;
                origin_total += hinge * reverse;
                if sim > min_sim[i] {
                    adaptive_total += hinge * reverse;
                }
            }
        }

        let batch_f = batch as f64;
        if self.adaptive_weight > 0.0 {
            Ok(self.adaptive_weight * adaptive_total / batch_f + origin_total / batch_f)
        } else {
            log::warn!("adaptive weight {} disables hard-negative mining; reducing the raw hinge instead", self.adaptive_weight);
            Ok(raw_total / batch_f)
        }
    }
}

impl Default for CosineHingeLoss {
    fn default() -> Self {
        Self {
            margin: 0.2,
            adaptive_weight: 5.0,
            seed: None,
        }
    }
}

impl Loss for CosineHingeLoss {
    fn calculate_loss(
        &self,
        predictions: &Array2<f64>,
        positives: Option<&Array2<f64>>,
        labels: &Array2<f64>,
    ) -> Result<f64> {
        let positives = positives
            .ok_or_else(|| LossError::data("cosine hinge loss requires class embeddings"))?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.calculate_loss_with_rng(predictions, positives, labels, &mut rng)
    }

    fn name(&self) -> &'static str {
        "cosine_hinge"
    }
}

/// Check that the embedding matrix covers the prediction vocabulary.
fn check_embeddings(predictions: &Array2<f64>, positives: &Array2<f64>) -> Result<()> {
    if positives.nrows() != predictions.ncols() {
        return Err(LossError::dimension_mismatch(
            format!("[{}, embed_dim]", predictions.ncols()),
            format!("[{}, {}]", positives.nrows(), positives.ncols()),
        ));
    }
    if positives.is_empty() || predictions.is_empty() {
        return Err(LossError::data(
            "predictions and class embeddings must be non-empty",
        ));
    }
    Ok(())
}
