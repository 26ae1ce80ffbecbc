// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Weight clipping and quantization
//!
//! Pure functions applied to every flat weight/bias tensor before a graph is
//! built. Clipping is what makes the compiled graph sparse.

use serde::{Deserialize, Serialize};

/// Default magnitude at or below which a weight is forced to zero
pub const DEFAULT_CLIP_THRESHOLD: f32 = 0.1;

/// Default quantization grid
pub const DEFAULT_QUANTIZATION_INTERVAL: f32 = 1.0;

/// Graph compilation hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphParams {
    pub clip_threshold: f32,
    /// Weights are quantized to the nearest multiple of `quantization_interval`;
    /// zero disables quantization.
    pub quantization_interval: f32,
}

impl GraphParams {
    pub fn with_values(clip_threshold: f32, quantization_interval: f32) -> Self {
        Self {
            clip_threshold,
            quantization_interval,
        }
    }
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            clip_threshold: DEFAULT_CLIP_THRESHOLD,
            quantization_interval: DEFAULT_QUANTIZATION_INTERVAL,
        }
    }
}

/// Clip then quantize a single weight
///
/// # Example
/// ```
/// use sparse_rnn_neural::preprocess::clip_and_quantize_weight;
///
/// assert_eq!(clip_and_quantize_weight(0.05, 0.1, 1.0), 0.0);
/// assert_eq!(clip_and_quantize_weight(-0.998, 0.1, 1.0), -1.0);
/// assert_eq!(clip_and_quantize_weight(0.74, 0.1, 0.5), 0.5);
/// ```
#[inline]
pub fn clip_and_quantize_weight(
    weight: f32,
    clip_threshold: f32,
    quantization_interval: f32,
) -> f32 {
    if weight.abs() <= clip_threshold {
        return 0.0;
    }
    if quantization_interval > 0.0 {
        (weight / quantization_interval).round() * quantization_interval
    } else {
        weight
    }
}

/// Sets weights to 0 if their magnitude is less than or equal to `clip_threshold`,
/// then snaps the survivors to the quantization grid.
pub fn clip_and_quantize(
    weights: &[f32],
    clip_threshold: f32,
    quantization_interval: f32,
) -> Vec<f32> {
    weights
        .iter()
        .map(|&w| clip_and_quantize_weight(w, clip_threshold, quantization_interval))
        .collect()
}

/// `clip_and_quantize` with the thresholds taken from `params`
pub fn preprocess(weights: &[f32], params: &GraphParams) -> Vec<f32> {
    clip_and_quantize(weights, params.clip_threshold, params.quantization_interval)
}
