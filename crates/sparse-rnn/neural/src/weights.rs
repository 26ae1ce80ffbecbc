// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense weight tensors handed over by the training side
//!
//! Kernels are flat, row-major `[inputs, outputs]` arrays: the weight from
//! dense input `row` to neuron `col` lives at `row * outputs + col`.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// Weights of one recurrent cell
///
/// Both trees read the concatenation `[previous layer outputs, state]`, so
/// both kernels have `prev_dim + state_size` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RnnCellWeights {
    pub initial_state: Vec<f32>,
    pub state_size: usize,
    pub output_size: usize,
    /// Shape `[prev_dim + state_size, state_size]`
    pub recurrent_tree_weights: Vec<f32>,
    #[serde(default)]
    pub recurrent_tree_bias: Option<Vec<f32>>,
    /// Shape `[prev_dim + state_size, output_size]`
    pub output_tree_weights: Vec<f32>,
    #[serde(default)]
    pub output_tree_bias: Option<Vec<f32>>,
    pub output_activation: Activation,
    pub recurrent_activation: Activation,
}

/// Weights of one dense post-processing layer, shape `[input_dim, output_dim]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLayerWeights {
    pub input_dim: usize,
    pub output_dim: usize,
    pub weights: Vec<f32>,
    #[serde(default)]
    pub bias: Option<Vec<f32>>,
    pub activation: Activation,
}

/// Row-major flat offset of `(row, col)` in a kernel with `cols` columns
#[inline]
pub fn kernel_offset(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}
