// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense weight file exported by the training side
//!
//! ```json
//! {
//!   "input_dim": 2, "output_dim": 3,
//!   "cells": [{ "state_size": 1, "output_dim": 3,
//!               "output_kernel": [[..], ..], "output_bias": [..],
//!               "recurrent_kernel": [[..], ..], "recurrent_bias": [..],
//!               "initial_state": [..],
//!               "recurrent_activation": "tanh", "output_activation": "linear" }],
//!   "post_layers": [{ "input_dim": 3, "output_dim": 3,
//!                     "weights": [[..], ..], "bias": [..], "activation": "linear" }]
//! }
//! ```
//!
//! Kernels are `[inputs][outputs]` and get flattened row-major.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sparse_rnn_neural::{Activation, GraphError, PostLayerWeights, RnnCellWeights};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellWeightsEntry {
    pub state_size: usize,
    pub output_dim: usize,
    pub output_kernel: Vec<Vec<f32>>,
    #[serde(default)]
    pub output_bias: Option<Vec<f32>>,
    pub recurrent_kernel: Vec<Vec<f32>>,
    #[serde(default)]
    pub recurrent_bias: Option<Vec<f32>>,
    pub initial_state: Vec<f32>,
    #[serde(default)]
    pub recurrent_activation: Activation,
    #[serde(default)]
    pub output_activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLayerEntry {
    pub input_dim: usize,
    pub output_dim: usize,
    pub weights: Vec<Vec<f32>>,
    #[serde(default)]
    pub bias: Option<Vec<f32>>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsFile {
    pub input_dim: usize,
    pub output_dim: usize,
    #[serde(default)]
    pub cells: Vec<CellWeightsEntry>,
    #[serde(default)]
    pub post_layers: Vec<PostLayerEntry>,
}

impl WeightsFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Flattens every kernel into the compiler's tensor form
    pub fn cell_weights(&self) -> Result<Vec<RnnCellWeights>> {
        self.cells
            .iter()
            .enumerate()
            .map(|(ix, cell)| -> Result<RnnCellWeights> {
                Ok(RnnCellWeights {
                    initial_state: cell.initial_state.clone(),
                    state_size: cell.state_size,
                    output_size: cell.output_dim,
                    recurrent_tree_weights: flatten_kernel(
                        &format!("cells[{}].recurrent_kernel", ix),
                        &cell.recurrent_kernel,
                        cell.state_size,
                    )?,
                    recurrent_tree_bias: cell.recurrent_bias.clone(),
                    output_tree_weights: flatten_kernel(
                        &format!("cells[{}].output_kernel", ix),
                        &cell.output_kernel,
                        cell.output_dim,
                    )?,
                    output_tree_bias: cell.output_bias.clone(),
                    output_activation: cell.output_activation,
                    recurrent_activation: cell.recurrent_activation,
                })
            })
            .collect()
    }

    pub fn post_layer_weights(&self) -> Result<Vec<PostLayerWeights>> {
        self.post_layers
            .iter()
            .enumerate()
            .map(|(ix, layer)| -> Result<PostLayerWeights> {
                Ok(PostLayerWeights {
                    input_dim: layer.input_dim,
                    output_dim: layer.output_dim,
                    weights: flatten_kernel(
                        &format!("post_layers[{}].weights", ix),
                        &layer.weights,
                        layer.output_dim,
                    )?,
                    bias: layer.bias.clone(),
                    activation: layer.activation,
                })
            })
            .collect()
    }
}

/// Row-major flatten; every row must have exactly `cols` entries
pub fn flatten_kernel(tensor: &str, rows: &[Vec<f32>], cols: usize) -> Result<Vec<f32>> {
    let mut flat = Vec::with_capacity(rows.len() * cols);
    for (row_ix, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(GraphError::ShapeMismatch {
                tensor: format!("{}[{}]", tensor, row_ix),
                expected: cols,
                actual: row.len(),
            }
            .into());
        }
        flat.extend_from_slice(row);
    }
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SerializationError;

    const TWO_IN_THREE_OUT: &str = r#"{
        "input_dim": 2,
        "output_dim": 3,
        "cells": [{
            "state_size": 1,
            "output_dim": 3,
            "output_kernel": [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 0.0]],
            "output_bias": [0.0, 0.0, -1.0009],
            "recurrent_kernel": [[0.05], [0.0], [0.0]],
            "recurrent_bias": [0.0],
            "initial_state": [0.0],
            "recurrent_activation": "tanh",
            "output_activation": "linear"
        }]
    }"#;

    #[test]
    fn test_flattens_row_major() {
        let file = WeightsFile::from_json(TWO_IN_THREE_OUT).unwrap();
        let cells = file.cell_weights().unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].output_tree_weights.len(), 9);
        assert_eq!(cells[0].output_tree_weights[4], -1.0);
        assert_eq!(cells[0].recurrent_activation, Activation::Tanh);
        assert!(file.post_layer_weights().unwrap().is_empty());
    }

    #[test]
    fn test_ragged_kernel_is_shape_error() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = flatten_kernel("k", &rows, 2).unwrap_err();
        assert!(matches!(
            err,
            SerializationError::Graph(GraphError::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }
}
