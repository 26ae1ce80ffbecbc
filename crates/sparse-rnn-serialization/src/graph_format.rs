// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serialized graph form
//!
//! Neuron lists are hole-preserving: a pruned slot is `null` in JSON so the
//! positional `index` carried by each weight stays meaningful.

use serde::{Deserialize, Serialize};
use sparse_rnn_neural::Activation;

/// One incoming connection, addressed by dense input position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedSparseWeight {
    pub weight: f32,
    pub index: usize,
}

/// Any neuron kind. State neurons store their initial state in `bias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedSparseNeuron {
    pub weights: Vec<SerializedSparseWeight>,
    pub bias: f32,
    pub name: String,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SerializedInputLayer {
    pub neurons: Vec<Option<SerializedSparseNeuron>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedCell {
    pub output_neurons: Vec<Option<SerializedSparseNeuron>>,
    pub recurrent_neurons: Vec<Option<SerializedSparseNeuron>>,
    pub state_neurons: Vec<Option<SerializedSparseNeuron>>,
    pub output_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPostLayer {
    pub neurons: Vec<Option<SerializedSparseNeuron>>,
    pub output_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SerializedOutputLayer {
    pub neurons: Vec<Option<SerializedSparseNeuron>>,
}

/// A complete compiled, pruned graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedRnnGraph {
    pub input_layer: SerializedInputLayer,
    pub cells: Vec<SerializedCell>,
    pub post_layers: Vec<SerializedPostLayer>,
    pub outputs: SerializedOutputLayer,
}

impl SerializedRnnGraph {
    /// Occupied slots across every layer
    pub fn neuron_count(&self) -> usize {
        fn live(neurons: &[Option<SerializedSparseNeuron>]) -> usize {
            neurons.iter().flatten().count()
        }
        live(&self.input_layer.neurons)
            + self
                .cells
                .iter()
                .map(|c| live(&c.output_neurons) + live(&c.recurrent_neurons) + live(&c.state_neurons))
                .sum::<usize>()
            + self.post_layers.iter().map(|p| live(&p.neurons)).sum::<usize>()
            + live(&self.outputs.neurons)
    }
}
