// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense post-processing layer after the last cell

use sparse_rnn_neural::preprocess::preprocess;
use sparse_rnn_neural::weights::kernel_offset;
use sparse_rnn_neural::{
    GraphError, GraphParams, NeuronAddress, PostLayerWeights, Result, SparseNeuron,
};

use super::cell::{check_len, kernel_len};
use super::{retain_slots, GraphLayer};

#[derive(Debug, Clone)]
pub struct PostLayer {
    pub layer_ix: usize,
    output_dim: usize,
    neurons: Vec<Option<SparseNeuron>>,
}

impl PostLayer {
    pub fn from_parts(layer_ix: usize, output_dim: usize, neurons: Vec<Option<SparseNeuron>>) -> Self {
        Self {
            layer_ix,
            output_dim,
            neurons,
        }
    }

    pub fn from_weights(
        layer_ix: usize,
        weights: &PostLayerWeights,
        params: &GraphParams,
        prev: &dyn GraphLayer,
    ) -> Result<Self> {
        weights.activation.validate()?;

        if weights.input_dim != prev.output_dim() {
            return Err(GraphError::ShapeMismatch {
                tensor: format!("post_layer_{}.input_dim", layer_ix),
                expected: prev.output_dim(),
                actual: weights.input_dim,
            });
        }
        let cols = weights.output_dim;
        let tensor = format!("post_layer_{}.weights", layer_ix);
        let expected = kernel_len(&tensor, weights.input_dim, cols)?;
        check_len(tensor, expected, weights.weights.len())?;
        if let Some(bias) = &weights.bias {
            check_len(format!("post_layer_{}.bias", layer_ix), cols, bias.len())?;
        }

        let kernel = preprocess(&weights.weights, params);
        let bias = weights
            .bias
            .as_deref()
            .map(|b| preprocess(b, params))
            .unwrap_or_default();

        let neurons = (0..cols)
            .map(|col| {
                let mut neuron = SparseNeuron::new(
                    Vec::new(),
                    bias.get(col).copied().unwrap_or(0.0),
                    format!("post_layer_{}_output_{}", layer_ix, col),
                    weights.activation,
                );
                for row in 0..weights.input_dim {
                    let weight = kernel[kernel_offset(row, col, cols)];
                    if weight == 0.0 {
                        continue;
                    }
                    if let Some(source) = prev.neuron(row) {
                        neuron.push_weight(weight, row, source);
                    }
                }
                (!neuron.weights.is_empty() || neuron.bias != 0.0).then_some(neuron)
            })
            .collect();

        Ok(Self::from_parts(layer_ix, cols, neurons))
    }

    pub fn neurons(&self) -> &[Option<SparseNeuron>] {
        &self.neurons
    }

    pub fn reset(&mut self) {
        self.advance_sequence();
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(NeuronAddress) -> bool) -> usize {
        let layer = self.layer_ix;
        retain_slots(
            &mut self.neurons,
            |slot| NeuronAddress::Post { layer, slot },
            keep,
        )
    }
}

impl GraphLayer for PostLayer {
    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn neuron(&self, index: usize) -> Option<NeuronAddress> {
        self.neurons
            .get(index)
            .and_then(Option::as_ref)
            .map(|_| NeuronAddress::Post {
                layer: self.layer_ix,
                slot: index,
            })
    }

    fn advance_sequence(&mut self) {
        for neuron in self.neurons.iter().flatten() {
            neuron.clear_cache();
        }
    }
}
