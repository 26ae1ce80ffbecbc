// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output neuron

use super::{NeuronSource, SparseNeuron};
use crate::activation::Activation;
use crate::types::{NeuronAddress, Result};

/// Identity pass-through of the neuron at the same index of the last layer.
///
/// Holds at most one weight (1.0) and never gains more.
#[derive(Debug, Clone)]
pub struct OutputNeuron {
    pub index: usize,
    neuron: SparseNeuron,
}

impl OutputNeuron {
    /// `source` is `None` when the upstream neuron was elided; the output
    /// then has no weights and is dropped by pruning.
    pub fn new(index: usize, source: Option<NeuronAddress>) -> Self {
        let mut neuron = SparseNeuron::new(
            Vec::new(),
            0.0,
            format!("output_{}", index),
            Activation::Linear,
        );
        if let Some(source) = source {
            neuron.push_weight(1.0, index, source);
        }
        Self { index, neuron }
    }

    pub fn name(&self) -> &str {
        &self.neuron.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.neuron.name = name.into();
    }

    pub fn neuron(&self) -> &SparseNeuron {
        &self.neuron
    }

    pub fn source(&self) -> Option<NeuronAddress> {
        self.neuron.weights.first().map(|w| w.source)
    }

    pub fn get_output<S: NeuronSource + ?Sized>(&self, source: &S) -> Result<f32> {
        self.neuron.get_output(source)
    }

    pub fn clear_cache(&self) {
        self.neuron.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_identity_weight() {
        let source = NeuronAddress::Post { layer: 0, slot: 2 };
        let neuron = OutputNeuron::new(2, Some(source));
        assert_eq!(neuron.name(), "output_2");
        assert_eq!(neuron.neuron().weights.len(), 1);
        assert_eq!(neuron.neuron().weights[0].weight, 1.0);
        assert_eq!(neuron.source(), Some(source));
    }

    #[test]
    fn test_unconnected_output_has_no_weights() {
        let neuron = OutputNeuron::new(0, None);
        assert!(neuron.neuron().weights.is_empty());
        assert!(neuron.source().is_none());
    }
}
