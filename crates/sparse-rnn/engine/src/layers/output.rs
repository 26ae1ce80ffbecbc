// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output layer: dense identity against the final layer, never elided

use sparse_rnn_neural::{NeuronAddress, OutputNeuron};
use tracing::warn;

use super::{retain_slots, GraphLayer};

#[derive(Debug, Clone)]
pub struct OutputLayer {
    neurons: Vec<Option<OutputNeuron>>,
}

impl OutputLayer {
    pub fn new(output_dim: usize, prev: &dyn GraphLayer) -> Self {
        let neurons = (0..output_dim)
            .map(|index| {
                let source = prev.neuron(index);
                if source.is_none() {
                    warn!(
                        target: "sparse-rnn-engine",
                        "No upstream neuron for output neuron {}; output will read 0",
                        index
                    );
                }
                Some(OutputNeuron::new(index, source))
            })
            .collect();
        Self { neurons }
    }

    pub fn from_slots(neurons: Vec<Option<OutputNeuron>>) -> Self {
        Self { neurons }
    }

    pub fn neurons(&self) -> &[Option<OutputNeuron>] {
        &self.neurons
    }

    pub fn neuron_at(&self, slot: usize) -> Option<&OutputNeuron> {
        self.neurons.get(slot).and_then(Option::as_ref)
    }

    pub fn reset(&mut self) {
        self.advance_sequence();
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(NeuronAddress) -> bool) -> usize {
        retain_slots(&mut self.neurons, NeuronAddress::Output, keep)
    }
}

impl GraphLayer for OutputLayer {
    fn output_dim(&self) -> usize {
        self.neurons.len()
    }

    fn neuron(&self, index: usize) -> Option<NeuronAddress> {
        self.neuron_at(index).map(|_| NeuronAddress::Output(index))
    }

    fn advance_sequence(&mut self) {
        for neuron in self.neurons.iter().flatten() {
            neuron.clear_cache();
        }
    }
}
