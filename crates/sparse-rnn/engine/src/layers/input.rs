// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input layer: one neuron per input index plus the pending input sequence

use std::collections::VecDeque;

use sparse_rnn_neural::{InputNeuron, NeuronAddress};

use super::{retain_slots, GraphLayer};

#[derive(Debug, Clone)]
pub struct InputLayer {
    neurons: Vec<Option<InputNeuron>>,
    /// Front is the current timestep's input
    input_sequence: VecDeque<Vec<f32>>,
}

impl InputLayer {
    pub fn new(input_dim: usize) -> Self {
        Self {
            neurons: (0..input_dim).map(|i| Some(InputNeuron::new(i))).collect(),
            input_sequence: VecDeque::new(),
        }
    }

    /// Builds a layer from already-materialized slots (deserialization)
    pub fn from_slots(neurons: Vec<Option<InputNeuron>>) -> Self {
        Self {
            neurons,
            input_sequence: VecDeque::new(),
        }
    }

    pub fn neurons(&self) -> &[Option<InputNeuron>] {
        &self.neurons
    }

    pub fn neuron_at(&self, slot: usize) -> Option<&InputNeuron> {
        self.neurons.get(slot).and_then(Option::as_ref)
    }

    pub fn input_sequence(&self) -> &VecDeque<Vec<f32>> {
        &self.input_sequence
    }

    pub fn set_input_sequence(&mut self, sequence: impl IntoIterator<Item = Vec<f32>>) {
        self.input_sequence = sequence.into_iter().collect();
    }

    pub fn push_input(&mut self, input: Vec<f32>) {
        self.input_sequence.push_back(input);
    }

    pub fn remaining(&self) -> usize {
        self.input_sequence.len()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(NeuronAddress) -> bool) -> usize {
        retain_slots(&mut self.neurons, NeuronAddress::Input, keep)
    }
}

impl GraphLayer for InputLayer {
    fn output_dim(&self) -> usize {
        self.neurons.len()
    }

    fn neuron(&self, index: usize) -> Option<NeuronAddress> {
        self.neuron_at(index).map(|_| NeuronAddress::Input(index))
    }

    /// Consumes the current input vector
    fn advance_sequence(&mut self) {
        self.input_sequence.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_pops_front() {
        let mut layer = InputLayer::new(2);
        layer.set_input_sequence(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        layer.advance_sequence();
        assert_eq!(layer.remaining(), 1);
        assert_eq!(layer.input_sequence().front(), Some(&vec![3.0, 4.0]));
    }

    #[test]
    fn test_holes_keep_dimension() {
        let mut layer = InputLayer::new(3);
        layer.retain(|addr| addr != NeuronAddress::Input(1));
        assert_eq!(layer.output_dim(), 3);
        assert!(layer.neuron(1).is_none());
        assert_eq!(layer.neuron(2), Some(NeuronAddress::Input(2)));
    }
}
