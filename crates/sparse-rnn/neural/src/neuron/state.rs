// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! State neuron
//!
//! ```text
//! get_output()         -> committed            (never recurses; breaks cycles)
//! compute_new_state()  -> pending := Σ w · src  (committed untouched)
//! commit_new_state()   -> committed := pending
//! reset()              -> committed := initial
//! ```

use core::cell::Cell;

use super::{NeuronSource, SparseNeuron};
use crate::activation::Activation;
use crate::types::{NeuronAddress, Result};

/// Persistent scalar memory of a recurrent cell.
#[derive(Debug, Clone)]
pub struct StateNeuron {
    pub layer_ix: usize,
    pub index: usize,
    pub initial_state: f32,
    state: f32,
    /// New states are computed by pulling through the graph from the
    /// connected recurrent neurons, and every sibling must still see the old
    /// state while doing so. The value waits here until all cells have
    /// computed their next states.
    pending_new_state: Cell<f32>,
    neuron: SparseNeuron,
}

impl StateNeuron {
    /// An unconnected state neuron holds its initial state: the initial value
    /// doubles as the bias until [`StateNeuron::connect`] wires the recurrent
    /// input.
    pub fn new(layer_ix: usize, index: usize, initial_state: f32) -> Self {
        Self {
            layer_ix,
            index,
            initial_state,
            state: initial_state,
            pending_new_state: Cell::new(initial_state),
            neuron: SparseNeuron::new(
                Vec::new(),
                initial_state,
                format!("layer_{}_state_{}", layer_ix, index),
                Activation::Linear,
            ),
        }
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

    pub fn is_connected(&self) -> bool {
        !self.neuron.weights.is_empty()
    }

    /// Adds the recurrent connection. Called once the cell is fully populated
    /// so the recurrent neuron at `index` exists.
    pub fn connect(&mut self, index: usize, recurrent_neuron: NeuronAddress) {
        self.neuron.bias = 0.0;
        self.neuron.push_weight(1.0, index, recurrent_neuron);
    }

    #[inline]
    pub fn get_output(&self) -> f32 {
        self.state
    }

    pub fn pending_state(&self) -> f32 {
        self.pending_new_state.get()
    }

    /// Phase one of the state update
    pub fn compute_new_state<S: NeuronSource + ?Sized>(&self, source: &S) -> Result<()> {
        let new_state = self.neuron.weighted_output(source)?;
        self.pending_new_state.set(new_state);
        Ok(())
    }

    /// Phase two of the state update
    pub fn commit_new_state(&mut self) {
        self.state = self.pending_new_state.get();
    }

    pub fn reset(&mut self) {
        self.state = self.initial_state;
        self.pending_new_state.set(self.initial_state);
        self.neuron.clear_cache();
    }

    pub fn clear_cache(&self) {
        self.neuron.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphError;

    struct ConstSource(f32);

    impl NeuronSource for ConstSource {
        fn neuron_output(&self, address: NeuronAddress) -> Result<f32> {
            match address {
                NeuronAddress::CellRecurrent { .. } => Ok(self.0),
                other => Err(GraphError::NeuronNotFound(other)),
            }
        }
    }

    #[test]
    fn test_compute_does_not_touch_committed_state() {
        let mut neuron = StateNeuron::new(0, 0, -0.25);
        neuron.connect(0, NeuronAddress::CellRecurrent { cell: 0, slot: 0 });

        neuron.compute_new_state(&ConstSource(0.75)).unwrap();
        assert_eq!(neuron.get_output(), -0.25);
        assert_eq!(neuron.pending_state(), 0.75);

        neuron.commit_new_state();
        assert_eq!(neuron.get_output(), 0.75);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut neuron = StateNeuron::new(1, 2, 1.0);
        neuron.connect(2, NeuronAddress::CellRecurrent { cell: 1, slot: 2 });
        neuron.compute_new_state(&ConstSource(3.0)).unwrap();
        neuron.commit_new_state();
        neuron.reset();
        assert_eq!(neuron.get_output(), 1.0);
        assert_eq!(neuron.name(), "layer_1_state_2");
    }

    #[test]
    fn test_unconnected_state_holds_initial_value() {
        let mut neuron = StateNeuron::new(0, 0, 2.0);
        for _ in 0..3 {
            neuron.compute_new_state(&ConstSource(9.0)).unwrap();
            neuron.commit_new_state();
        }
        assert_eq!(neuron.get_output(), 2.0);
        assert!(!neuron.is_connected());
    }
}
