// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Timestep evaluation
//!
//! ```text
//! reset(seq) ──► evaluate_one_timestep() ──► advance_sequence() ──┐
//!                        ▲                                        │
//!                        └────────────────────────────────────────┘
//! ```
//!
//! `advance_sequence` is the only place state changes. It runs four phases
//! in a fixed order:
//! 1. every cell, last cell first, computes pending state from the values
//!    memoized during this timestep
//! 2. memoized outputs are cleared (outputs, post layers, cells last to first)
//! 3. the input queue is popped
//! 4. every state neuron commits its pending state
//!
//! Step 4 never starts before step 1 has finished for every cell: a recurrent
//! neuron may read sibling state neurons whose old value must stay visible.

use sparse_rnn_neural::{NeuronAddress, NeuronSource, Result};
use tracing::trace;

use crate::graph::RnnGraph;
use crate::layers::GraphLayer;

impl RnnGraph {
    /// Restores initial states, clears memoized outputs and replaces the input
    /// queue. The output history restarts at timestep 0.
    pub fn reset(&mut self, new_input_seq: impl IntoIterator<Item = Vec<f32>>) -> Result<()> {
        for cell in &mut self.cells {
            cell.reset();
        }
        for layer in &mut self.post_layers {
            layer.reset();
        }
        self.outputs.reset();
        self.input_layer.set_input_sequence(new_input_seq);
        self.neuron_output_history.clear();
        self.current_timestep = 0;
        if self.input_layer.remaining() > 0 {
            self.record_history()?;
        }
        Ok(())
    }

    /// Appends an input vector to the queue without touching any state
    pub fn push_input(&mut self, input: Vec<f32>) {
        self.input_layer.push_input(input);
    }

    pub fn remaining_inputs(&self) -> usize {
        self.input_layer.remaining()
    }

    /// Pulls every output neuron for the current timestep. Dangling output
    /// slots read 0.
    pub fn evaluate_one_timestep(&self) -> Result<Vec<f32>> {
        (0..self.outputs.output_dim())
            .map(|slot| match self.outputs.neuron_at(slot) {
                Some(neuron) => neuron.get_output(self),
                None => Ok(0.0),
            })
            .collect()
    }

    /// Moves to the next timestep. An error raised while computing pending
    /// states leaves committed state, caches and the input queue untouched.
    pub fn advance_sequence(&mut self, next_input: Option<Vec<f32>>) -> Result<()> {
        for cell in self.cells.iter().rev() {
            cell.compute_new_states(self)?;
        }

        self.outputs.advance_sequence();
        for layer in &mut self.post_layers {
            layer.advance_sequence();
        }
        for cell in self.cells.iter_mut().rev() {
            cell.advance_sequence();
        }
        self.input_layer.advance_sequence();

        for cell in &mut self.cells {
            cell.commit_new_states();
        }

        self.current_timestep += 1;
        trace!(
            target: "sparse-rnn-engine",
            "Advanced to timestep {} ({} inputs queued)",
            self.current_timestep,
            self.input_layer.remaining()
        );

        if let Some(input) = next_input {
            self.input_layer.push_input(input);
            self.record_history()?;
        }
        Ok(())
    }

    /// Resets with `input_seq` and returns one output vector per timestep
    pub fn evaluate(&mut self, input_seq: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        self.reset(input_seq.iter().cloned())?;

        let mut outputs = Vec::with_capacity(input_seq.len());
        for _ in 0..input_seq.len() {
            outputs.push(self.evaluate_one_timestep()?);
            self.advance_sequence(None)?;
        }
        Ok(outputs)
    }

    pub fn current_timestep(&self) -> u64 {
        self.current_timestep
    }

    pub fn set_history_enabled(&mut self, enabled: bool) {
        self.history_enabled = enabled;
        if !enabled {
            self.neuron_output_history.clear();
        }
    }

    /// Recorded outputs of a reachable neuron, oldest first
    pub fn output_history(&self, name: &str) -> Option<&[f32]> {
        let address = self.neuron_address_by_name(name)?;
        self.neuron_output_history.get(&address).map(Vec::as_slice)
    }

    fn record_history(&mut self) -> Result<()> {
        if !self.history_enabled {
            return Ok(());
        }
        let mut samples: Vec<(NeuronAddress, f32)> =
            Vec::with_capacity(self.reachable_neurons_by_name.len());
        for &address in self.reachable_neurons_by_name.values() {
            samples.push((address, self.neuron_output(address)?));
        }
        for (address, output) in samples {
            self.neuron_output_history
                .entry(address)
                .or_default()
                .push(output);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sparse_rnn_neural::{Activation, GraphParams, GraphError, RnnCellWeights};

    use crate::compile;

    /// One input, one state: state' = state + input, output = state
    fn accumulator() -> crate::RnnGraph {
        let cell = RnnCellWeights {
            initial_state: vec![0.0],
            state_size: 1,
            output_size: 1,
            recurrent_tree_weights: vec![1.0, 1.0],
            recurrent_tree_bias: None,
            output_tree_weights: vec![0.0, 1.0],
            output_tree_bias: None,
            output_activation: Activation::Linear,
            recurrent_activation: Activation::Linear,
        };
        compile(1, 1, &[cell], &[], &GraphParams::default()).unwrap()
    }

    #[test]
    fn test_outputs_lag_state_by_one_step() {
        let mut graph = accumulator();
        let outputs = graph
            .evaluate(&[vec![1.0], vec![2.0], vec![3.0]])
            .unwrap();
        assert_eq!(outputs, vec![vec![0.0], vec![1.0], vec![3.0]]);
        assert_eq!(graph.current_timestep(), 3);
        assert_eq!(graph.cells()[0].state(), vec![6.0]);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut graph = accumulator();
        graph.evaluate(&[vec![5.0], vec![5.0]]).unwrap();
        graph.reset(vec![vec![1.0]]).unwrap();
        assert_eq!(graph.current_timestep(), 0);
        assert_eq!(graph.evaluate_one_timestep().unwrap(), vec![0.0]);
    }

    #[test]
    fn test_advance_past_end_is_exhaustion() {
        let mut graph = accumulator();
        graph.reset(vec![vec![1.0]]).unwrap();
        graph.evaluate_one_timestep().unwrap();
        graph.advance_sequence(None).unwrap();

        // recurrent neuron must read input_0, queue is empty
        let err = graph.advance_sequence(None).unwrap_err();
        assert_eq!(err, GraphError::SequenceExhausted("input_0".to_string()));
        // failed advance leaves committed state alone
        assert_eq!(graph.cells()[0].state(), vec![1.0]);
        assert_eq!(graph.current_timestep(), 1);
    }

    #[test]
    fn test_history_tracks_supplied_inputs() {
        let mut graph = accumulator();
        graph.reset(vec![vec![2.0]]).unwrap();
        graph.evaluate_one_timestep().unwrap();
        graph.advance_sequence(Some(vec![4.0])).unwrap();

        assert_eq!(graph.output_history("input_0"), Some(&[2.0, 4.0][..]));
        assert_eq!(graph.output_history("layer_0_state_0"), Some(&[0.0, 2.0][..]));
        assert_eq!(graph.output_history("missing"), None);
    }

    #[test]
    fn test_history_can_be_disabled() {
        let mut graph = accumulator();
        graph.set_history_enabled(false);
        graph.evaluate(&[vec![1.0]]).unwrap();
        assert_eq!(graph.output_history("input_0"), None);
    }
}
