// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reachability pruning
//!
//! Walks backward from every output neuron that has a weight. A neuron not
//! transitively referenced from one of those outputs can never influence a
//! result and its slot is emptied.

use ahash::{AHashMap, AHashSet};
use sparse_rnn_neural::NeuronAddress;
use tracing::debug;

use crate::graph::RnnGraph;

impl RnnGraph {
    /// Removes unreachable neurons and rebuilds the name index. Returns the
    /// number of slots emptied; a second call returns 0.
    pub fn prune_unconnected_neurons(&mut self) -> usize {
        let mut reachable: AHashSet<NeuronAddress> = AHashSet::new();
        let mut by_name: AHashMap<String, NeuronAddress> = AHashMap::new();

        let mut stack: Vec<NeuronAddress> = self
            .outputs
            .neurons()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_ref().is_some_and(|n| !n.neuron().weights.is_empty()))
            .map(|(slot, _)| NeuronAddress::Output(slot))
            .collect();

        while let Some(address) = stack.pop() {
            let Some(neuron) = self.neuron(address) else {
                continue;
            };
            if !reachable.insert(address) {
                continue;
            }
            by_name.insert(neuron.name().to_string(), address);
            stack.extend(neuron.weights().iter().map(|w| w.source));
        }

        let keep = |address: NeuronAddress| reachable.contains(&address);
        let mut removed = self.outputs.retain(keep);
        for cell in &mut self.cells {
            removed += cell.retain(keep);
        }
        for layer in &mut self.post_layers {
            removed += layer.retain(keep);
        }
        removed += self.input_layer.retain(keep);

        self.neuron_output_history
            .retain(|address, _| reachable.contains(address));
        self.reachable_neurons_by_name = by_name;

        if removed > 0 {
            debug!(
                target: "sparse-rnn-engine",
                "Pruned {} unreachable neurons; {} remain",
                removed,
                reachable.len()
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use sparse_rnn_neural::{Activation, GraphParams, NeuronAddress, RnnCellWeights};

    use crate::compile;

    #[test]
    fn test_unused_input_and_state_pruned() {
        // two inputs; only input_1 feeds the output, state has no reader
        let cell = RnnCellWeights {
            initial_state: vec![0.5],
            state_size: 1,
            output_size: 1,
            recurrent_tree_weights: vec![1.0, 0.0, 1.0],
            recurrent_tree_bias: None,
            output_tree_weights: vec![0.0, 2.0, 0.0],
            output_tree_bias: None,
            output_activation: Activation::Linear,
            recurrent_activation: Activation::Tanh,
        };
        let mut graph = compile(2, 1, &[cell], &[], &GraphParams::default()).unwrap();

        assert!(graph.neuron(NeuronAddress::Input(0)).is_none());
        assert!(graph.neuron(NeuronAddress::Input(1)).is_some());
        assert!(graph.cells()[0].state_neurons()[0].is_none());
        assert!(graph.cells()[0].recurrent_neurons()[0].is_none());
        assert_eq!(graph.reachable_neuron_count(), 3);

        assert_eq!(graph.prune_unconnected_neurons(), 0);
        assert_eq!(graph.reachable_neuron_count(), 3);
    }
}
