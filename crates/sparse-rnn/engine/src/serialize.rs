// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conversion between [`RnnGraph`] and its serialized form
//!
//! Weights serialize as `(weight, index)` pairs, where `index` is the dense
//! input position. Deserialization is two-pass: all neurons of a layer are
//! created first, then every index is resolved against the previous layer
//! (`index < prev_dim`) or the same cell's state neurons.

use sparse_rnn_neural::{
    GraphError, InputNeuron, NeuronAddress, OutputNeuron, Result, SparseNeuron, SparseWeight,
    StateNeuron,
};
use sparse_rnn_serialization::{
    SerializedCell, SerializedInputLayer, SerializedOutputLayer, SerializedPostLayer,
    SerializedRnnGraph, SerializedSparseNeuron, SerializedSparseWeight,
};

use crate::compiler::last_layer;
use crate::graph::RnnGraph;
use crate::layers::{CellLayer, GraphLayer, InputLayer, OutputLayer, PostLayer};

fn serialize_weights(weights: &[SparseWeight]) -> Vec<SerializedSparseWeight> {
    weights
        .iter()
        .map(|w| SerializedSparseWeight {
            weight: w.weight,
            index: w.index,
        })
        .collect()
}

fn serialize_sparse(neuron: &SparseNeuron) -> SerializedSparseNeuron {
    SerializedSparseNeuron {
        weights: serialize_weights(&neuron.weights),
        bias: neuron.bias,
        name: neuron.name.clone(),
        activation: neuron.activation(),
    }
}

fn serialize_state(neuron: &StateNeuron) -> SerializedSparseNeuron {
    SerializedSparseNeuron {
        weights: serialize_weights(&neuron.neuron().weights),
        bias: neuron.initial_state,
        name: neuron.name().to_string(),
        activation: neuron.neuron().activation(),
    }
}

impl RnnGraph {
    pub fn serialize(&self) -> SerializedRnnGraph {
        let input_layer = SerializedInputLayer {
            neurons: self
                .input_layer
                .neurons()
                .iter()
                .map(|n| {
                    n.as_ref().map(|n| SerializedSparseNeuron {
                        weights: Vec::new(),
                        bias: 0.0,
                        name: n.name.clone(),
                        activation: Default::default(),
                    })
                })
                .collect(),
        };

        let cells = self
            .cells
            .iter()
            .map(|cell| SerializedCell {
                output_neurons: serialize_slots(cell.output_neurons(), serialize_sparse),
                recurrent_neurons: serialize_slots(cell.recurrent_neurons(), serialize_sparse),
                state_neurons: serialize_slots(cell.state_neurons(), serialize_state),
                output_dim: cell.output_dim(),
            })
            .collect();

        let post_layers = self
            .post_layers
            .iter()
            .map(|layer| SerializedPostLayer {
                neurons: serialize_slots(layer.neurons(), serialize_sparse),
                output_dim: layer.output_dim(),
            })
            .collect();

        let outputs = SerializedOutputLayer {
            neurons: serialize_slots(self.outputs.neurons(), |n: &OutputNeuron| {
                serialize_sparse(n.neuron())
            }),
        };

        SerializedRnnGraph {
            input_layer,
            cells,
            post_layers,
            outputs,
        }
    }

    /// Rebuilds a graph from its serialized form. A weight index with no
    /// neuron behind it is a [`GraphError::Reference`].
    pub fn deserialize(serialized: &SerializedRnnGraph) -> Result<Self> {
        let input_layer = InputLayer::from_slots(
            serialized
                .input_layer
                .neurons
                .iter()
                .enumerate()
                .map(|(index, n)| {
                    n.as_ref().map(|n| InputNeuron {
                        index,
                        name: n.name.clone(),
                    })
                })
                .collect(),
        );

        let mut cells: Vec<CellLayer> = Vec::with_capacity(serialized.cells.len());
        for (layer_ix, cell) in serialized.cells.iter().enumerate() {
            let prev = last_layer(&input_layer, &cells, &[]);
            let layer = deserialize_cell(layer_ix, cell, prev)?;
            cells.push(layer);
        }

        let mut post_layers: Vec<PostLayer> = Vec::with_capacity(serialized.post_layers.len());
        for (layer_ix, layer) in serialized.post_layers.iter().enumerate() {
            let prev = last_layer(&input_layer, &cells, &post_layers);
            let neurons = layer
                .neurons
                .iter()
                .map(|n| {
                    n.as_ref()
                        .map(|n| -> Result<SparseNeuron> {
                            let mut neuron = empty_sparse(n);
                            for w in &n.weights {
                                let source = prev.neuron(w.index).ok_or_else(|| {
                                    reference_error(&n.name, w.index)
                                })?;
                                neuron.push_weight(w.weight, w.index, source);
                            }
                            Ok(neuron)
                        })
                        .transpose()
                })
                .collect::<Result<Vec<_>>>()?;
            post_layers.push(PostLayer::from_parts(layer_ix, layer.output_dim, neurons));
        }

        let prev = last_layer(&input_layer, &cells, &post_layers);
        let outputs = OutputLayer::from_slots(
            serialized
                .outputs
                .neurons
                .iter()
                .enumerate()
                .map(|(index, n)| {
                    n.as_ref()
                        .map(|n| -> Result<OutputNeuron> {
                            // An output forwards the same slot of the last layer
                            if let Some(w) = n.weights.iter().find(|w| w.index != index) {
                                return Err(reference_error(&n.name, w.index));
                            }
                            let source = match n.weights.first() {
                                Some(w) => Some(
                                    prev.neuron(w.index)
                                        .ok_or_else(|| reference_error(&n.name, w.index))?,
                                ),
                                None => None,
                            };
                            let mut neuron = OutputNeuron::new(index, source);
                            neuron.set_name(n.name.clone());
                            Ok(neuron)
                        })
                        .transpose()
                })
                .collect::<Result<Vec<_>>>()?,
        );

        RnnGraph::new(input_layer, cells, post_layers, outputs)
    }
}

fn serialize_slots<T>(
    slots: &[Option<T>],
    f: impl Fn(&T) -> SerializedSparseNeuron,
) -> Vec<Option<SerializedSparseNeuron>> {
    slots.iter().map(|n| n.as_ref().map(&f)).collect()
}

fn empty_sparse(n: &SerializedSparseNeuron) -> SparseNeuron {
    SparseNeuron::new(Vec::new(), n.bias, n.name.clone(), n.activation)
}

fn reference_error(name: &str, index: usize) -> GraphError {
    GraphError::Reference {
        neuron: name.to_string(),
        index,
    }
}

fn deserialize_cell(
    layer_ix: usize,
    cell: &SerializedCell,
    prev: &dyn GraphLayer,
) -> Result<CellLayer> {
    let prev_dim = prev.output_dim();

    // Pass 1: every neuron, no connections
    let mut state_neurons: Vec<Option<StateNeuron>> = cell
        .state_neurons
        .iter()
        .enumerate()
        .map(|(index, n)| {
            n.as_ref().map(|n| {
                let mut state = StateNeuron::new(layer_ix, index, n.bias);
                state.set_name(n.name.clone());
                state
            })
        })
        .collect();

    // Pass 2: resolve indices
    let resolve = |name: &str, index: usize| -> Result<NeuronAddress> {
        if index < prev_dim {
            return prev.neuron(index).ok_or_else(|| reference_error(name, index));
        }
        let state_ix = index - prev_dim;
        match cell.state_neurons.get(state_ix) {
            Some(Some(_)) => Ok(NeuronAddress::CellState {
                cell: layer_ix,
                slot: state_ix,
            }),
            _ => Err(reference_error(name, index)),
        }
    };
    let wire = |slots: &[Option<SerializedSparseNeuron>]| -> Result<Vec<Option<SparseNeuron>>> {
        slots
            .iter()
            .map(|n| {
                n.as_ref()
                    .map(|n| -> Result<SparseNeuron> {
                        let mut neuron = empty_sparse(n);
                        for w in &n.weights {
                            neuron.push_weight(w.weight, w.index, resolve(&n.name, w.index)?);
                        }
                        Ok(neuron)
                    })
                    .transpose()
            })
            .collect()
    };
    let output_neurons = wire(&cell.output_neurons)?;
    let recurrent_neurons = wire(&cell.recurrent_neurons)?;

    for (index, state) in state_neurons.iter_mut().enumerate() {
        let Some(state) = state else { continue };
        if recurrent_neurons.get(index).is_some_and(Option::is_some) {
            state.connect(
                index,
                NeuronAddress::CellRecurrent {
                    cell: layer_ix,
                    slot: index,
                },
            );
        }
    }

    Ok(CellLayer::from_parts(
        layer_ix,
        cell.output_dim,
        output_neurons,
        recurrent_neurons,
        state_neurons,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparse_rnn_neural::{Activation, GraphParams, RnnCellWeights};

    use crate::compile;

    fn mixed_cell() -> RnnCellWeights {
        // rows: [in0, in1, s0, s1]
        RnnCellWeights {
            initial_state: vec![1.0, -1.0],
            state_size: 2,
            output_size: 2,
            recurrent_tree_weights: vec![
                1.0, 0.0, //
                0.0, 1.0, //
                0.0, 1.0, //
                -1.0, 0.0,
            ],
            recurrent_tree_bias: None,
            output_tree_weights: vec![
                0.0, 0.0, //
                0.0, 0.0, //
                1.0, 0.0, //
                0.0, 2.0,
            ],
            output_tree_bias: Some(vec![0.0, 1.0]),
            output_activation: Activation::Linear,
            recurrent_activation: Activation::Tanh,
        }
    }

    #[test]
    fn test_state_initial_value_serialized_as_bias() {
        let graph = compile(2, 2, &[mixed_cell()], &[], &GraphParams::default()).unwrap();
        let serialized = graph.serialize();
        let states = &serialized.cells[0].state_neurons;
        assert_eq!(states[0].as_ref().unwrap().bias, 1.0);
        assert_eq!(states[1].as_ref().unwrap().bias, -1.0);
        assert_eq!(states[0].as_ref().unwrap().weights[0].index, 0);
    }

    #[test]
    fn test_round_trip_preserves_outputs() {
        let mut graph = compile(2, 2, &[mixed_cell()], &[], &GraphParams::default()).unwrap();
        let mut restored = RnnGraph::deserialize(&graph.serialize()).unwrap();

        let seq = vec![vec![1.0, -1.0], vec![0.5, 0.5], vec![-1.0, 2.0], vec![0.0, 0.0]];
        assert_eq!(graph.evaluate(&seq).unwrap(), restored.evaluate(&seq).unwrap());
        assert_eq!(restored.serialize(), graph.serialize());
    }

    #[test]
    fn test_dangling_index_is_reference_error() {
        let graph = compile(2, 2, &[mixed_cell()], &[], &GraphParams::default()).unwrap();
        let mut serialized = graph.serialize();
        let neuron = serialized.cells[0].output_neurons[0].as_mut().unwrap();
        neuron.weights[0].index = 9;

        let err = RnnGraph::deserialize(&serialized).unwrap_err();
        assert_eq!(
            err,
            GraphError::Reference {
                neuron: "layer_0_output_0".to_string(),
                index: 9
            }
        );
        assert!(!err.is_construction());
    }

    #[test]
    fn test_output_reading_another_slot_is_reference_error() {
        let graph = compile(2, 2, &[mixed_cell()], &[], &GraphParams::default()).unwrap();
        let mut serialized = graph.serialize();
        let neuron = serialized.outputs.neurons[0].as_mut().unwrap();
        neuron.weights[0].index = 1;

        let err = RnnGraph::deserialize(&serialized).unwrap_err();
        assert_eq!(
            err,
            GraphError::Reference {
                neuron: "output_0".to_string(),
                index: 1
            }
        );
    }

    #[test]
    fn test_state_without_recurrent_neuron_stays_constant() {
        // rows: [in0, s0]; the recurrent tree is all zeros and gets elided
        let cell = RnnCellWeights {
            initial_state: vec![2.0],
            state_size: 1,
            output_size: 1,
            recurrent_tree_weights: vec![0.0, 0.0],
            recurrent_tree_bias: None,
            output_tree_weights: vec![0.0, 1.0],
            output_tree_bias: None,
            output_activation: Activation::Linear,
            recurrent_activation: Activation::Linear,
        };
        let mut graph = compile(1, 1, &[cell], &[], &GraphParams::default()).unwrap();
        assert!(graph.cells[0].recurrent_neurons()[0].is_none());
        assert!(!graph.cells[0].state_neurons()[0].as_ref().unwrap().is_connected());

        let seq = vec![vec![1.0], vec![-3.0], vec![0.5], vec![0.0]];
        let expected = vec![vec![2.0]; 4];
        assert_eq!(graph.evaluate(&seq).unwrap(), expected);

        let serialized = graph.serialize();
        let mut restored = RnnGraph::deserialize(&serialized).unwrap();
        assert_eq!(restored.evaluate(&seq).unwrap(), expected);
        assert_eq!(restored.serialize(), serialized);
    }
}
