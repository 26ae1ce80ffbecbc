// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Recurrent cell layer
//!
//! A cell owns three slot arrays. Output and recurrent neurons read the dense
//! vector `[previous layer outputs, state]`; state neuron `i` reads recurrent
//! neuron `i` and holds the value across timesteps.

use sparse_rnn_neural::preprocess::preprocess;
use sparse_rnn_neural::weights::kernel_offset;
use sparse_rnn_neural::{
    Activation, GraphError, GraphParams, NeuronAddress, NeuronSource, Result, RnnCellWeights,
    SparseNeuron, StateNeuron,
};
use tracing::debug;

use super::{retain_slots, GraphLayer};

#[derive(Debug, Clone)]
pub struct CellLayer {
    pub layer_ix: usize,
    output_dim: usize,
    output_neurons: Vec<Option<SparseNeuron>>,
    recurrent_neurons: Vec<Option<SparseNeuron>>,
    state_neurons: Vec<Option<StateNeuron>>,
}

impl CellLayer {
    /// Assembles a cell from fully wired slot arrays
    pub fn from_parts(
        layer_ix: usize,
        output_dim: usize,
        output_neurons: Vec<Option<SparseNeuron>>,
        recurrent_neurons: Vec<Option<SparseNeuron>>,
        state_neurons: Vec<Option<StateNeuron>>,
    ) -> Self {
        Self {
            layer_ix,
            output_dim,
            output_neurons,
            recurrent_neurons,
            state_neurons,
        }
    }

    /// Compiles one cell from its dense weights against the previous layer.
    ///
    /// Weights below the clip threshold are dropped, the rest are quantized,
    /// and neurons left with no weights and a zero bias are elided.
    pub fn from_weights(
        layer_ix: usize,
        weights: &RnnCellWeights,
        params: &GraphParams,
        prev: &dyn GraphLayer,
    ) -> Result<Self> {
        weights.output_activation.validate()?;
        weights.recurrent_activation.validate()?;

        let prev_dim = prev.output_dim();
        let state_size = weights.state_size;
        let output_size = weights.output_size;
        let rows = prev_dim.checked_add(state_size).ok_or_else(|| {
            GraphError::Construction(format!(
                "layer_{} input rows {} + {} overflow",
                layer_ix, prev_dim, state_size
            ))
        })?;

        if weights.initial_state.len() != state_size {
            return Err(GraphError::InitialStateLength {
                layer_ix,
                expected: state_size,
                actual: weights.initial_state.len(),
            });
        }
        let tensor = format!("layer_{}.output_tree_weights", layer_ix);
        let expected = kernel_len(&tensor, rows, output_size)?;
        check_len(tensor, expected, weights.output_tree_weights.len())?;
        let tensor = format!("layer_{}.recurrent_tree_weights", layer_ix);
        let expected = kernel_len(&tensor, rows, state_size)?;
        check_len(tensor, expected, weights.recurrent_tree_weights.len())?;
        if let Some(bias) = &weights.output_tree_bias {
            check_len(
                format!("layer_{}.output_tree_bias", layer_ix),
                output_size,
                bias.len(),
            )?;
        }
        if let Some(bias) = &weights.recurrent_tree_bias {
            check_len(
                format!("layer_{}.recurrent_tree_bias", layer_ix),
                state_size,
                bias.len(),
            )?;
        }

        let output_kernel = preprocess(&weights.output_tree_weights, params);
        let output_bias = weights
            .output_tree_bias
            .as_deref()
            .map(|b| preprocess(b, params))
            .unwrap_or_default();
        let recurrent_kernel = preprocess(&weights.recurrent_tree_weights, params);
        let recurrent_bias = weights
            .recurrent_tree_bias
            .as_deref()
            .map(|b| preprocess(b, params))
            .unwrap_or_default();
        let initial_state = preprocess(&weights.initial_state, params);

        let mut wiring = CellWiring {
            layer_ix,
            prev,
            prev_dim,
            initial_state: &initial_state,
            state_neurons: vec![None; state_size],
        };

        let output_neurons = wiring.build_tree(TreeSpec {
            kernel: &output_kernel,
            bias: &output_bias,
            cols: output_size,
            activation: weights.output_activation,
            kind: "output",
        });
        let recurrent_neurons = wiring.build_tree(TreeSpec {
            kernel: &recurrent_kernel,
            bias: &recurrent_bias,
            cols: state_size,
            activation: weights.recurrent_activation,
            kind: "recurrent",
        });

        let mut state_neurons = wiring.state_neurons;
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

        let layer = Self::from_parts(
            layer_ix,
            output_size,
            output_neurons,
            recurrent_neurons,
            state_neurons,
        );
        debug!(
            target: "sparse-rnn-engine",
            "Compiled cell {}: {} output, {} recurrent, {} state neurons kept",
            layer_ix,
            layer.output_neurons().iter().flatten().count(),
            layer.recurrent_neurons().iter().flatten().count(),
            layer.state_neurons().iter().flatten().count(),
        );
        Ok(layer)
    }

    pub fn output_neurons(&self) -> &[Option<SparseNeuron>] {
        &self.output_neurons
    }

    pub fn recurrent_neurons(&self) -> &[Option<SparseNeuron>] {
        &self.recurrent_neurons
    }

    pub fn state_neurons(&self) -> &[Option<StateNeuron>] {
        &self.state_neurons
    }

    pub fn state_size(&self) -> usize {
        self.state_neurons.len().max(self.recurrent_neurons.len())
    }

    /// Committed state vector, holes reading as 0
    pub fn state(&self) -> Vec<f32> {
        self.state_neurons
            .iter()
            .map(|s| s.as_ref().map_or(0.0, StateNeuron::get_output))
            .collect()
    }

    /// Records the pending state of every state neuron without committing it
    pub fn compute_new_states<S: NeuronSource + ?Sized>(&self, source: &S) -> Result<()> {
        for state in self.state_neurons.iter().flatten() {
            state.compute_new_state(source)?;
        }
        Ok(())
    }

    pub fn commit_new_states(&mut self) {
        for state in self.state_neurons.iter_mut().flatten() {
            state.commit_new_state();
        }
    }

    pub fn reset(&mut self) {
        self.advance_sequence();
        for state in self.state_neurons.iter_mut().flatten() {
            state.reset();
        }
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(NeuronAddress) -> bool) -> usize {
        let cell = self.layer_ix;
        retain_slots(
            &mut self.output_neurons,
            |slot| NeuronAddress::CellOutput { cell, slot },
            &mut keep,
        ) + retain_slots(
            &mut self.recurrent_neurons,
            |slot| NeuronAddress::CellRecurrent { cell, slot },
            &mut keep,
        ) + retain_slots(
            &mut self.state_neurons,
            |slot| NeuronAddress::CellState { cell, slot },
            &mut keep,
        )
    }
}

impl GraphLayer for CellLayer {
    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn neuron(&self, index: usize) -> Option<NeuronAddress> {
        self.output_neurons
            .get(index)
            .and_then(Option::as_ref)
            .map(|_| NeuronAddress::CellOutput {
                cell: self.layer_ix,
                slot: index,
            })
    }

    fn advance_sequence(&mut self) {
        for neuron in self.recurrent_neurons.iter().flatten() {
            neuron.clear_cache();
        }
        for neuron in self.output_neurons.iter().flatten() {
            neuron.clear_cache();
        }
        for state in self.state_neurons.iter().flatten() {
            state.clear_cache();
        }
    }
}

/// `rows * cols` for a declared kernel shape, failing on overflow
pub(crate) fn kernel_len(tensor: &str, rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or_else(|| {
        GraphError::Construction(format!(
            "{}: declared shape {}x{} overflows",
            tensor, rows, cols
        ))
    })
}

pub(crate) fn check_len(tensor: String, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GraphError::ShapeMismatch {
            tensor,
            expected,
            actual,
        });
    }
    Ok(())
}

struct TreeSpec<'a> {
    kernel: &'a [f32],
    bias: &'a [f32],
    cols: usize,
    activation: Activation,
    kind: &'static str,
}

/// Compile-time scratch: resolves dense rows to sources and creates state
/// neurons on first reference.
struct CellWiring<'a> {
    layer_ix: usize,
    prev: &'a dyn GraphLayer,
    prev_dim: usize,
    initial_state: &'a [f32],
    state_neurons: Vec<Option<StateNeuron>>,
}

impl CellWiring<'_> {
    fn resolve_row(&mut self, row: usize) -> Option<NeuronAddress> {
        if row < self.prev_dim {
            return self.prev.neuron(row);
        }
        let state_ix = row - self.prev_dim;
        let slot = self.state_neurons.get_mut(state_ix)?;
        if slot.is_none() {
            let initial = self.initial_state.get(state_ix).copied().unwrap_or(0.0);
            *slot = Some(StateNeuron::new(self.layer_ix, state_ix, initial));
        }
        Some(NeuronAddress::CellState {
            cell: self.layer_ix,
            slot: state_ix,
        })
    }

    fn build_tree(&mut self, spec: TreeSpec<'_>) -> Vec<Option<SparseNeuron>> {
        let rows = self.prev_dim + self.state_neurons.len();
        (0..spec.cols)
            .map(|col| {
                let bias = spec.bias.get(col).copied().unwrap_or(0.0);
                let mut neuron = SparseNeuron::new(
                    Vec::new(),
                    bias,
                    format!("layer_{}_{}_{}", self.layer_ix, spec.kind, col),
                    spec.activation,
                );
                for row in 0..rows {
                    let weight = spec.kernel[kernel_offset(row, col, spec.cols)];
                    if weight == 0.0 {
                        continue;
                    }
                    if let Some(source) = self.resolve_row(row) {
                        neuron.push_weight(weight, row, source);
                    }
                }
                (!neuron.weights.is_empty() || neuron.bias != 0.0).then_some(neuron)
            })
            .collect()
    }
}
