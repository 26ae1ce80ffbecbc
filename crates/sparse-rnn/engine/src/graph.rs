// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! The compiled graph: layer arenas plus address resolution

use ahash::AHashMap;
use sparse_rnn_neural::{
    GraphError, InputNeuron, NeuronAddress, NeuronSource, OutputNeuron, Result, SparseNeuron,
    SparseWeight, StateNeuron,
};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::info;

use crate::layers::{CellLayer, GraphLayer, InputLayer, OutputLayer, PostLayer};

/// Borrowed view of any neuron in the graph
#[derive(Debug, Clone, Copy)]
pub enum NeuronRef<'a> {
    Input(&'a InputNeuron),
    Sparse(&'a SparseNeuron),
    State(&'a StateNeuron),
    Output(&'a OutputNeuron),
}

impl<'a> NeuronRef<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            NeuronRef::Input(n) => &n.name,
            NeuronRef::Sparse(n) => &n.name,
            NeuronRef::State(n) => n.name(),
            NeuronRef::Output(n) => n.name(),
        }
    }

    pub fn weights(&self) -> &'a [SparseWeight] {
        match *self {
            NeuronRef::Input(_) => &[],
            NeuronRef::Sparse(n) => &n.weights,
            NeuronRef::State(n) => &n.neuron().weights,
            NeuronRef::Output(n) => &n.neuron().weights,
        }
    }
}

/// Compiled sparse RNN
///
/// Neurons live in per-layer slot arrays and refer to each other by
/// [`NeuronAddress`]. Memoized outputs use interior mutability, so a graph is
/// `!Sync` and meant to be driven from one thread.
#[derive(Debug, Clone)]
pub struct RnnGraph {
    pub(crate) input_layer: InputLayer,
    pub(crate) cells: Vec<CellLayer>,
    pub(crate) post_layers: Vec<PostLayer>,
    pub(crate) outputs: OutputLayer,
    pub(crate) reachable_neurons_by_name: AHashMap<String, NeuronAddress>,
    pub(crate) neuron_output_history: AHashMap<NeuronAddress, Vec<f32>>,
    pub(crate) history_enabled: bool,
    pub(crate) current_timestep: u64,
}

impl RnnGraph {
    /// Assembles a graph from wired layers, rejects any dependency cycle
    /// that skips a state neuron, then prunes unreachable neurons.
    pub fn new(
        input_layer: InputLayer,
        cells: Vec<CellLayer>,
        post_layers: Vec<PostLayer>,
        outputs: OutputLayer,
    ) -> Result<Self> {
        let mut graph = Self {
            input_layer,
            cells,
            post_layers,
            outputs,
            reachable_neurons_by_name: AHashMap::new(),
            neuron_output_history: AHashMap::new(),
            history_enabled: true,
            current_timestep: 0,
        };
        graph.check_acyclic()?;
        let removed = graph.prune_unconnected_neurons();
        info!(
            target: "sparse-rnn-engine",
            "✓ Graph ready: {} reachable neurons ({} pruned), {} cells, {} post layers",
            graph.reachable_neurons_by_name.len(),
            removed,
            graph.cells.len(),
            graph.post_layers.len()
        );
        Ok(graph)
    }

    pub fn input_dim(&self) -> usize {
        self.input_layer.output_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.outputs.output_dim()
    }

    pub fn input_layer(&self) -> &InputLayer {
        &self.input_layer
    }

    pub fn cells(&self) -> &[CellLayer] {
        &self.cells
    }

    pub fn post_layers(&self) -> &[PostLayer] {
        &self.post_layers
    }

    pub fn outputs(&self) -> &OutputLayer {
        &self.outputs
    }

    /// Resolves an address to the neuron occupying it
    pub fn neuron(&self, address: NeuronAddress) -> Option<NeuronRef<'_>> {
        match address {
            NeuronAddress::Input(slot) => self.input_layer.neuron_at(slot).map(NeuronRef::Input),
            NeuronAddress::CellOutput { cell, slot } => self
                .cells
                .get(cell)?
                .output_neurons()
                .get(slot)?
                .as_ref()
                .map(NeuronRef::Sparse),
            NeuronAddress::CellRecurrent { cell, slot } => self
                .cells
                .get(cell)?
                .recurrent_neurons()
                .get(slot)?
                .as_ref()
                .map(NeuronRef::Sparse),
            NeuronAddress::CellState { cell, slot } => self
                .cells
                .get(cell)?
                .state_neurons()
                .get(slot)?
                .as_ref()
                .map(NeuronRef::State),
            NeuronAddress::Post { layer, slot } => self
                .post_layers
                .get(layer)?
                .neurons()
                .get(slot)?
                .as_ref()
                .map(NeuronRef::Sparse),
            NeuronAddress::Output(slot) => self.outputs.neuron_at(slot).map(NeuronRef::Output),
        }
    }

    /// Addresses of every occupied slot, input layer first
    pub fn addresses(&self) -> Vec<NeuronAddress> {
        fn occupied<'a, T>(
            slots: &'a [Option<T>],
            address: impl Fn(usize) -> NeuronAddress + 'a,
        ) -> impl Iterator<Item = NeuronAddress> + 'a {
            slots
                .iter()
                .enumerate()
                .filter(|(_, n)| n.is_some())
                .map(move |(slot, _)| address(slot))
        }

        let mut addresses: Vec<NeuronAddress> =
            occupied(self.input_layer.neurons(), NeuronAddress::Input).collect();
        for cell in &self.cells {
            let c = cell.layer_ix;
            addresses.extend(occupied(cell.state_neurons(), move |slot| {
                NeuronAddress::CellState { cell: c, slot }
            }));
            addresses.extend(occupied(cell.recurrent_neurons(), move |slot| {
                NeuronAddress::CellRecurrent { cell: c, slot }
            }));
            addresses.extend(occupied(cell.output_neurons(), move |slot| {
                NeuronAddress::CellOutput { cell: c, slot }
            }));
        }
        for layer in &self.post_layers {
            let l = layer.layer_ix;
            addresses.extend(occupied(layer.neurons(), move |slot| NeuronAddress::Post {
                layer: l,
                slot,
            }));
        }
        addresses.extend(occupied(self.outputs.neurons(), NeuronAddress::Output));
        addresses
    }

    pub fn neuron_address_by_name(&self, name: &str) -> Option<NeuronAddress> {
        self.reachable_neurons_by_name.get(name).copied()
    }

    /// Names of all neurons that survived pruning
    pub fn reachable_neuron_names(&self) -> impl Iterator<Item = &str> {
        self.reachable_neurons_by_name.keys().map(String::as_str)
    }

    pub fn reachable_neuron_count(&self) -> usize {
        self.reachable_neurons_by_name.len()
    }

    /// Current output of a reachable neuron; `Ok(None)` for unknown names
    pub fn neuron_output_by_name(&self, name: &str) -> Result<Option<f32>> {
        match self.neuron_address_by_name(name) {
            Some(address) => self.neuron_output(address).map(Some),
            None => Ok(None),
        }
    }

    /// Every dependency cycle must pass through a state neuron, whose read
    /// returns the committed value without recursing.
    pub(crate) fn check_acyclic(&self) -> Result<()> {
        let mut dependencies: DiGraphMap<NeuronAddress, ()> = DiGraphMap::new();
        for address in self.addresses() {
            dependencies.add_node(address);
            if address.is_state() {
                continue;
            }
            if let Some(neuron) = self.neuron(address) {
                for weight in neuron.weights() {
                    dependencies.add_edge(address, weight.source, ());
                }
            }
        }

        toposort(&dependencies, None).map(|_| ()).map_err(|cycle| {
            let node = cycle.node_id();
            let name = self
                .neuron(node)
                .map_or_else(|| node.to_string(), |n| n.name().to_string());
            GraphError::CycleWithoutState(name)
        })
    }
}

impl NeuronSource for RnnGraph {
    fn neuron_output(&self, address: NeuronAddress) -> Result<f32> {
        match self
            .neuron(address)
            .ok_or(GraphError::NeuronNotFound(address))?
        {
            NeuronRef::Input(n) => n.get_output(self.input_layer.input_sequence()),
            NeuronRef::Sparse(n) => n.get_output(self),
            // committed value only; this is where recurrence stops
            NeuronRef::State(n) => Ok(n.get_output()),
            NeuronRef::Output(n) => n.get_output(self),
        }
    }
}
