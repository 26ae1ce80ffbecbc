// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Graph layers
//!
//! Every layer keeps its neurons in a hole-preserving slot array: a neuron
//! removed by elision or pruning leaves `None` behind, so the positional
//! index of every other neuron stays stable.
//!
//! ```text
//! InputLayer ──► CellLayer 0 ──► … ──► CellLayer N ──► PostLayer 0 ──► … ──► OutputLayer
//!                 │  ▲
//!                 ▼  │ (state loop, broken by StateNeuron)
//! ```

pub mod cell;
pub mod input;
pub mod output;
pub mod post;

pub use cell::CellLayer;
pub use input::InputLayer;
pub use output::OutputLayer;
pub use post::PostLayer;

use sparse_rnn_neural::NeuronAddress;

/// Uniform view of a layer as the upstream of the next one
pub trait GraphLayer {
    /// Width of the vector this layer exposes downstream, holes included
    fn output_dim(&self) -> usize;

    /// Address of the neuron producing downstream index `index`, or `None`
    /// if that slot is a hole
    fn neuron(&self, index: usize) -> Option<NeuronAddress>;

    /// Timestep boundary work local to this layer (clearing memoized
    /// outputs, consuming input)
    fn advance_sequence(&mut self);
}

/// Drops every occupied slot whose address `keep` rejects; returns how many
/// slots were emptied.
pub(crate) fn retain_slots<T>(
    slots: &mut [Option<T>],
    mut address_of: impl FnMut(usize) -> NeuronAddress,
    mut keep: impl FnMut(NeuronAddress) -> bool,
) -> usize {
    let mut removed = 0;
    for (slot, entry) in slots.iter_mut().enumerate() {
        if entry.is_some() && !keep(address_of(slot)) {
            *entry = None;
            removed += 1;
        }
    }
    removed
}
