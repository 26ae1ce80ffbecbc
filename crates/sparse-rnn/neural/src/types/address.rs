// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Arena addresses for neurons
//!
//! Neurons never hold pointers to each other. A connection stores the
//! address of its source neuron, which the owning graph resolves to the
//! slot in the corresponding layer array.

use core::fmt;

/// Stable, index-based address of a neuron inside a graph.
///
/// Slots are positions in hole-preserving layer arrays, so an address stays
/// valid after pruning as long as the addressed neuron itself survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NeuronAddress {
    /// Input layer, slot = index into the external input vector
    Input(usize),
    /// Output tree of a recurrent cell
    CellOutput { cell: usize, slot: usize },
    /// Recurrent tree of a recurrent cell (feeds the state update)
    CellRecurrent { cell: usize, slot: usize },
    /// Persistent state of a recurrent cell
    CellState { cell: usize, slot: usize },
    /// Post-processing layer
    Post { layer: usize, slot: usize },
    /// Graph output layer
    Output(usize),
}

impl NeuronAddress {
    pub fn slot(&self) -> usize {
        match *self {
            NeuronAddress::Input(slot) | NeuronAddress::Output(slot) => slot,
            NeuronAddress::CellOutput { slot, .. }
            | NeuronAddress::CellRecurrent { slot, .. }
            | NeuronAddress::CellState { slot, .. }
            | NeuronAddress::Post { slot, .. } => slot,
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, NeuronAddress::CellState { .. })
    }
}

impl fmt::Display for NeuronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeuronAddress::Input(slot) => write!(f, "input[{}]", slot),
            NeuronAddress::CellOutput { cell, slot } => write!(f, "cell{}.output[{}]", cell, slot),
            NeuronAddress::CellRecurrent { cell, slot } => {
                write!(f, "cell{}.recurrent[{}]", cell, slot)
            }
            NeuronAddress::CellState { cell, slot } => write!(f, "cell{}.state[{}]", cell, slot),
            NeuronAddress::Post { layer, slot } => write!(f, "post{}[{}]", layer, slot),
            NeuronAddress::Output(slot) => write!(f, "output[{}]", slot),
        }
    }
}
