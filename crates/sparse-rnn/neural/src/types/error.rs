// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for graph construction and evaluation

use super::address::NeuronAddress;

/// Fatal conditions raised while building or stepping a graph.
///
/// Construction and reference errors need different remediation (fix the
/// weight data vs. fix serialization compatibility), so they stay distinct.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Shape mismatch for {tensor}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        tensor: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unexpected initial state length for layer {layer_ix}; expected={expected} actual={actual}")]
    InitialStateLength {
        layer_ix: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid activation: {0}")]
    InvalidActivation(String),

    #[error("Dependency cycle that does not pass through a state neuron: {0}")]
    CycleWithoutState(String),

    #[error("No source neuron for neuron {neuron} with index {index}")]
    Reference { neuron: String, index: usize },

    #[error("Input sequence is empty; neuron {0} was read past the end of the sequence")]
    SequenceExhausted(String),

    #[error("Input sequence is missing index {index} (vector has {len} entries)")]
    MissingInputIndex { index: usize, len: usize },

    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronAddress),
}

impl GraphError {
    /// True for errors caused by malformed weight data at compile time
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            GraphError::Construction(_)
                | GraphError::ShapeMismatch { .. }
                | GraphError::InitialStateLength { .. }
                | GraphError::InvalidActivation(_)
                | GraphError::CycleWithoutState(_)
        )
    }
}

pub type Result<T> = core::result::Result<T, GraphError>;
pub type Error = GraphError;
