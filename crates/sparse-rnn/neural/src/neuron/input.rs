// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input neuron

use std::collections::VecDeque;

use crate::types::{GraphError, Result};

/// Reads one index of the front vector of the input queue.
///
/// The queue belongs to the input layer and is passed in on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct InputNeuron {
    pub index: usize,
    pub name: String,
}

impl InputNeuron {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            name: format!("input_{}", index),
        }
    }

    pub fn get_output(&self, queue: &VecDeque<Vec<f32>>) -> Result<f32> {
        let input = queue
            .front()
            .ok_or_else(|| GraphError::SequenceExhausted(self.name.clone()))?;
        input
            .get(self.index)
            .copied()
            .ok_or(GraphError::MissingInputIndex {
                index: self.index,
                len: input.len(),
            })
    }
}
