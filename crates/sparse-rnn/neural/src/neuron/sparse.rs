// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain sparse neuron

use core::cell::Cell;

use super::NeuronSource;
use crate::activation::Activation;
use crate::types::{NeuronAddress, Result};

/// One incoming connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseWeight {
    pub weight: f32,
    /// Position in the dense input vector (previous layer outputs, then state)
    pub index: usize,
    pub source: NeuronAddress,
}

/// Weighted sum over sparse sources, plus bias, through an activation.
///
/// The output is memoized until [`SparseNeuron::clear_cache`] is called at
/// the next timestep boundary.
#[derive(Debug, Clone)]
pub struct SparseNeuron {
    pub weights: Vec<SparseWeight>,
    pub bias: f32,
    pub name: String,
    activation: Activation,
    cached_output: Cell<Option<f32>>,
}

impl SparseNeuron {
    pub fn new(
        weights: Vec<SparseWeight>,
        bias: f32,
        name: impl Into<String>,
        activation: Activation,
    ) -> Self {
        Self {
            weights,
            bias,
            name: name.into(),
            activation,
            cached_output: Cell::new(None),
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn push_weight(&mut self, weight: f32, index: usize, source: NeuronAddress) {
        self.weights.push(SparseWeight {
            weight,
            index,
            source,
        });
    }

    /// Base evaluation: `activation(bias + Σ weight · source)`, ignoring the cache
    pub fn weighted_output<S: NeuronSource + ?Sized>(&self, source: &S) -> Result<f32> {
        let mut sum = self.bias;
        for w in &self.weights {
            sum += w.weight * source.neuron_output(w.source)?;
        }
        Ok(self.activation.apply(sum))
    }

    /// Memoized evaluation for the current timestep
    pub fn get_output<S: NeuronSource + ?Sized>(&self, source: &S) -> Result<f32> {
        if let Some(output) = self.cached_output.get() {
            return Ok(output);
        }
        let output = self.weighted_output(source)?;
        self.cached_output.set(Some(output));
        Ok(output)
    }

    pub fn cached_output(&self) -> Option<f32> {
        self.cached_output.get()
    }

    /// Invalidate the memoized output; called once per timestep advance
    pub fn clear_cache(&self) {
        self.cached_output.set(None);
    }
}
