// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Sparse RNN Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Model Architecture
//!
//! Four neuron kinds make up a compiled graph:
//!
//! - [`SparseNeuron`]: weighted sum over a sparse list of sources, plus
//!   bias, through an activation. Memoized once per timestep.
//! - [`InputNeuron`]: reads one index of the front vector of the input queue.
//! - [`OutputNeuron`]: identity pass-through of one neuron in the last layer.
//! - [`StateNeuron`]: the only neuron with memory across timesteps.
//!
//! Neurons reach their sources through a [`NeuronSource`], normally the
//! graph that owns them, so no neuron ever owns or points at another.

mod input;
mod output;
mod sparse;
mod state;

pub use input::InputNeuron;
pub use output::OutputNeuron;
pub use sparse::{SparseNeuron, SparseWeight};
pub use state::StateNeuron;

use crate::types::{NeuronAddress, Result};

/// Resolves a neuron address to that neuron's output for the current timestep
pub trait NeuronSource {
    fn neuron_output(&self, address: NeuronAddress) -> Result<f32>;
}
