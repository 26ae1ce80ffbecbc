// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Sparse RNN Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Sparse RNN Neural Computation
//!
//! The scalar building blocks of a compiled sparse RNN graph:
//! - **Types**: Neuron addresses and the graph error taxonomy
//! - **Activation**: Linear, tanh, the Ameo family and GCU
//! - **Preprocess**: Weight clipping and quantization
//! - **Neuron**: Plain, input, output and state neuron models
//! - **Weights**: Dense weight tensors consumed by the graph compiler
//!
//! Nothing in this crate performs I/O.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Core type definitions
pub mod types;

// Scalar activations
pub mod activation;

// Weight preprocessing
pub mod preprocess;

// Neuron models
pub mod neuron;

// Dense weight tensors (compiler input)
pub mod weights;

// Re-export types
pub use types::{Error, GraphError, NeuronAddress, Result};

pub use activation::Activation;
pub use preprocess::{clip_and_quantize, GraphParams};

pub use neuron::{InputNeuron, NeuronSource, OutputNeuron, SparseNeuron, SparseWeight, StateNeuron};
pub use weights::{PostLayerWeights, RnnCellWeights};
