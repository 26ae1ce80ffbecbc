// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Core type definitions shared by the neuron models and the graph engine.

pub mod address;
pub mod error;

// Re-export commonly used types
pub use address::NeuronAddress;
pub use error::{Error, GraphError, Result};
