// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Sparse RNN Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Sparse RNN Engine
//!
//! Turns dense RNN weights into a sparse scalar graph and runs it.
//!
//! ## Pipeline
//! - **Compile**: clip and quantize every tensor, drop zero weights, elide
//!   neurons with no weights and no bias
//! - **Prune**: keep only neurons reachable backward from a connected output
//! - **Evaluate**: pull outputs once per timestep with memoization, then
//!   advance all state neurons in two phases
//! - **Inspect**: serialize, render DOT, validate against examples
//!
//! ## Architecture
//! - One slot arena per layer; neurons refer to each other by address
//! - Memoization through `Cell`, so a graph is single-threaded
//! - No I/O; persistence lives in `sparse-rnn-serialization`

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compiler;
pub mod evaluator;
pub mod graph;
pub mod graphviz;
pub mod layers;
pub mod prune;
pub mod serialize;
pub mod validation;

pub use compiler::compile;
pub use graph::{NeuronRef, RnnGraph};
pub use graphviz::{format_edge_weight, GraphvizOptions};
pub use layers::{CellLayer, GraphLayer, InputLayer, OutputLayer, PostLayer};
pub use validation::{SequenceExample, SequenceValidation, ValidationMode, ValidationReport};

pub use sparse_rnn_neural::{
    Activation, GraphError, GraphParams, NeuronAddress, NeuronSource, PostLayerWeights, Result,
    RnnCellWeights,
};
