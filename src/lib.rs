// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Sparse RNN
//!
//! Compiles the weights of a trained RNN (stacked cells plus dense post
//! layers) into a sparse scalar graph, prunes everything that cannot reach an
//! output, and evaluates the result one timestep at a time. The graph is small
//! enough to read, render as Graphviz DOT, and compare against the dense model.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sparse-rnn = "0.1"  # Default: persistence
//! ```
//!
//! ```rust,no_run
//! use sparse_rnn::prelude::*;
//!
//! let cell = RnnCellWeights {
//!     initial_state: vec![0.0],
//!     state_size: 1,
//!     output_size: 1,
//!     recurrent_tree_weights: vec![1.0, 1.0],
//!     recurrent_tree_bias: None,
//!     output_tree_weights: vec![1.0, 1.0],
//!     output_tree_bias: None,
//!     output_activation: Activation::Linear,
//!     recurrent_activation: Activation::Linear,
//! };
//! let mut graph = compile(1, 1, &[cell], &[], &GraphParams::default())?;
//! let outputs = graph.evaluate(&[vec![1.0], vec![1.0]])?;
//! # Ok::<(), sparse_rnn::engine::GraphError>(())
//! ```
//!
//! ## Feature Flags
//! - **`persistence`** (default): JSON and binary graph files, dense weight files
//! - **`config`**: `sparse_rnn.toml` loading with environment and CLI overrides
//! - **`observability`**: logging initialisation and per-crate debug flags
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: sparse-rnn-neural                          │
//! │  (activations, preprocessing, neuron models)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Graph: sparse-rnn-engine                               │
//! │  (compile, prune, evaluate, DOT, validation)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  I/O: sparse-rnn-serialization, sparse-rnn-cli          │
//! └─────────────────────────────────────────────────────────┘
//! ```

// Re-export foundation
pub use sparse_rnn_neural as neural;

// Re-export graph subsystem
pub use sparse_rnn_engine as engine;

// Re-export I/O layer
#[cfg(feature = "persistence")]
pub use sparse_rnn_serialization as serialization;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use sparse_rnn_config as config;

#[cfg(feature = "observability")]
pub use sparse_rnn_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::engine::{
        compile, Activation, GraphError, GraphParams, GraphvizOptions, NeuronAddress,
        PostLayerWeights, RnnCellWeights, RnnGraph, SequenceExample, SequenceValidation,
        ValidationMode,
    };

    #[cfg(feature = "persistence")]
    pub use crate::serialization::{
        load_graph, load_graph_any, save_graph, save_graph_json, GraphSnapshot,
        SerializedRnnGraph, WeightsFile,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, SparseRnnConfig};
}
