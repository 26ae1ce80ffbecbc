// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Library half of the `sparse-rnn` binary
//!
//! Each subcommand is a plain function over paths and config values so it
//! can be driven from tests without spawning a process.

pub mod args;
pub mod commands;
pub mod files;

pub use args::{split_debug_args, Cli, Command};
pub use commands::{
    graph_params, graphviz_options, load_rnn_graph, render_dot, run_compile, run_eval,
    run_validate, validation_mode,
};
pub use files::{read_examples, read_input_sequence, ExampleRecord};
