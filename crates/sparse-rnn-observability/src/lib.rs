// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! # sparse-rnn-observability
//!
//! Logging setup shared by the sparse RNN binaries, with per-crate debug
//! flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Tracing targets used across the workspace, valid after `--debug-`
pub const KNOWN_CRATES: &[&str] = &[
    "sparse-rnn-engine",
    "sparse-rnn-serialization",
    "sparse-rnn-config",
    "sparse-rnn-cli",
];
