// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command line arguments

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

/// Sparse RNN - compile dense RNN weights into a sparse scalar graph
#[derive(Parser, Debug)]
#[command(name = "sparse-rnn", version, long_about = None)]
pub struct Cli {
    /// Configuration file (default: search for sparse_rnn.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base log filter, e.g. "warn" or "debug"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a dense weight file into a graph
    Compile {
        /// Dense weight file (JSON)
        #[arg(long)]
        weights: PathBuf,

        /// Serialized graph output (JSON)
        #[arg(long)]
        out: PathBuf,

        /// Also write the framed binary container
        #[arg(long)]
        binary: Option<PathBuf>,

        /// Also write a Graphviz rendering
        #[arg(long)]
        dot: Option<PathBuf>,

        #[arg(long)]
        clip_threshold: Option<f32>,

        /// 0 disables quantization
        #[arg(long)]
        quantization_interval: Option<f32>,
    },

    /// Evaluate a graph over an input sequence and print the outputs
    Eval {
        /// Graph file (JSON or binary container)
        #[arg(long)]
        graph: PathBuf,

        /// JSON array of input vectors
        #[arg(long)]
        inputs: PathBuf,

        /// Write outputs here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render a graph as Graphviz DOT
    Dot {
        #[arg(long)]
        graph: PathBuf,

        /// Write DOT here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        no_edge_labels: bool,

        #[arg(long)]
        no_arrowheads: bool,

        #[arg(long)]
        no_cluster: bool,

        #[arg(long)]
        aspect_ratio: Option<f32>,

        /// Neuron names to leave out (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Check a graph against expected input/output sequences
    Validate {
        #[arg(long)]
        graph: PathBuf,

        /// JSON array of `{ "inputs": [...], "outputs": [...] }`
        #[arg(long)]
        examples: PathBuf,

        /// Compare signs instead of rounded values
        #[arg(long)]
        lenient: bool,

        /// Maximum number of examples to run
        #[arg(long)]
        iterations: Option<usize>,
    },
}

impl Cli {
    /// Flags that override configuration values, keyed as the config
    /// loader expects
    pub fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }

        match &self.command {
            Command::Compile {
                clip_threshold,
                quantization_interval,
                ..
            } => {
                if let Some(threshold) = clip_threshold {
                    overrides.insert("clip_threshold".to_string(), threshold.to_string());
                }
                if let Some(interval) = quantization_interval {
                    overrides.insert("quantization_interval".to_string(), interval.to_string());
                }
            }
            Command::Dot {
                no_edge_labels,
                no_arrowheads,
                no_cluster,
                aspect_ratio,
                ..
            } => {
                if *no_edge_labels {
                    overrides.insert("edge_labels".to_string(), "false".to_string());
                }
                if *no_arrowheads {
                    overrides.insert("arrowhead".to_string(), "false".to_string());
                }
                if *no_cluster {
                    overrides.insert("cluster".to_string(), "false".to_string());
                    overrides.insert("cluster_inputs".to_string(), "false".to_string());
                }
                if let Some(ratio) = aspect_ratio {
                    overrides.insert("aspect_ratio".to_string(), ratio.to_string());
                }
            }
            Command::Validate {
                lenient,
                iterations,
                ..
            } => {
                if *lenient {
                    overrides.insert("lenient".to_string(), "true".to_string());
                }
                if let Some(iterations) = iterations {
                    overrides.insert("iterations".to_string(), iterations.to_string());
                }
            }
            Command::Eval { .. } => {}
        }
        overrides
    }
}

/// Separates `--debug-*` flags, which clap does not know about, from the
/// rest of the arguments
pub fn split_debug_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().partition(|arg| arg.starts_with("--debug-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_split_debug_args() {
        let (debug, rest) = split_debug_args(
            ["sparse-rnn", "--debug-sparse-rnn-engine", "eval", "--graph", "g.json"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(debug, vec!["--debug-sparse-rnn-engine"]);
        assert_eq!(rest, vec!["sparse-rnn", "eval", "--graph", "g.json"]);
    }

    #[test]
    fn test_compile_overrides() {
        let cli = parse(&[
            "sparse-rnn",
            "compile",
            "--weights",
            "w.json",
            "--out",
            "g.json",
            "--quantization-interval",
            "0.5",
        ]);
        let overrides = cli.config_overrides();
        assert_eq!(overrides.get("quantization_interval").map(String::as_str), Some("0.5"));
        assert!(!overrides.contains_key("clip_threshold"));
    }

    #[test]
    fn test_dot_flags_become_overrides() {
        let cli = parse(&[
            "sparse-rnn",
            "--log-level",
            "warn",
            "dot",
            "--graph",
            "g.json",
            "--no-cluster",
            "--exclude",
            "input_0",
            "--exclude",
            "input_1",
        ]);
        let overrides = cli.config_overrides();
        assert_eq!(overrides.get("cluster").map(String::as_str), Some("false"));
        assert_eq!(overrides.get("log_level").map(String::as_str), Some("warn"));
        match cli.command {
            Command::Dot { exclude, .. } => assert_eq!(exclude, vec!["input_0", "input_1"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
