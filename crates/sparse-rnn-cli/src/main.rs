// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use sparse_rnn_cli::{
    graphviz_options, render_dot, run_compile, run_eval, run_validate, split_debug_args,
    validation_mode, Cli, Command,
};
use sparse_rnn_config::{load_config, load_config_or_default, validate_config, SparseRnnConfig};
#[cfg(not(feature = "file-logging"))]
use sparse_rnn_observability::init_console_logging;
use sparse_rnn_observability::CrateDebugFlags;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let (debug_args, args) = split_debug_args(std::env::args());
    let cli = Cli::parse_from(args);

    let overrides = cli.config_overrides();
    let config = match &cli.config {
        Some(path) => load_config(Some(path), Some(&overrides)),
        None => load_config_or_default(Some(&overrides)),
    }
    .context("Failed to load configuration")?;
    validate_config(&config)?;

    let mut debug_flags = CrateDebugFlags::from_args(debug_args);
    if let Ok(value) = std::env::var("SPARSE_RNN_DEBUG") {
        debug_flags.merge_env_value(&value);
    }
    #[cfg(feature = "file-logging")]
    let _log_guard =
        sparse_rnn_observability::init_logging(&debug_flags, &config.logging.level, None, None)?;
    #[cfg(not(feature = "file-logging"))]
    init_console_logging(&debug_flags, &config.logging.level)?;

    dispatch(&cli.command, &config)
}

fn write_or_print(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn dispatch(command: &Command, config: &SparseRnnConfig) -> Result<ExitCode> {
    match command {
        Command::Compile {
            weights,
            out,
            binary,
            dot,
            ..
        } => {
            let graph = run_compile(weights, out, binary.as_deref(), dot.as_deref(), config)?;
            info!(
                target: "sparse-rnn-cli",
                "  Reachable neurons: {}",
                graph.reachable_neuron_count()
            );
        }
        Command::Eval { graph, inputs, out } => {
            let outputs = run_eval(graph, inputs)?;
            write_or_print(out.as_deref(), &serde_json::to_string_pretty(&outputs)?)?;
        }
        Command::Dot {
            graph, out, exclude, ..
        } => {
            let options = graphviz_options(&config.graphviz, exclude);
            write_or_print(out.as_deref(), &render_dot(graph, &options)?)?;
        }
        Command::Validate {
            graph, examples, ..
        } => {
            let report = run_validate(
                graph,
                examples,
                config.validation.iterations,
                validation_mode(config.validation.lenient),
            )?;
            match report.first_failure {
                None => println!("valid ({} examples)", report.iterations_run),
                Some((ix, outcome)) => {
                    println!("example {} failed: {:?}", ix, outcome);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
