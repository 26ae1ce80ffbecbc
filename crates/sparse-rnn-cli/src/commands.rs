// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations

use ahash::AHashSet;
use anyhow::{Context, Result};
use sparse_rnn_config::{GraphConfig, GraphvizConfig, SparseRnnConfig};
use sparse_rnn_engine::{
    GraphParams, GraphvizOptions, RnnGraph, ValidationMode, ValidationReport,
};
use sparse_rnn_serialization::{
    load_graph_any, save_graph, save_graph_json, GraphMetadata, GraphSnapshot, WeightsFile,
};
use std::path::Path;
use tracing::{debug, info};

use crate::files::{read_examples, read_input_sequence};

pub fn graph_params(config: &GraphConfig) -> GraphParams {
    GraphParams::with_values(config.clip_threshold, config.quantization_interval)
}

pub fn graphviz_options(config: &GraphvizConfig, excluded: &[String]) -> GraphvizOptions {
    GraphvizOptions {
        arrowhead: config.arrowhead,
        cluster: config.cluster,
        cluster_inputs: config.cluster_inputs,
        aspect_ratio: config.aspect_ratio,
        edge_labels: config.edge_labels,
        excluded_node_ids: excluded.iter().cloned().collect::<AHashSet<String>>(),
    }
}

pub fn validation_mode(lenient: bool) -> ValidationMode {
    if lenient {
        ValidationMode::Lenient
    } else {
        ValidationMode::Strict
    }
}

/// Reads a graph file in either format and rebuilds the runtime graph
pub fn load_rnn_graph(path: &Path) -> Result<RnnGraph> {
    let serialized = load_graph_any(path)
        .with_context(|| format!("Failed to load graph: {}", path.display()))?;
    let graph = RnnGraph::deserialize(&serialized)
        .with_context(|| format!("Graph file is inconsistent: {}", path.display()))?;
    debug!(
        target: "sparse-rnn-cli",
        "Loaded {} with {} reachable neurons",
        path.display(),
        graph.reachable_neuron_count()
    );
    Ok(graph)
}

/// Compiles `weights`, writes the JSON graph to `out`, and optionally the
/// binary container and a DOT rendering
pub fn run_compile(
    weights: &Path,
    out: &Path,
    binary: Option<&Path>,
    dot: Option<&Path>,
    config: &SparseRnnConfig,
) -> Result<RnnGraph> {
    let file = WeightsFile::load(weights)
        .with_context(|| format!("Failed to read weights: {}", weights.display()))?;
    let cells = file.cell_weights()?;
    let post_layers = file.post_layer_weights()?;

    let graph = RnnGraph::from_weights(
        file.input_dim,
        file.output_dim,
        &cells,
        &post_layers,
        &graph_params(&config.graph),
    )
    .with_context(|| format!("Failed to compile {}", weights.display()))?;

    let serialized = graph.serialize();
    save_graph_json(&serialized, out)
        .with_context(|| format!("Failed to write graph: {}", out.display()))?;
    info!(target: "sparse-rnn-cli", "✓ Graph written to {}", out.display());

    if let Some(binary) = binary {
        let snapshot = GraphSnapshot::new(serialized).with_metadata(GraphMetadata {
            description: format!(
                "clip_threshold={} quantization_interval={}",
                config.graph.clip_threshold, config.graph.quantization_interval
            ),
            source: format!("weights: {}", weights.display()),
            ..GraphMetadata::default()
        });
        save_graph(&snapshot, binary)
            .with_context(|| format!("Failed to write binary graph: {}", binary.display()))?;
        info!(target: "sparse-rnn-cli", "✓ Binary graph written to {}", binary.display());
    }

    if let Some(dot) = dot {
        let rendered = graph.build_graphviz(&graphviz_options(&config.graphviz, &[]));
        std::fs::write(dot, rendered)
            .with_context(|| format!("Failed to write DOT: {}", dot.display()))?;
        info!(target: "sparse-rnn-cli", "✓ DOT written to {}", dot.display());
    }

    Ok(graph)
}

pub fn run_eval(graph: &Path, inputs: &Path) -> Result<Vec<Vec<f32>>> {
    let mut graph = load_rnn_graph(graph)?;
    let sequence = read_input_sequence(inputs)?;
    let outputs = graph
        .evaluate(&sequence)
        .with_context(|| format!("Evaluation failed for {}", inputs.display()))?;
    info!(
        target: "sparse-rnn-cli",
        "✓ Evaluated {} timesteps",
        outputs.len()
    );
    Ok(outputs)
}

pub fn render_dot(graph: &Path, options: &GraphvizOptions) -> Result<String> {
    Ok(load_rnn_graph(graph)?.build_graphviz(options))
}

pub fn run_validate(
    graph: &Path,
    examples: &Path,
    iterations: usize,
    mode: ValidationMode,
) -> Result<ValidationReport> {
    let mut graph = load_rnn_graph(graph)?;
    let examples = read_examples(examples)?;
    graph
        .validate(examples, iterations, mode)
        .context("Validation aborted by an evaluation error")
}
