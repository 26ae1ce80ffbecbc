// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Graphviz DOT rendering of the pruned topology

use ahash::AHashSet;
use sparse_rnn_neural::{NeuronAddress, SparseNeuron};

use crate::graph::RnnGraph;
use crate::layers::GraphLayer;

/// Rendering switches
#[derive(Debug, Clone, PartialEq)]
pub struct GraphvizOptions {
    /// Draw arrowheads on edges
    pub arrowhead: bool,
    /// Wrap cell and post layers in `cluster_` subgraphs
    pub cluster: bool,
    /// Wrap inputs in a cluster ranked as the source row
    pub cluster_inputs: bool,
    pub aspect_ratio: Option<f32>,
    /// Label edges with their weight
    pub edge_labels: bool,
    /// Neuron names left out of the drawing, along with their edges
    pub excluded_node_ids: AHashSet<String>,
}

impl Default for GraphvizOptions {
    fn default() -> Self {
        Self {
            arrowhead: true,
            cluster: true,
            cluster_inputs: true,
            aspect_ratio: None,
            edge_labels: true,
            excluded_node_ids: AHashSet::new(),
        }
    }
}

/// Three decimals with trailing zeros (and a bare point) trimmed
pub fn format_edge_weight(weight: f32) -> String {
    let fixed = format!("{:.3}", weight);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

struct DotWriter {
    out: String,
    depth: usize,
}

impl DotWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn node(&mut self, name: &str, label: &str) {
        self.line(&format!("{} [label={}];", quote(name), quote(label)));
    }
}

impl RnnGraph {
    pub fn build_graphviz(&self, options: &GraphvizOptions) -> String {
        let excluded = &options.excluded_node_ids;
        let prefix = if options.cluster { "cluster_" } else { "" };
        let mut dot = DotWriter {
            out: String::new(),
            depth: 0,
        };

        dot.open("digraph \"RNN\"");

        let mut graph_attrs = vec![
            "rankdir=\"TB\"".to_string(),
            "center=true".to_string(),
            "splines=\"spline\"".to_string(),
            "overlap=false".to_string(),
            "nodesep=0.32".to_string(),
            "ranksep=0.22".to_string(),
        ];
        if let Some(ratio) = options.aspect_ratio {
            graph_attrs.push(format!("ratio={}", ratio));
        }
        dot.line(&format!("graph [{}];", graph_attrs.join(", ")));
        dot.line("node [shape=\"square\"];");
        if !options.arrowhead {
            dot.line("edge [arrowhead=\"none\"];");
        }

        dot.open("subgraph \"cluster_outputs\"");
        dot.line("rank=\"sink\";");
        dot.line("node [fontsize=10];");
        for (ix, neuron) in self.outputs.neurons().iter().enumerate() {
            if let Some(neuron) = neuron.as_ref().filter(|n| !excluded.contains(n.name())) {
                dot.node(neuron.name(), &format!("OUT{}", ix));
            }
        }
        dot.close();

        let sparse_nodes = |dot: &mut DotWriter, neurons: &[Option<SparseNeuron>]| {
            for neuron in neurons.iter().flatten() {
                if !excluded.contains(&neuron.name) {
                    dot.node(&neuron.name, "N");
                }
            }
        };

        for (layer_ix, cell) in self.cells.iter().enumerate() {
            dot.open(&format!("subgraph {}", quote(&format!("{}layer_{}", prefix, layer_ix))));

            dot.open(&format!(
                "subgraph {}",
                quote(&format!("{}layer_{}_state", prefix, layer_ix))
            ));
            dot.line("node [shape=\"circle\"];");
            for state in cell.state_neurons().iter().flatten() {
                if !excluded.contains(state.name()) {
                    dot.node(state.name(), "S");
                }
            }
            dot.close();

            dot.open(&format!(
                "subgraph {}",
                quote(&format!("{}layer_{}_recurrent", prefix, layer_ix))
            ));
            sparse_nodes(&mut dot, cell.recurrent_neurons());
            dot.close();

            dot.open(&format!(
                "subgraph {}",
                quote(&format!("{}layer_{}_output", prefix, layer_ix))
            ));
            sparse_nodes(&mut dot, cell.output_neurons());
            dot.close();

            dot.close();
        }

        for (layer_ix, layer) in self.post_layers.iter().enumerate() {
            dot.open(&format!(
                "subgraph {}",
                quote(&format!("{}post_layer_{}", prefix, layer_ix))
            ));
            sparse_nodes(&mut dot, layer.neurons());
            dot.close();
        }

        dot.open(if options.cluster_inputs {
            "subgraph \"cluster_inputs\""
        } else {
            "subgraph \"inputs\""
        });
        dot.line("node [shape=\"circle\", fontsize=10];");
        if options.cluster_inputs {
            dot.line("rank=\"source\";");
        }
        for ix in 0..self.input_layer.output_dim() {
            if let Some(input) = self
                .input_layer
                .neuron_at(ix)
                .filter(|n| !excluded.contains(&n.name))
            {
                dot.node(&input.name, &format!("IN{}", ix));
            }
        }
        dot.close();

        for (from, to, weight) in self.edges_from_outputs() {
            if excluded.contains(from) || excluded.contains(to) {
                continue;
            }
            if options.edge_labels {
                dot.line(&format!(
                    "{} -> {} [label={}];",
                    quote(from),
                    quote(to),
                    quote(&format_edge_weight(weight))
                ));
            } else {
                dot.line(&format!("{} -> {};", quote(from), quote(to)));
            }
        }

        dot.close();
        dot.out
    }

    /// `(source, target, weight)` in depth-first order from each output,
    /// every neuron expanded once
    fn edges_from_outputs(&self) -> Vec<(&str, &str, f32)> {
        let mut edges = Vec::new();
        let mut processed: AHashSet<NeuronAddress> = AHashSet::new();
        let mut stack: Vec<(NeuronAddress, usize)> = Vec::new();

        for slot in 0..self.outputs.output_dim() {
            let Some(root) = self.outputs.neuron(slot) else {
                continue;
            };
            if !processed.insert(root) {
                continue;
            }
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (address, edge_ix) = *top;
                top.1 += 1;
                let Some(neuron) = self.neuron(address) else {
                    stack.pop();
                    continue;
                };
                let Some(weight) = neuron.weights().get(edge_ix) else {
                    stack.pop();
                    continue;
                };
                if let Some(source) = self.neuron(weight.source) {
                    edges.push((source.name(), neuron.name(), weight.weight));
                    if processed.insert(weight.source) {
                        stack.push((weight.source, 0));
                    }
                }
            }
        }
        edges
    }
}
