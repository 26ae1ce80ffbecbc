// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense weights to sparse graph

use sparse_rnn_neural::{GraphParams, PostLayerWeights, Result, RnnCellWeights};
use tracing::info;

use crate::graph::RnnGraph;
use crate::layers::{CellLayer, GraphLayer, InputLayer, OutputLayer, PostLayer};

/// Compiles cells and post layers in declaration order, each consuming the
/// layer before it, then attaches a dense identity output layer.
pub fn compile(
    input_dim: usize,
    output_dim: usize,
    cells: &[RnnCellWeights],
    post_layers: &[PostLayerWeights],
    params: &GraphParams,
) -> Result<RnnGraph> {
    info!(
        target: "sparse-rnn-engine",
        "Compiling graph: input_dim={} output_dim={} cells={} post_layers={} clip={} quantum={}",
        input_dim,
        output_dim,
        cells.len(),
        post_layers.len(),
        params.clip_threshold,
        params.quantization_interval
    );

    let input_layer = InputLayer::new(input_dim);

    let mut compiled_cells: Vec<CellLayer> = Vec::with_capacity(cells.len());
    for (layer_ix, weights) in cells.iter().enumerate() {
        let prev = last_layer(&input_layer, &compiled_cells, &[]);
        let cell = CellLayer::from_weights(layer_ix, weights, params, prev)?;
        compiled_cells.push(cell);
    }

    let mut compiled_post: Vec<PostLayer> = Vec::with_capacity(post_layers.len());
    for (layer_ix, weights) in post_layers.iter().enumerate() {
        let prev = last_layer(&input_layer, &compiled_cells, &compiled_post);
        let layer = PostLayer::from_weights(layer_ix, weights, params, prev)?;
        compiled_post.push(layer);
    }

    let outputs = OutputLayer::new(
        output_dim,
        last_layer(&input_layer, &compiled_cells, &compiled_post),
    );

    RnnGraph::new(input_layer, compiled_cells, compiled_post, outputs)
}

impl RnnGraph {
    pub fn from_weights(
        input_dim: usize,
        output_dim: usize,
        cells: &[RnnCellWeights],
        post_layers: &[PostLayerWeights],
        params: &GraphParams,
    ) -> Result<Self> {
        compile(input_dim, output_dim, cells, post_layers, params)
    }
}

/// The layer the next one reads from
pub(crate) fn last_layer<'a>(
    input: &'a InputLayer,
    cells: &'a [CellLayer],
    post_layers: &'a [PostLayer],
) -> &'a dyn GraphLayer {
    if let Some(layer) = post_layers.last() {
        return layer;
    }
    if let Some(cell) = cells.last() {
        return cell;
    }
    input
}
