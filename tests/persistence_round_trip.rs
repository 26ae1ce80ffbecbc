// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Weight file to graph file and back, through the umbrella crate

use sparse_rnn::prelude::*;
use sparse_rnn::serialization::{decode_snapshot, encode_snapshot, graph_from_json, graph_to_json};

const WEIGHTS: &str = r#"{
    "input_dim": 2,
    "output_dim": 2,
    "cells": [{
        "state_size": 2,
        "output_dim": 2,
        "output_kernel": [[1.0, 0.0], [0.0, -1.0], [1.0, 0.05], [0.0, 2.0]],
        "output_bias": [0.0, 1.0],
        "recurrent_kernel": [[1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [-1.0, 0.0]],
        "initial_state": [1.0, -1.0],
        "recurrent_activation": "tanh",
        "output_activation": { "type": "interpolatedAmeo", "factor": 0.5, "leakyness": 0.1 }
    }],
    "post_layers": [{
        "input_dim": 2,
        "output_dim": 1,
        "weights": [[1.0], [-1.0]],
        "activation": "linear"
    }]
}"#;

fn compiled() -> RnnGraph {
    let file = WeightsFile::from_json(WEIGHTS).unwrap();
    RnnGraph::from_weights(
        file.input_dim,
        file.output_dim,
        &file.cell_weights().unwrap(),
        &file.post_layer_weights().unwrap(),
        &GraphParams::default(),
    )
    .unwrap()
}

fn sequence() -> Vec<Vec<f32>> {
    vec![
        vec![1.0, -1.0],
        vec![0.5, 0.5],
        vec![-1.0, 2.0],
        vec![0.0, 0.0],
    ]
}

#[test]
fn test_json_file_round_trip() {
    let mut graph = compiled();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");

    save_graph_json(&graph.serialize(), &path).unwrap();
    let mut restored = RnnGraph::deserialize(&load_graph_any(&path).unwrap()).unwrap();

    assert_eq!(graph.evaluate(&sequence()).unwrap(), restored.evaluate(&sequence()).unwrap());
}

#[test]
fn test_binary_file_round_trip() {
    let mut graph = compiled();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.srnng");

    save_graph(&GraphSnapshot::new(graph.serialize()), &path).unwrap();
    let snapshot = load_graph(&path).unwrap();
    let mut restored = RnnGraph::deserialize(&snapshot.graph).unwrap();

    assert_eq!(graph.evaluate(&sequence()).unwrap(), restored.evaluate(&sequence()).unwrap());
    assert_eq!(graph.reachable_neuron_count(), restored.reachable_neuron_count());
}

#[test]
fn test_serialized_forms_are_stable() {
    let graph = compiled();
    let serialized = graph.serialize();

    let json = graph_to_json(&serialized).unwrap();
    assert_eq!(graph_from_json(&json).unwrap(), serialized);

    let bytes = encode_snapshot(&GraphSnapshot::new(serialized.clone())).unwrap();
    assert_eq!(decode_snapshot(&bytes).unwrap().graph, serialized);
}

#[test]
fn test_validation_against_own_outputs() {
    let mut graph = compiled();
    let outputs = graph.evaluate(&sequence()).unwrap();
    let example = SequenceExample {
        inputs: sequence(),
        outputs,
    };
    assert_eq!(
        graph.validate_sequence(&example, ValidationMode::Strict).unwrap(),
        SequenceValidation::Valid
    );
}
