// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evaluation Microbenchmarks
//!
//! Purpose:
//! - Track the cost of one timestep (pull + two-phase advance) and of
//!   compilation on fixed, deterministic weights.
//!
//! Notes:
//! - No I/O; weights are generated in-process.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sparse_rnn_engine::{compile, Activation, GraphParams, RnnCellWeights};

/// Deterministic pseudo-random kernel with roughly 1 in 3 weights above the
/// clip threshold
fn kernel(rows: usize, cols: usize, seed: usize) -> Vec<f32> {
    (0..rows * cols)
        .map(|i| {
            let h = (i * 2654435761 + seed * 40503) % 1000;
            match h % 3 {
                0 => (h as f32 / 250.0) - 2.0,
                _ => 0.01,
            }
        })
        .collect()
}

fn cell(prev_dim: usize, state_size: usize, output_size: usize, seed: usize) -> RnnCellWeights {
    let rows = prev_dim + state_size;
    RnnCellWeights {
        initial_state: vec![0.0; state_size],
        state_size,
        output_size,
        recurrent_tree_weights: kernel(rows, state_size, seed),
        recurrent_tree_bias: None,
        output_tree_weights: kernel(rows, output_size, seed + 1),
        output_tree_bias: None,
        output_activation: Activation::LeakyAmeo { leakyness: 0.1 },
        recurrent_activation: Activation::Tanh,
    }
}

fn bench_timestep(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestep");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    for &width in &[8usize, 32, 128] {
        let cells = vec![cell(width, width, width, 1), cell(width, width, width, 7)];
        let params = GraphParams::with_values(0.1, 0.5);
        let mut graph = match compile(width, width, &cells, &[], &params) {
            Ok(graph) => graph,
            Err(e) => panic!("benchmark graph failed to compile: {}", e),
        };
        graph.set_history_enabled(false);
        let input: Vec<f32> = (0..width).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();

        group.throughput(Throughput::Elements(graph.reachable_neuron_count() as u64));
        group.bench_with_input(BenchmarkId::new("evaluate_and_advance", width), &width, |b, _| {
            let _ = graph.reset(vec![input.clone()]);
            b.iter(|| {
                let out = graph.evaluate_one_timestep();
                let _ = black_box(out);
                let _ = graph.advance_sequence(Some(input.clone()));
            });
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(10);

    let width = 64;
    let cells = vec![cell(width, width, width, 3)];
    group.bench_function("single_cell_64", |b| {
        b.iter(|| {
            let graph = compile(
                black_box(width),
                width,
                black_box(&cells),
                &[],
                &GraphParams::default(),
            );
            let _ = black_box(graph);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_timestep, bench_compile);
criterion_main!(benches);
