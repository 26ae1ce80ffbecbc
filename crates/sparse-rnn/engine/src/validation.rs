// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Checking a compiled graph against expected input/output sequences
//!
//! A mismatch is a reported outcome, never an error. Errors are reserved for
//! evaluation failures such as a too-short input vector.

use sparse_rnn_neural::Result;
use tracing::{info, warn};

use crate::graph::RnnGraph;

/// One input sequence and the outputs it should produce
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceExample {
    pub inputs: Vec<Vec<f32>>,
    pub outputs: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Outputs must round to the same integer
    #[default]
    Strict,
    /// Outputs must share a sign; an exact zero never matches
    Lenient,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceValidation {
    Valid,
    Mismatch {
        timestep: usize,
        expected: Vec<f32>,
        actual: Vec<f32>,
    },
}

impl SequenceValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, SequenceValidation::Valid)
    }
}

/// Outcome of running many examples
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub iterations_run: usize,
    /// Example index and mismatch of the first failing example
    pub first_failure: Option<(usize, SequenceValidation)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.first_failure.is_none()
    }
}

fn sign(x: f32) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

fn value_matches(actual: f32, expected: f32, mode: ValidationMode) -> bool {
    match mode {
        ValidationMode::Strict => actual.round() == expected.round(),
        ValidationMode::Lenient => actual != 0.0 && sign(actual) == sign(expected),
    }
}

impl RnnGraph {
    /// Evaluates `example.inputs` and compares every expected value.
    /// Expected values with no evaluated counterpart count as a mismatch.
    pub fn validate_sequence(
        &mut self,
        example: &SequenceExample,
        mode: ValidationMode,
    ) -> Result<SequenceValidation> {
        let actual_outs = self.evaluate(&example.inputs)?;

        for (timestep, expected) in example.outputs.iter().enumerate() {
            let actual = actual_outs.get(timestep).cloned().unwrap_or_default();
            let all_match = expected.len() <= actual.len()
                && expected
                    .iter()
                    .zip(&actual)
                    .all(|(&e, &a)| value_matches(a, e, mode));
            if !all_match {
                return Ok(SequenceValidation::Mismatch {
                    timestep,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(SequenceValidation::Valid)
    }

    /// Draws up to `iterations` examples from `examples`, stopping at the
    /// first mismatch or when the source runs dry.
    pub fn validate<I>(
        &mut self,
        examples: I,
        iterations: usize,
        mode: ValidationMode,
    ) -> Result<ValidationReport>
    where
        I: IntoIterator<Item = SequenceExample>,
    {
        let mut iterations_run = 0;
        for (ix, example) in examples.into_iter().take(iterations).enumerate() {
            iterations_run += 1;
            let outcome = self.validate_sequence(&example, mode)?;
            if !outcome.is_valid() {
                warn!(
                    target: "sparse-rnn-engine",
                    "Validation failed on example {}: {:?}",
                    ix,
                    outcome
                );
                return Ok(ValidationReport {
                    iterations_run,
                    first_failure: Some((ix, outcome)),
                });
            }
        }
        info!(
            target: "sparse-rnn-engine",
            "✓ {} examples validated ({:?})",
            iterations_run,
            mode
        );
        Ok(ValidationReport {
            iterations_run,
            first_failure: None,
        })
    }
}
