// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input sequence and example files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sparse_rnn_engine::SequenceExample;
use std::path::Path;

/// One entry of an examples file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub inputs: Vec<Vec<f32>>,
    pub outputs: Vec<Vec<f32>>,
}

impl From<ExampleRecord> for SequenceExample {
    fn from(record: ExampleRecord) -> Self {
        SequenceExample {
            inputs: record.inputs,
            outputs: record.outputs,
        }
    }
}

/// JSON array of input vectors, one per timestep
pub fn read_input_sequence(path: &Path) -> Result<Vec<Vec<f32>>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inputs: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Inputs must be a JSON array of number arrays: {}", path.display()))
}

pub fn read_examples(path: &Path) -> Result<Vec<SequenceExample>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read examples: {}", path.display()))?;
    let records: Vec<ExampleRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid examples file: {}", path.display()))?;
    Ok(records.into_iter().map(SequenceExample::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_examples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.json");
        std::fs::write(
            &path,
            r#"[{ "inputs": [[1, -1]], "outputs": [[0.5]] }, { "inputs": [], "outputs": [] }]"#,
        )
        .unwrap();

        let examples = read_examples(&path).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].inputs, vec![vec![1.0, -1.0]]);
        assert_eq!(examples[0].outputs, vec![vec![0.5]]);
    }

    #[test]
    fn test_malformed_inputs_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.json");
        std::fs::write(&path, r#"{"not": "a sequence"}"#).unwrap();

        let err = read_input_sequence(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("inputs.json"));
    }
}
