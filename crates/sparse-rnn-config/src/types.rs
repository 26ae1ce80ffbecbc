// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `sparse_rnn.toml`. Every field has a
//! default, so a partial file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SparseRnnConfig {
    pub graph: GraphConfig,
    pub validation: ValidationConfig,
    pub graphviz: GraphvizConfig,
    pub logging: LoggingConfig,
}

/// Weight preprocessing applied at compile time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Weights with magnitude at or below this value are dropped
    pub clip_threshold: f32,
    /// Quantization step; 0 disables quantization
    pub quantization_interval: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            clip_threshold: 0.1,
            quantization_interval: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of examples drawn per validation run
    pub iterations: usize,
    /// Compare signs instead of rounded values
    pub lenient: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            lenient: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphvizConfig {
    pub edge_labels: bool,
    pub arrowhead: bool,
    pub cluster: bool,
    pub cluster_inputs: bool,
    pub aspect_ratio: Option<f32>,
}

impl Default for GraphvizConfig {
    fn default() -> Self {
        Self {
            edge_labels: true,
            arrowhead: true,
            cluster: true,
            cluster_inputs: true,
            aspect_ratio: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. "info" or "sparse-rnn-engine=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: SparseRnnConfig = toml::from_str(
            r#"
            [graph]
            clip_threshold = 0.25

            [graphviz]
            aspect_ratio = 0.75
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.clip_threshold, 0.25);
        assert_eq!(config.graph.quantization_interval, 1.0);
        assert_eq!(config.graphviz.aspect_ratio, Some(0.75));
        assert!(config.graphviz.edge_labels);
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: SparseRnnConfig = toml::from_str("").unwrap();
        assert_eq!(config, SparseRnnConfig::default());
    }
}
