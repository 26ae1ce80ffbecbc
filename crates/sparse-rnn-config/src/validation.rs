// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! All problems are collected before reporting, so one run lists every bad field.

use crate::{ConfigError, ConfigResult, SparseRnnConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotFinite { field: String, value: f32 },
    Negative { field: String, value: f32 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite { field, value } => {
                write!(f, "{} = {} is not a finite number", field, value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &SparseRnnConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every failed check, in field order
pub fn collect_errors(config: &SparseRnnConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    check_non_negative(
        "graph.clip_threshold",
        config.graph.clip_threshold,
        &mut errors,
    );
    check_non_negative(
        "graph.quantization_interval",
        config.graph.quantization_interval,
        &mut errors,
    );

    if let Some(ratio) = config.graphviz.aspect_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: "graphviz.aspect_ratio".to_string(),
                reason: format!("{} must be a positive number", ratio),
            });
        }
    }

    if config.logging.level.trim().is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    errors
}

fn check_non_negative(field: &str, value: f32, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
            value,
        });
    } else if value < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}
