// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SparseRnnConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = "sparse_rnn.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `SPARSE_RNN_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPARSE_RNN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPARSE_RNN_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SPARSE_RNN_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SparseRnnConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SparseRnnConfig = toml::from_str(&content)?;

    apply_overrides(&mut config, cli_args);
    Ok(config)
}

/// Like [`load_config`] with discovery, but a missing file yields the
/// defaults (overrides still apply). Parse and I/O errors still surface.
pub fn load_config_or_default(
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SparseRnnConfig> {
    match load_config(None, cli_args) {
        Err(ConfigError::FileNotFound(_)) => {
            let mut config = SparseRnnConfig::default();
            apply_overrides(&mut config, cli_args);
            Ok(config)
        }
        other => other,
    }
}

fn apply_overrides(config: &mut SparseRnnConfig, cli_args: Option<&HashMap<String, String>>) {
    apply_environment_overrides(config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(config, cli);
    }
}

fn parse_bool(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower == "true" || lower == "1" || lower == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPARSE_RNN_CLIP_THRESHOLD` -> `graph.clip_threshold`
/// - `SPARSE_RNN_QUANTIZATION_INTERVAL` -> `graph.quantization_interval`
/// - `SPARSE_RNN_VALIDATION_ITERATIONS` -> `validation.iterations`
/// - `SPARSE_RNN_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut SparseRnnConfig) {
    if let Ok(value) = env::var("SPARSE_RNN_CLIP_THRESHOLD") {
        if let Ok(threshold) = value.parse::<f32>() {
            config.graph.clip_threshold = threshold;
        }
    }
    if let Ok(value) = env::var("SPARSE_RNN_QUANTIZATION_INTERVAL") {
        if let Ok(interval) = value.parse::<f32>() {
            config.graph.quantization_interval = interval;
        }
    }
    if let Ok(value) = env::var("SPARSE_RNN_VALIDATION_ITERATIONS") {
        if let Ok(iterations) = value.parse::<usize>() {
            config.validation.iterations = iterations;
        }
    }
    if let Ok(value) = env::var("SPARSE_RNN_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `clip_threshold`, `quantization_interval`, `iterations`,
/// `lenient`, `edge_labels`, `arrowhead`, `cluster`, `cluster_inputs`,
/// `aspect_ratio`, `log_level`.
pub fn apply_cli_overrides(config: &mut SparseRnnConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("clip_threshold") {
        if let Ok(threshold) = value.parse::<f32>() {
            config.graph.clip_threshold = threshold;
        }
    }
    if let Some(value) = cli_args.get("quantization_interval") {
        if let Ok(interval) = value.parse::<f32>() {
            config.graph.quantization_interval = interval;
        }
    }

    if let Some(value) = cli_args.get("iterations") {
        if let Ok(iterations) = value.parse::<usize>() {
            config.validation.iterations = iterations;
        }
    }
    if let Some(value) = cli_args.get("lenient") {
        config.validation.lenient = parse_bool(value);
    }

    if let Some(value) = cli_args.get("edge_labels") {
        config.graphviz.edge_labels = parse_bool(value);
    }
    if let Some(value) = cli_args.get("arrowhead") {
        config.graphviz.arrowhead = parse_bool(value);
    }
    if let Some(value) = cli_args.get("cluster") {
        config.graphviz.cluster = parse_bool(value);
    }
    if let Some(value) = cli_args.get("cluster_inputs") {
        config.graphviz.cluster_inputs = parse_bool(value);
    }
    if let Some(value) = cli_args.get("aspect_ratio") {
        if let Ok(ratio) = value.parse::<f32>() {
            config.graphviz.aspect_ratio = Some(ratio);
        }
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 4] = [
        "SPARSE_RNN_CLIP_THRESHOLD",
        "SPARSE_RNN_QUANTIZATION_INTERVAL",
        "SPARSE_RNN_VALIDATION_ITERATIONS",
        "SPARSE_RNN_LOG_LEVEL",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("SPARSE_RNN_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SPARSE_RNN_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var("SPARSE_RNN_CONFIG_PATH", missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SPARSE_RNN_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[graph]").unwrap();
        writeln!(file, "clip_threshold = 0.2").unwrap();
        writeln!(file, "[validation]").unwrap();
        writeln!(file, "iterations = 7").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.graph.clip_threshold, 0.2);
        assert_eq!(config.validation.iterations, 7);
        assert_eq!(config.graph.quantization_interval, 1.0);
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SparseRnnConfig::default();

        env::set_var("SPARSE_RNN_CLIP_THRESHOLD", "0.05");
        env::set_var("SPARSE_RNN_VALIDATION_ITERATIONS", "not-a-number");
        env::set_var("SPARSE_RNN_LOG_LEVEL", "debug");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.graph.clip_threshold, 0.05);
        assert_eq!(config.validation.iterations, 100);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SparseRnnConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("quantization_interval".to_string(), "0.5".to_string());
        cli_args.insert("lenient".to_string(), "yes".to_string());
        cli_args.insert("edge_labels".to_string(), "false".to_string());
        cli_args.insert("aspect_ratio".to_string(), "1.5".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.graph.quantization_interval, 0.5);
        assert!(config.validation.lenient);
        assert!(!config.graphviz.edge_labels);
        assert_eq!(config.graphviz.aspect_ratio, Some(1.5));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[graph]").unwrap();
        writeln!(file, "clip_threshold = 0.3").unwrap();
        writeln!(file, "quantization_interval = 0.25").unwrap();

        env::set_var("SPARSE_RNN_CLIP_THRESHOLD", "0.4");
        env::set_var("SPARSE_RNN_QUANTIZATION_INTERVAL", "0.5");

        let mut cli_args = HashMap::new();
        cli_args.insert("clip_threshold".to_string(), "0.6".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for the threshold, env wins for the interval
        assert_eq!(config.graph.clip_threshold, 0.6);
        assert_eq!(config.graph.quantization_interval, 0.5);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[graph]\nclip_threshold = \"high\"\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
