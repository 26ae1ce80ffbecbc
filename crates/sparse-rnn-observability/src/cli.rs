// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-sparse-rnn-engine` to raise one crate's
//! logging to debug without touching the rest.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates with debug logging switched on
///
/// # Example
/// ```rust
/// use sparse_rnn_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-sparse-rnn-engine".to_string()]);
/// assert!(flags.is_enabled("sparse-rnn-engine"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Looks for arguments matching `--debug-{crate-name}`. `--debug-all`
    /// enables every known crate.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }
        flags
    }

    /// Merges a `SPARSE_RNN_DEBUG` style value: `all`, or comma-separated
    /// crate names
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enabled_crates.insert(crate_name.to_string());
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives: one `{crate}=debug` per enabled crate, then
    /// `base_level` for everything else
    pub fn to_filter_string(&self, base_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name))
            .collect();
        filters.push(base_level.to_string());
        filters.join(",")
    }
}

/// Debug flags from the process arguments and the `SPARSE_RNN_DEBUG`
/// environment variable
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("SPARSE_RNN_DEBUG") {
        flags.merge_env_value(&value);
    }
    flags
}

/// Help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  SPARSE_RNN_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  SPARSE_RNN_DEBUG=all                             Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-sparse-rnn-engine".to_string()]);
        assert!(flags.is_enabled("sparse-rnn-engine"));
        assert!(!flags.is_enabled("sparse-rnn-serialization"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "sparse-rnn".to_string(),
            "eval".to_string(),
            "--graph".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_env_value_merges() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(" sparse-rnn-config , ,sparse-rnn-cli");
        assert!(flags.is_enabled("sparse-rnn-config"));
        assert!(flags.is_enabled("sparse-rnn-cli"));
        assert_eq!(flags.enabled_crates.len(), 2);

        flags.merge_env_value("all");
        assert_eq!(flags.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-sparse-rnn-serialization".to_string(),
            "--debug-sparse-rnn-engine".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string("warn"),
            "sparse-rnn-engine=debug,sparse-rnn-serialization=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-sparse-rnn-engine".to_string()]);
        assert_eq!(flags.log_level("sparse-rnn-engine"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("sparse-rnn-config"), tracing::Level::INFO);
    }
}
