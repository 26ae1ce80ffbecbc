// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always goes to stderr so that stdout stays free for
//! command results (DOT text, evaluated sequences).

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Builds the filter from debug flags over `base_level`
pub fn build_env_filter(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string(base_level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Console-only logging
pub fn init_console_logging(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<()> {
    let env_filter = build_env_filter(debug_flags, base_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, Context, Result};
    use chrono::{NaiveDateTime, Utc};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    use super::build_env_filter;
    use crate::cli::CrateDebugFlags;

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the file writers alive; logs flush when dropped
    pub struct LoggingGuard {
        _file_guard: WorkerGuard,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Console logging plus a JSON log file in a timestamped run folder
    ///
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       └── sparse-rnn.log
    /// ```
    ///
    /// Only the `retention_runs` most recent run folders are kept (default 10).
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        base_level: &str,
        log_dir: Option<PathBuf>,
        retention_runs: Option<usize>,
    ) -> Result<LoggingGuard> {
        let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));
        let run_folder = base_log_dir.join(format!(
            "{}{}",
            RUN_PREFIX,
            Utc::now().format(RUN_FORMAT)
        ));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_runs(&base_log_dir, retention_runs.unwrap_or(10))?;

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(build_env_filter(debug_flags, base_level)?)
            .boxed();

        let (file_writer, file_guard) =
            tracing_appender::non_blocking(rolling::never(&run_folder, "sparse-rnn.log"));
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(build_env_filter(debug_flags, base_level)?)
            .boxed();

        Registry::default()
            .with(vec![console_layer, file_layer])
            .try_init()
            .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

        Ok(LoggingGuard {
            _file_guard: file_guard,
            log_dir: run_folder,
        })
    }

    /// Removes all but the `keep` newest `run_*` folders
    pub(crate) fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<usize> {
        if !base_log_dir.exists() {
            return Ok(0);
        }

        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_FORMAT).ok());
            if let Some(stamp) = stamp {
                runs.push((path, stamp));
            }
        }

        runs.sort_by_key(|(_, stamp)| *stamp);
        let excess = runs.len().saturating_sub(keep);
        for (path, _) in runs.iter().take(excess) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Ok(excess)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cleanup_keeps_newest_runs() {
            let dir = tempfile::tempdir().unwrap();
            for name in [
                "run_20250101_000000",
                "run_20250102_000000",
                "run_20250103_000000",
                "unrelated",
            ] {
                std::fs::create_dir(dir.path().join(name)).unwrap();
            }

            assert_eq!(cleanup_old_runs(dir.path(), 2).unwrap(), 1);
            assert!(!dir.path().join("run_20250101_000000").exists());
            assert!(dir.path().join("run_20250103_000000").exists());
            assert!(dir.path().join("unrelated").exists());
        }
    }
}
