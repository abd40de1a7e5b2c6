//! Evaluator service configuration.
//!
//! Provides [`EvaluatorConfig`] with defaults for the data directory, the
//! incentive pool, and logging. Hosts either build it programmatically or
//! load overrides from `DACE_*` environment variables.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use dace_core::constants::DEFAULT_INCENTIVE_POOL;

/// Configuration for an evaluator instance.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// Pool size used by [`Evaluator::distribute_default`](crate::Evaluator::distribute_default).
    pub default_pool_size: u64,
    /// Log level filter string (e.g. "info", "debug", "dace_node=trace").
    pub log_level: String,
    /// Log output format: "json" or "text".
    pub log_format: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dace");

        Self {
            data_dir,
            default_pool_size: DEFAULT_INCENTIVE_POOL,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl EvaluatorConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `DACE_DATA_DIR` | `data_dir` |
    /// | `DACE_POOL_SIZE` | `default_pool_size` |
    /// | `DACE_LOG_LEVEL` | `log_level` |
    /// | `DACE_LOG_FORMAT` | `log_format` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let data_dir = lookup("DACE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let default_pool_size = match lookup("DACE_POOL_SIZE") {
            Some(raw) => {
                let size: u64 = raw
                    .trim()
                    .parse()
                    .context("DACE_POOL_SIZE must be a positive integer")?;
                if size == 0 {
                    bail!("DACE_POOL_SIZE must be a positive integer");
                }
                size
            }
            None => defaults.default_pool_size,
        };

        let log_level = lookup("DACE_LOG_LEVEL").unwrap_or(defaults.log_level);
        let log_format = lookup("DACE_LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self {
            data_dir,
            default_pool_size,
            log_level,
            log_format,
        })
    }

    /// Path to the RocksDB state directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("evaluator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_pool_size() {
        let cfg = EvaluatorConfig::default();
        assert_eq!(cfg.default_pool_size, DEFAULT_INCENTIVE_POOL);
    }

    #[test]
    fn default_log_settings() {
        let cfg = EvaluatorConfig::default();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_format, "text");
    }

    #[test]
    fn default_data_dir_ends_with_dace() {
        let cfg = EvaluatorConfig::default();
        assert!(
            cfg.data_dir.ends_with("dace"),
            "data_dir should end with 'dace': {:?}",
            cfg.data_dir
        );
    }

    #[test]
    fn db_path_appends_evaluator() {
        let cfg = EvaluatorConfig {
            data_dir: PathBuf::from("/tmp/dace-test"),
            ..EvaluatorConfig::default()
        };
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/dace-test/evaluator"));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = EvaluatorConfig::from_lookup(lookup(&[])).unwrap();
        let defaults = EvaluatorConfig::default();
        assert_eq!(cfg.data_dir, defaults.data_dir);
        assert_eq!(cfg.default_pool_size, defaults.default_pool_size);
    }

    #[test]
    fn environment_overrides() {
        let cfg = EvaluatorConfig::from_lookup(lookup(&[
            ("DACE_DATA_DIR", "/var/lib/dace"),
            ("DACE_POOL_SIZE", " 5000 "),
            ("DACE_LOG_LEVEL", "debug"),
            ("DACE_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/dace"));
        assert_eq!(cfg.default_pool_size, 5000);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_format, "json");
    }

    #[test]
    fn invalid_pool_size_is_an_error() {
        for bad in ["abc", "-5", "0", ""] {
            let err = EvaluatorConfig::from_lookup(lookup(&[("DACE_POOL_SIZE", bad)])).unwrap_err();
            assert!(
                err.to_string().contains("DACE_POOL_SIZE"),
                "unexpected error for {bad:?}: {err}"
            );
        }
    }

    #[test]
    fn config_is_clone_and_debug() {
        let cfg = EvaluatorConfig::default();
        let cfg2 = cfg.clone();
        let debug = format!("{cfg2:?}");
        assert!(debug.contains("EvaluatorConfig"));
    }
}
