use anyhow::{ensure, Result};
use std::sync::OnceLock;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Task layout for the parallel kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositConfig {
    /// Number of tasks, each with its own scratch grid.
    pub worker_count: usize,
    /// Consecutive particles claimed by a task at a time.
    pub chunk_size: usize,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}

impl DepositConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.worker_count > 0, "worker_count must be > 0");
        ensure!(self.chunk_size > 0, "chunk_size must be > 0");
        Ok(())
    }

    /// Defaults overridden by `DEPOSIT_WORKERS` and `DEPOSIT_CHUNK`. Read once
    /// per process; unparsable or zero values fall back to the defaults.
    pub fn from_env() -> Self {
        static CONFIG: OnceLock<DepositConfig> = OnceLock::new();
        *CONFIG.get_or_init(|| {
            let defaults = DepositConfig::default();
            DepositConfig {
                worker_count: env_usize("DEPOSIT_WORKERS").unwrap_or(defaults.worker_count),
                chunk_size: env_usize("DEPOSIT_CHUNK").unwrap_or(defaults.chunk_size),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_four_workers_of_sixteen() {
        let config = DepositConfig::default();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.chunk_size, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_override_fields() {
        let config = DepositConfig::default()
            .with_worker_count(7)
            .with_chunk_size(64);
        assert_eq!(config, DepositConfig { worker_count: 7, chunk_size: 64 });
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let err = DepositConfig::default()
            .with_worker_count(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("worker_count"));
    }

    #[test]
    fn validate_rejects_zero_chunk() {
        assert!(DepositConfig::default().with_chunk_size(0).validate().is_err());
    }

    #[test]
    fn from_env_is_always_valid() {
        assert!(DepositConfig::from_env().validate().is_ok());
    }
}
