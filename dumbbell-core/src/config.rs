use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const POOL_SIZE: &str = "DUMBBELL_POOL_SIZE";
pub const BUSY_TIMEOUT_MS: &str = "DUMBBELL_BUSY_TIMEOUT_MS";
pub const CONNECT_TIMEOUT_MS: &str = "DUMBBELL_CONNECT_TIMEOUT_MS";

const DEFAULT_POOL_SIZE: u32 = 4;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// How to reach the SQLite file backing the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
    /// How long to wait for a pooled connection before giving up.
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .with_context(|| format!("{DATABASE_URL} must be specified or present in the environment"))?;

        let mut config = Self::new(database_url);

        if let Some(size) = lookup(POOL_SIZE) {
            config.pool_size = size
                .trim()
                .parse()
                .with_context(|| format!("{POOL_SIZE} is not a number: {size:?}"))?;
            if config.pool_size == 0 {
                bail!("{POOL_SIZE} must be at least 1");
            }
        }

        if let Some(ms) = lookup(BUSY_TIMEOUT_MS) {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("{BUSY_TIMEOUT_MS} is not a number: {ms:?}"))?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        if let Some(ms) = lookup(CONNECT_TIMEOUT_MS) {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("{CONNECT_TIMEOUT_MS} is not a number: {ms:?}"))?;
            if ms == 0 {
                bail!("{CONNECT_TIMEOUT_MS} must be at least 1");
            }
            config.connect_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[(DATABASE_URL, "gym.db")])).unwrap();
        assert_eq!(config, StoreConfig::new("gym.db"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (DATABASE_URL, "gym.db"),
            (POOL_SIZE, "8"),
            (BUSY_TIMEOUT_MS, "250"),
            (CONNECT_TIMEOUT_MS, "1500"),
        ]))
        .unwrap();
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));
    }

    #[rstest]
    #[case::missing_url(&[])]
    #[case::blank_url(&[(DATABASE_URL, "  ")])]
    #[case::zero_pool(&[(DATABASE_URL, "gym.db"), (POOL_SIZE, "0")])]
    #[case::bad_pool(&[(DATABASE_URL, "gym.db"), (POOL_SIZE, "many")])]
    #[case::bad_timeout(&[(DATABASE_URL, "gym.db"), (BUSY_TIMEOUT_MS, "-1")])]
    #[case::zero_connect_timeout(&[(DATABASE_URL, "gym.db"), (CONNECT_TIMEOUT_MS, "0")])]
    fn test_rejects(#[case] vars: &[(&str, &str)]) {
        assert!(StoreConfig::from_lookup(lookup(vars)).is_err());
    }
}
