//! Resq configuration module
//!
//! Provides the connection and key-layout settings a [`Client`](crate::client::Client)
//! is built from. There is no process-wide configuration; every client owns its own.

use crate::{Error, Result};

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default key namespace
pub const DEFAULT_NAMESPACE: &str = "resq";

/// Resq configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResqConfig {
    /// Redis connection URL
    pub redis_url: String,

    /// Prefix for every key written to the store (default: `resq`)
    pub namespace: String,

    /// Connection pool size (default: 10)
    pub pool_size: usize,
}

impl Default for ResqConfig {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            pool_size: 10,
        }
    }
}

impl ResqConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from environment variables
    ///
    /// Reads `RESQ_REDIS_URL` (falling back to `REDIS_URL`), `RESQ_NAMESPACE`
    /// and `RESQ_POOL_SIZE`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RESQ_REDIS_URL").or_else(|_| std::env::var("REDIS_URL")) {
            config.redis_url = url;
        }

        if let Ok(namespace) = std::env::var("RESQ_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Ok(size) = std::env::var("RESQ_POOL_SIZE") {
            config.pool_size = size
                .parse()
                .map_err(|e| Error::Config(format!("Invalid RESQ_POOL_SIZE '{}': {}", size, e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set Redis connection URL
    #[must_use]
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    /// Set key namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set connection pool size
    #[must_use]
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(Error::Config("namespace cannot be empty".into()));
        }

        if self.namespace.contains(':') {
            return Err(Error::Config(format!(
                "namespace must not contain ':', got {}",
                self.namespace
            )));
        }

        if self.pool_size == 0 {
            return Err(Error::Config("pool_size must be greater than 0".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResqConfig::default();
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.namespace, "resq");
        assert_eq!(config.pool_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ResqConfig::new()
            .with_redis_url("redis://cache:6380")
            .with_namespace("jobs")
            .with_pool_size(4);

        assert_eq!(config.redis_url, "redis://cache:6380");
        assert_eq!(config.namespace, "jobs");
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_validate() {
        assert!(ResqConfig::new().with_namespace("").validate().is_err());
        assert!(ResqConfig::new().with_namespace("a:b").validate().is_err());
        assert!(ResqConfig::new().with_pool_size(0).validate().is_err());
    }
}
