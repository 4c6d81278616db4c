//! Redis store
//!
//! Implements [`Store`] on a pooled `fred` connection.

use super::Store;
use crate::Result;
use async_trait::async_trait;
use fred::{
    interfaces::*,
    prelude::*,
    types::{ClusterHash, CustomCommand, RedisConfig as FredRedisConfig, ReconnectPolicy},
};
use std::sync::Arc;

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Connection pool size
    pub pool_size: usize,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: crate::config::DEFAULT_REDIS_URL.to_string(),
            pool_size: 10,
        }
    }
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisStore {
    pool: Arc<RedisPool>,
    servers: Vec<String>,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let redis_config = FredRedisConfig::from_url(&config.url)?;
        let servers = redis_config
            .server
            .hosts()
            .iter()
            .map(|server| format!("{}:{}", server.host, server.port))
            .collect();

        let pool = RedisPool::new(
            redis_config,
            None,
            None,
            Some(ReconnectPolicy::default()),
            config.pool_size,
        )?;

        pool.init().await?;
        tracing::debug!("Connected to Redis at {}", config.url);

        Ok(Self {
            pool: Arc::new(pool),
            servers,
        })
    }

    /// Connect from a URL with the default pool size
    pub async fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(RedisConfig {
            url: url.into(),
            ..Default::default()
        })
        .await
    }

    /// Get the underlying Redis connection pool
    pub fn pool(&self) -> &Arc<RedisPool> {
        &self.pool
    }

    /// Ping Redis
    pub async fn ping(&self) -> Result<String> {
        let result: String = self.pool.ping().await?;
        Ok(result)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn push(&self, key: &str, value: String) -> Result<u64> {
        let len: u64 = self.pool.rpush(key, value).await?;
        Ok(len)
    }

    async fn pop_head(&self, key: &str) -> Result<Option<String>> {
        // LPOP removes and returns in one command, so no two callers see the same element
        let value: Option<String> = self.pool.lpop(key, None).await?;
        Ok(value)
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let values: Vec<String> = self.pool.lrange(key, start, stop).await?;
        Ok(values)
    }

    async fn length(&self, key: &str) -> Result<u64> {
        let len: u64 = self.pool.llen(key).await?;
        Ok(len)
    }

    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool> {
        let added: u64 = self.pool.sadd(key, member.to_string()).await?;
        Ok(added > 0)
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<bool> {
        let removed: u64 = self.pool.srem(key, member.to_string()).await?;
        Ok(removed > 0)
    }

    async fn list_set(&self, key: &str) -> Result<Vec<String>> {
        let mut members: Vec<String> = self.pool.smembers(key).await?;
        members.sort();
        Ok(members)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.pool.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _: () = self.pool.set(key, value, None, None, false).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let value: i64 = self.pool.incr(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let deleted: u64 = self.pool.del(key).await?;
        Ok(deleted > 0)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let command = CustomCommand::new_static("KEYS", ClusterHash::FirstKey, false);
        let mut keys: Vec<String> = self
            .pool
            .next()
            .custom(command, vec![format!("{}*", prefix)])
            .await?;
        keys.sort();
        Ok(keys)
    }

    async fn flush_all(&self) -> Result<()> {
        let _: () = self.pool.next().flushall(false).await?;
        Ok(())
    }

    fn servers(&self) -> Vec<String> {
        self.servers.clone()
    }
}
