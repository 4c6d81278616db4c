//! Storage layer
//!
//! Provides the store abstraction every component talks to, with a Redis
//! implementation and an in-process one.
//!
//! Adapters move opaque strings only; serialization happens in the callers.
//! Transport failures are returned as-is and never retried here.

pub mod keys;
pub mod memory;
pub mod redis;

pub use keys::Keys;
pub use memory::MemoryStore;
pub use redis::{RedisConfig, RedisStore};

use crate::Result;
use async_trait::async_trait;

/// Key-value/list/set store contract
///
/// List indices follow `LRANGE` rules: `stop` is inclusive and negative
/// indices count from the tail.
#[async_trait]
pub trait Store: Send + Sync {
    /// Append a value to the tail of a list, returning the new length
    async fn push(&self, key: &str, value: String) -> Result<u64>;

    /// Atomically remove and return the head of a list
    async fn pop_head(&self, key: &str) -> Result<Option<String>>;

    /// Read a range of a list without modifying it
    async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Length of a list (0 if absent)
    async fn length(&self, key: &str) -> Result<u64>;

    /// Add a member to a set, returning whether it was newly added
    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool>;

    /// Remove a member from a set, returning whether it was present
    async fn remove_from_set(&self, key: &str, member: &str) -> Result<bool>;

    /// Members of a set, sorted
    async fn list_set(&self, key: &str) -> Result<Vec<String>>;

    /// Read a scalar value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a scalar value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Increment an integer counter, returning the new value
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Delete a key of any type, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, sorted
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove every key (test-only)
    async fn flush_all(&self) -> Result<()>;

    /// Endpoints this store talks to, as `host:port`
    fn servers(&self) -> Vec<String>;
}
