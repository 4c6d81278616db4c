//! Global counters
//!
//! Monotonic, process-wide counters kept in the store under `<ns>:stat:<name>`.

use crate::storage::{Keys, Store};
use crate::{Error, Result};
use std::sync::Arc;

/// Counter of successfully completed jobs
pub const PROCESSED: &str = "processed";

/// Counter of failed jobs
pub const FAILED: &str = "failed";

/// Global counter access
#[derive(Clone)]
pub struct Stat {
    store: Arc<dyn Store>,
    keys: Keys,
}

impl Stat {
    /// Create counter access over a store
    pub fn new(store: Arc<dyn Store>, keys: Keys) -> Self {
        Self { store, keys }
    }

    /// Read a counter (0 if never incremented)
    pub async fn get(&self, name: &str) -> Result<u64> {
        match self.store.get(&self.keys.stat(name)).await? {
            Some(value) => value.parse().map_err(|e| {
                Error::Serialization(format!("counter {} holds {:?}: {}", name, value, e))
            }),
            None => Ok(0),
        }
    }

    /// Increment a counter, returning the new value
    pub async fn incr(&self, name: &str) -> Result<u64> {
        let value = self.store.incr(&self.keys.stat(name)).await?;
        Ok(value.max(0) as u64)
    }

    /// Number of processed jobs
    pub async fn processed(&self) -> Result<u64> {
        self.get(PROCESSED).await
    }

    /// Number of failed jobs
    pub async fn failed(&self) -> Result<u64> {
        self.get(FAILED).await
    }

    pub(crate) async fn incr_processed(&self) -> Result<u64> {
        self.incr(PROCESSED).await
    }

    pub(crate) async fn incr_failed(&self) -> Result<u64> {
        self.incr(FAILED).await
    }
}
