//! Client SDK
//!
//! Provides the client context object and read-only statistics.

pub mod builder;

use crate::stat::Stat;
use crate::storage::{Keys, Store};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub use builder::{Client, ClientBuilder};

/// Statistics inspector
///
/// Read-only roll-up across queues, workers and counters.
pub struct Inspector {
    store: Arc<dyn Store>,
    keys: Keys,
}

impl Inspector {
    /// Create a new inspector
    pub fn new(store: Arc<dyn Store>, keys: Keys) -> Self {
        Self { store, keys }
    }

    /// Registered worker ids, sorted
    pub async fn workers(&self) -> Result<Vec<String>> {
        self.store.list_set(&self.keys.workers()).await
    }

    /// Workers with a job in progress, with their working slot
    pub async fn working(&self) -> Result<Vec<(String, Value)>> {
        let mut working = Vec::new();
        for id in self.workers().await? {
            if let Some(raw) = self.store.get(&self.keys.worker(&id)).await? {
                working.push((id, serde_json::from_str(&raw)?));
            }
        }
        Ok(working)
    }

    /// Aggregate statistics
    pub async fn info(&self) -> Result<Info> {
        let queues = self.store.list_set(&self.keys.queues()).await?;

        let mut pending = 0;
        for queue in &queues {
            pending += self.store.length(&self.keys.queue(queue)).await?;
        }

        let workers = self.workers().await?;
        let mut working = 0;
        for id in &workers {
            if self.store.get(&self.keys.worker(id)).await?.is_some() {
                working += 1;
            }
        }

        let stat = Stat::new(self.store.clone(), self.keys.clone());

        Ok(Info {
            pending,
            working,
            workers: workers.len() as u64,
            queues: queues.len() as u64,
            processed: stat.processed().await?,
            failed: stat.failed().await?,
            servers: self.store.servers(),
        })
    }
}

/// Aggregate statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    /// Payloads waiting across all registered queues
    pub pending: u64,
    /// Workers with a job in progress
    pub working: u64,
    /// Registered workers
    pub workers: u64,
    /// Registered queue names
    pub queues: u64,
    /// Jobs completed successfully
    pub processed: u64,
    /// Jobs that failed
    pub failed: u64,
    /// Backing store endpoints
    pub servers: Vec<String>,
}
