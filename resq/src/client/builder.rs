//! Client builder and context object

use crate::config::ResqConfig;
use crate::job::Job;
use crate::observability::ResqMetrics;
use crate::payload::Payload;
use crate::processor::{JobClass, Registry};
use crate::queue::{Peek, Queue};
use crate::stat::Stat;
use crate::status::StatusTracker;
use crate::storage::{Keys, RedisConfig, RedisStore, Store};
use crate::worker::{Worker, WorkerBuilder};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

use super::{Info, Inspector};

/// Client - queue context
///
/// Owns the store handle, key layout, job registry and optional metrics.
/// Cloning is cheap; every component receives a client explicitly.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn Store>,
    keys: Keys,
    registry: Arc<Registry>,
    metrics: Option<ResqMetrics>,
}

impl Client {
    /// Create a new Client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Queue engine
    pub fn queue(&self) -> Queue {
        Queue::new(self.store.clone(), self.keys.clone()).with_metrics(self.metrics.clone())
    }

    /// Status tracker
    pub fn status(&self) -> StatusTracker {
        StatusTracker::new(self.store.clone(), self.keys.clone())
    }

    /// Global counters
    pub fn stats(&self) -> Stat {
        Stat::new(self.store.clone(), self.keys.clone())
    }

    /// Read-only statistics
    pub fn inspector(&self) -> Inspector {
        Inspector::new(self.store.clone(), self.keys.clone())
    }

    /// Registered job classes
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Key layout
    pub fn layout(&self) -> &Keys {
        &self.keys
    }

    /// Metrics collector, if enabled
    pub fn metrics(&self) -> Option<&ResqMetrics> {
        self.metrics.as_ref()
    }

    /// Push a JSON object body, returning its uuid
    pub async fn push(&self, queue: &str, body: Value) -> Result<String> {
        self.queue().push(queue, body).await
    }

    /// Pop the head of a queue
    pub async fn pop(&self, queue: &str) -> Result<Option<Payload>> {
        self.queue().pop(queue).await
    }

    /// Peek at a queue without removing anything
    pub async fn peek(&self, queue: &str, start: usize, count: usize) -> Result<Peek> {
        self.queue().peek(queue, start, count).await
    }

    /// Number of payloads in a queue
    pub async fn size(&self, queue: &str) -> Result<u64> {
        self.queue().size(queue).await
    }

    /// Registered queue names, sorted
    pub async fn queues(&self) -> Result<Vec<String>> {
        self.queue().names().await
    }

    /// Delete a queue
    pub async fn remove_queue(&self, queue: &str) -> Result<()> {
        self.queue().remove(queue).await
    }

    /// Find a still-queued payload by uuid
    pub async fn find(&self, uuid: &str) -> Result<Option<Payload>> {
        Ok(self.queue().find(uuid).await?.map(|(_, payload)| payload))
    }

    /// Set a status value
    pub async fn set_status(&self, uuid: &str, value: impl Into<Value>) -> Result<()> {
        self.status().set(uuid, value).await
    }

    /// Get a status value
    pub async fn get_status(&self, uuid: &str) -> Result<Option<Value>> {
        self.status().get(uuid).await
    }

    /// Enqueue a registered class on its declared queue
    pub async fn enqueue(&self, class: &str, args: Vec<Value>) -> Result<String> {
        if class.trim().is_empty() {
            return Err(Error::NoClass);
        }

        let job_class = self.registry.resolve(class)?;
        let queue = job_class
            .default_queue()
            .ok_or_else(|| Error::NoQueue(job_class.name().to_string()))?;

        Job::create(self, queue, job_class.name(), args).await
    }

    /// Create a job on an explicit queue
    pub async fn create_job(&self, queue: &str, class: &str, args: Vec<Value>) -> Result<String> {
        Job::create(self, queue, class, args).await
    }

    /// Reserve the next job from a queue
    pub async fn reserve(&self, queue: &str) -> Result<Option<Job>> {
        Job::reserve(self, queue).await
    }

    /// Aggregate statistics
    pub async fn info(&self) -> Result<Info> {
        self.inspector().info().await
    }

    /// Keys present in the namespace, prefix stripped, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let keys = self.store.keys(&self.keys.prefix()).await?;
        let mut stripped: Vec<String> = keys
            .iter()
            .filter_map(|key| self.keys.strip(key))
            .map(str::to_string)
            .collect();
        stripped.sort();
        Ok(stripped)
    }

    /// Remove every key in the store (test-only)
    pub async fn flush_all(&self) -> Result<()> {
        self.store.flush_all().await
    }

    /// Worker for a list of queues, with default identity
    pub fn worker<I, S>(&self, queues: I) -> Result<Worker>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worker_builder().queues(queues).build()
    }

    /// Worker builder bound to this client
    pub fn worker_builder(&self) -> WorkerBuilder {
        WorkerBuilder::new(self.clone())
    }
}

/// Client builder
#[derive(Default)]
pub struct ClientBuilder {
    config: ResqConfig,
    registry: Registry,
    store: Option<Arc<dyn Store>>,
    metrics: bool,
}

impl ClientBuilder {
    /// Set Redis URL
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_redis_url(url);
        self
    }

    /// Set key namespace
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config = self.config.with_namespace(namespace);
        self
    }

    /// Set connection pool size
    #[must_use]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config = self.config.with_pool_size(size);
        self
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: ResqConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the job registry
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Register one job class
    pub fn register(mut self, class: JobClass) -> Result<Self> {
        self.registry.register(class)?;
        Ok(self)
    }

    /// Use a custom store instead of connecting to Redis
    #[must_use]
    pub fn store(mut self, store: impl Store + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Enable Prometheus metrics
    #[must_use]
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<Client> {
        self.config.validate()?;

        let store: Arc<dyn Store> = match self.store {
            Some(store) => store,
            None => {
                let redis = RedisStore::new(RedisConfig {
                    url: self.config.redis_url.clone(),
                    pool_size: self.config.pool_size,
                })
                .await?;
                Arc::new(redis)
            }
        };

        let metrics = if self.metrics {
            Some(ResqMetrics::new().map_err(|e| Error::Config(format!("metrics: {}", e)))?)
        } else {
            None
        };

        tracing::debug!(
            "Client ready (namespace: {}, classes: {})",
            self.config.namespace,
            self.registry.len()
        );

        Ok(Client {
            store,
            keys: Keys::new(self.config.namespace),
            registry: Arc::new(self.registry),
            metrics,
        })
    }
}
