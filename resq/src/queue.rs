//! Queue engine
//!
//! Strict FIFO queues of serialized payloads. Each queue is a list at
//! `<ns>:queue:<name>`; names are registered in the `<ns>:queues` set on push.

use crate::observability::ResqMetrics;
use crate::payload::Payload;
use crate::storage::{Keys, Store};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// Result of a [`Queue::peek`]
#[derive(Debug, Clone, PartialEq)]
pub enum Peek {
    /// Single-element peek (`count == 1`)
    One(Option<Payload>),
    /// Multi-element peek
    Many(Vec<Payload>),
}

impl Peek {
    /// First payload, if any
    pub fn one(self) -> Option<Payload> {
        match self {
            Peek::One(payload) => payload,
            Peek::Many(payloads) => payloads.into_iter().next(),
        }
    }

    /// All payloads
    pub fn many(self) -> Vec<Payload> {
        match self {
            Peek::One(payload) => payload.into_iter().collect(),
            Peek::Many(payloads) => payloads,
        }
    }

    /// Check if nothing was read
    pub fn is_empty(&self) -> bool {
        match self {
            Peek::One(payload) => payload.is_none(),
            Peek::Many(payloads) => payloads.is_empty(),
        }
    }
}

/// Queue operations over a store
#[derive(Clone)]
pub struct Queue {
    store: Arc<dyn Store>,
    keys: Keys,
    metrics: Option<ResqMetrics>,
}

impl Queue {
    /// Create queue access over a store
    pub fn new(store: Arc<dyn Store>, keys: Keys) -> Self {
        Self {
            store,
            keys,
            metrics: None,
        }
    }

    /// Record pushes in a metrics collector
    #[must_use]
    pub fn with_metrics(mut self, metrics: Option<ResqMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Push a JSON object body, returning the generated uuid
    pub async fn push(&self, queue: &str, body: Value) -> Result<String> {
        let payload = Payload::from_body(body)?;
        self.push_payload(queue, &payload).await?;
        Ok(payload.uuid().to_string())
    }

    /// Push an already built payload, keeping its uuid
    pub async fn push_payload(&self, queue: &str, payload: &Payload) -> Result<()> {
        let record = payload.encode()?;

        self.store.push(&self.keys.queue(queue), record).await?;
        self.store.add_to_set(&self.keys.queues(), queue).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_pushed(queue);
        }

        tracing::debug!("Pushed {} to queue {}", payload.uuid(), queue);
        Ok(())
    }

    /// Remove and return the head of a queue
    pub async fn pop(&self, queue: &str) -> Result<Option<Payload>> {
        match self.store.pop_head(&self.keys.queue(queue)).await? {
            Some(record) => {
                let payload = Payload::decode(&record)?;
                tracing::debug!("Popped {} from queue {}", payload.uuid(), queue);
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }

    /// Read `count` payloads starting at `start` without removing them
    ///
    /// Out-of-range reads yield an empty result.
    pub async fn peek(&self, queue: &str, start: usize, count: usize) -> Result<Peek> {
        let empty = || {
            if count == 1 {
                Peek::One(None)
            } else {
                Peek::Many(Vec::new())
            }
        };

        if count == 0 {
            return Ok(empty());
        }

        // Negative indexes count from the tail, so never let `start` wrap.
        let Ok(first) = i64::try_from(start) else {
            return Ok(empty());
        };
        let last = i64::try_from(start.saturating_add(count - 1)).unwrap_or(i64::MAX);

        let records = self
            .store
            .range(&self.keys.queue(queue), first, last)
            .await?;

        let mut payloads = records
            .iter()
            .map(|record| Payload::decode(record))
            .collect::<Result<Vec<_>>>()?;

        if count == 1 {
            Ok(Peek::One(payloads.pop()))
        } else {
            Ok(Peek::Many(payloads))
        }
    }

    /// Number of payloads in a queue
    pub async fn size(&self, queue: &str) -> Result<u64> {
        self.store.length(&self.keys.queue(queue)).await
    }

    /// Registered queue names, sorted
    pub async fn names(&self) -> Result<Vec<String>> {
        self.store.list_set(&self.keys.queues()).await
    }

    /// Delete a queue and unregister its name
    ///
    /// Removing an absent queue is not an error.
    pub async fn remove(&self, queue: &str) -> Result<()> {
        self.store.delete(&self.keys.queue(queue)).await?;
        self.store.remove_from_set(&self.keys.queues(), queue).await?;
        tracing::debug!("Removed queue {}", queue);
        Ok(())
    }

    /// Find a still-queued payload by uuid
    pub async fn find(&self, uuid: &str) -> Result<Option<(String, Payload)>> {
        for queue in self.names().await? {
            let records = self.store.range(&self.keys.queue(&queue), 0, -1).await?;
            for record in records {
                let payload = Payload::decode(&record)?;
                if payload.uuid() == uuid {
                    return Ok(Some((queue, payload)));
                }
            }
        }
        Ok(None)
    }
}
