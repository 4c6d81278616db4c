//! Job status tracking
//!
//! Status values are stored independently of queue membership, keyed by the
//! payload uuid, so they outlive the job's time on the queue. Values are
//! free-form JSON and never expire.

use crate::storage::{Keys, Store};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// uuid → status mapping
#[derive(Clone)]
pub struct StatusTracker {
    store: Arc<dyn Store>,
    keys: Keys,
}

impl StatusTracker {
    /// Create a tracker over a store
    pub fn new(store: Arc<dyn Store>, keys: Keys) -> Self {
        Self { store, keys }
    }

    /// Set the status for a uuid, replacing any previous value
    pub async fn set(&self, uuid: &str, value: impl Into<Value>) -> Result<()> {
        let encoded = serde_json::to_string(&value.into())?;
        self.store.set(&self.keys.status(uuid), encoded).await?;
        tracing::trace!("Status updated for job {}", uuid);
        Ok(())
    }

    /// Get the status for a uuid
    pub async fn get(&self, uuid: &str) -> Result<Option<Value>> {
        match self.store.get(&self.keys.status(uuid)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Status sink bound to one uuid
    pub fn sink(&self, uuid: impl Into<String>) -> StatusSink {
        StatusSink {
            uuid: Arc::new(uuid.into()),
            tracker: self.clone(),
        }
    }
}

/// Status reporter handed to job instances
///
/// # Example
///
/// ```rust
/// use resq::processor::{JobResult, Performable};
/// use resq::status::StatusSink;
/// use resq::async_trait;
/// use serde_json::Value;
///
/// struct Import {
///     status: Option<StatusSink>,
/// }
///
/// #[async_trait]
/// impl Performable for Import {
///     async fn perform(&mut self) -> JobResult {
///         if let Some(status) = &self.status {
///             status.set("importing").await?;
///         }
///         Ok(Value::Null)
///     }
///
///     fn bind_status(&mut self, status: StatusSink) {
///         self.status = Some(status);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct StatusSink {
    uuid: Arc<String>,
    tracker: StatusTracker,
}

impl StatusSink {
    /// uuid this sink reports for
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Report a status value
    pub async fn set(&self, value: impl Into<Value>) -> Result<()> {
        self.tracker.set(&self.uuid, value).await
    }

    /// Read the current status value
    pub async fn get(&self) -> Result<Option<Value>> {
        self.tracker.get(&self.uuid).await
    }
}

impl std::fmt::Debug for StatusSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusSink").field("uuid", &self.uuid).finish()
    }
}
