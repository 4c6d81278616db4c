//! Job
//!
//! A job is a payload bound to the queue it came from. It owns creation
//! validation, equality, execution dispatch and status delegation.

use crate::client::Client;
use crate::error::BoxError;
use crate::observability::Timer;
use crate::payload::Payload;
use crate::processor::{canonical_class_name, Dispatch, JobClass, JobResult, Performable, Registry};
use crate::status::StatusSink;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A payload bound to its originating queue
#[derive(Debug, Clone)]
pub struct Job {
    queue: String,
    payload: Payload,
}

impl Job {
    /// Bind a payload to a queue
    pub fn new(queue: impl Into<String>, payload: Payload) -> Self {
        Self {
            queue: queue.into(),
            payload,
        }
    }

    /// Create a job and push it, returning its uuid
    ///
    /// Fails with [`Error::NoClass`] for an empty class name and
    /// [`Error::NoQueue`] for an empty queue name.
    pub async fn create(client: &Client, queue: &str, class: &str, args: Vec<Value>) -> Result<String> {
        let class = class.trim();
        if class.is_empty() {
            return Err(Error::NoClass);
        }

        if queue.trim().is_empty() {
            return Err(Error::NoQueue(class.to_string()));
        }

        let payload = Payload::new(Payload::job_body(class, args));
        client.queue().push_payload(queue, &payload).await?;
        Ok(payload.uuid().to_string())
    }

    /// Pop the next job from a queue
    pub async fn reserve(client: &Client, queue: &str) -> Result<Option<Job>> {
        let payload = client.queue().pop(queue).await?;
        Ok(payload.map(|payload| Job::new(queue, payload)))
    }

    /// Queue this job was reserved from
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Underlying payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Tracking identifier
    pub fn uuid(&self) -> &str {
        self.payload.uuid()
    }

    /// Class name as stored in the payload
    pub fn class_name(&self) -> Option<&str> {
        self.payload.class_name()
    }

    /// Argument list
    pub fn args(&self) -> &[Value] {
        self.payload.args()
    }

    /// Resolve the job class
    pub fn payload_class(&self, registry: &Registry) -> Result<Arc<JobClass>> {
        self.payload.resolve_class(registry)
    }

    /// Perform the job
    ///
    /// Resolution and handler errors bump the `failed` counter before being
    /// returned. The caller is responsible for `processed`.
    pub async fn perform(&self, client: &Client) -> Result<Value> {
        let class = match self.payload_class(client.registry()) {
            Ok(class) => class,
            Err(e) => {
                let class = self.class_name().unwrap_or_default();
                self.record_failure(client, class, "class_resolution").await?;
                tracing::warn!("Job {} on {} could not be resolved: {}", self.uuid(), self.queue, e);
                return Err(e);
            }
        };

        let timer = client
            .metrics()
            .map(|metrics| Timer::start(metrics.clone(), &self.queue, class.name()));

        let outcome = match class.dispatch() {
            Some(Dispatch::Perform(handler)) => handler.perform(self.args()).await,
            Some(Dispatch::WithJob(constructor)) => {
                run_instance(constructor(self), client.status().sink(self.uuid())).await
            }
            Some(Dispatch::WithArgs(constructor)) => {
                run_instance(constructor(self.args()), client.status().sink(self.uuid())).await
            }
            None => Err(format!("job class {} has no entry point", class.name()).into()),
        };

        match outcome {
            Ok(value) => {
                if let Some(timer) = timer {
                    timer.stop();
                }
                tracing::debug!("Performed {}", self);
                Ok(value)
            }
            Err(source) => {
                self.record_failure(client, class.name(), "execution").await?;
                tracing::warn!("Job {} failed: {}", self, source);
                Err(Error::JobExecution {
                    class: class.name().to_string(),
                    source,
                })
            }
        }
    }

    /// Push an equivalent job (same queue and body) under a new uuid
    pub async fn recreate(&self, client: &Client) -> Result<String> {
        let payload = Payload::new(self.payload.body().clone());
        client.queue().push_payload(&self.queue, &payload).await?;
        Ok(payload.uuid().to_string())
    }

    /// Current status value
    pub async fn status(&self, client: &Client) -> Result<Option<Value>> {
        client.status().get(self.uuid()).await
    }

    /// Set the status value
    pub async fn set_status(&self, client: &Client, value: impl Into<Value>) -> Result<()> {
        client.status().set(self.uuid(), value).await
    }

    async fn record_failure(&self, client: &Client, class: &str, error_type: &str) -> Result<()> {
        client.stats().incr_failed().await?;
        if let Some(metrics) = client.metrics() {
            metrics.record_failed(&self.queue, class, error_type);
        }
        Ok(())
    }
}

async fn run_instance(
    instance: std::result::Result<Box<dyn Performable>, BoxError>,
    status: StatusSink,
) -> JobResult {
    let mut instance = instance?;
    instance.bind_status(status);
    instance.perform().await
}

/// Jobs are equal when queue, class and arguments match; the uuid is ignored
impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.queue == other.queue
            && self.class_name().map(canonical_class_name) == other.class_name().map(canonical_class_name)
            && self.args() == other.args()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args()
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "(Job{{{}}} | {} | [{}])",
            self.queue,
            self.class_name().unwrap_or_default(),
            args
        )
    }
}
