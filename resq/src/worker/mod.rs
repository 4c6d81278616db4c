//! Worker implementation
//!
//! Workers register their presence, reserve jobs from their queues, record
//! what they are working on and bump the global counters.
//!
//! State machine: `Idle -> Reserving -> Working -> Idle`, with `Reserving`
//! falling back to `Idle` when every queue is empty. Nothing here blocks or
//! polls; run loops with backoff belong to the caller.

use crate::client::Client;
use crate::job::Job;
use crate::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queue name meaning "every registered queue"
pub const ALL_QUEUES: &str = "*";

/// Worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Waiting for work
    Idle,
    /// Looking for a job
    Reserving,
    /// Performing a job
    Working,
}

/// "Currently working on" record stored at `<ns>:worker:<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingOn {
    /// Queue the job was reserved from
    pub queue: String,

    /// Time the job started (RFC 3339)
    pub run_at: String,

    /// Stored record of the job payload
    pub payload: Value,
}

/// Worker - job processing unit
pub struct Worker {
    id: String,
    queues: Vec<String>,
    client: Client,
    state: WorkerState,
    current: Option<Job>,
}

impl Worker {
    /// Worker identity: `<hostname>:<pid>:<queue,queue>`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configured queues, in priority order
    pub fn queues(&self) -> &[String] {
        &self.queues
    }

    /// Current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Job being worked on, if any
    pub fn current_job(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    /// Add this worker to the registry
    pub async fn register_worker(&self) -> Result<()> {
        let layout = self.client.layout();
        self.client
            .store()
            .add_to_set(&layout.workers(), &self.id)
            .await?;
        tracing::info!("Worker {} registered", self.id);
        Ok(())
    }

    /// Remove this worker and its working slot from the registry
    pub async fn unregister_worker(&self) -> Result<()> {
        let layout = self.client.layout();
        self.client.store().delete(&layout.worker(&self.id)).await?;
        self.client
            .store()
            .remove_from_set(&layout.workers(), &self.id)
            .await?;
        tracing::info!("Worker {} unregistered", self.id);
        Ok(())
    }

    /// Queues to try, with `*` expanded to every registered queue
    pub async fn resolved_queues(&self) -> Result<Vec<String>> {
        let mut resolved: Vec<String> = Vec::with_capacity(self.queues.len());
        for queue in &self.queues {
            let names = if queue == ALL_QUEUES {
                self.client.queues().await?
            } else {
                vec![queue.clone()]
            };

            for name in names {
                if !resolved.contains(&name) {
                    resolved.push(name);
                }
            }
        }
        Ok(resolved)
    }

    /// Reserve the first available job across the configured queues
    pub async fn reserve(&mut self) -> Result<Option<Job>> {
        self.state = WorkerState::Reserving;

        let reserved = self.try_reserve().await;
        if !matches!(reserved, Ok(Some(_))) {
            self.state = WorkerState::Idle;
        }
        reserved
    }

    async fn try_reserve(&self) -> Result<Option<Job>> {
        for queue in self.resolved_queues().await? {
            tracing::trace!("Worker {} checking {}", self.id, queue);
            if let Some(job) = Job::reserve(&self.client, &queue).await? {
                tracing::debug!("Worker {} reserved {}", self.id, job);
                return Ok(Some(job));
            }
        }
        Ok(None)
    }

    /// Record a job as in progress
    pub async fn working_on(&mut self, job: Job) -> Result<()> {
        let record = WorkingOn {
            queue: job.queue().to_string(),
            run_at: Utc::now().to_rfc3339(),
            payload: job.payload().to_record(),
        };

        let encoded = serde_json::to_string(&record)?;
        self.client
            .store()
            .set(&self.client.layout().worker(&self.id), encoded)
            .await?;

        self.current = Some(job);
        self.state = WorkerState::Working;
        Ok(())
    }

    /// Clear the working slot after a successful job and bump `processed`
    pub async fn done_working(&mut self) -> Result<()> {
        self.clear_working().await?;
        self.client.stats().incr_processed().await?;
        Ok(())
    }

    async fn clear_working(&mut self) -> Result<()> {
        self.client
            .store()
            .delete(&self.client.layout().worker(&self.id))
            .await?;
        self.current = None;
        self.state = WorkerState::Idle;
        Ok(())
    }

    /// Reserve, perform and complete one job
    ///
    /// Returns `Ok(None)` when every queue is empty. A failing job leaves
    /// the worker idle and its error is returned; `failed` has already
    /// been counted by [`Job::perform`].
    pub async fn process(&mut self) -> Result<Option<Value>> {
        let Some(job) = self.reserve().await? else {
            return Ok(None);
        };

        self.working_on(job.clone()).await?;

        match job.perform(&self.client).await {
            Ok(value) => {
                self.done_working().await?;
                Ok(Some(value))
            }
            Err(e) => {
                self.clear_working().await?;
                Err(e)
            }
        }
    }

    /// Process jobs until every queue is empty
    ///
    /// Job failures are logged and skipped; store errors stop the loop.
    /// Returns the number of jobs reserved.
    pub async fn work_off(&mut self) -> Result<u64> {
        let mut count = 0;
        loop {
            match self.process().await {
                Ok(Some(_)) => count += 1,
                Ok(None) => return Ok(count),
                Err(e) if e.is_job_failure() || matches!(e, Error::NoClass) => {
                    count += 1;
                    tracing::warn!("Worker {} skipped failed job: {}", self.id, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("queues", &self.queues)
            .field("state", &self.state)
            .field("current", &self.current)
            .finish()
    }
}

/// Worker builder
pub struct WorkerBuilder {
    client: Client,
    queues: Vec<String>,
    hostname: Option<String>,
    pid: Option<u32>,
}

impl WorkerBuilder {
    /// Create a builder bound to a client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            queues: Vec::new(),
            hostname: None,
            pid: None,
        }
    }

    /// Set the queues to work, in priority order
    #[must_use]
    pub fn queues<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queues = queues.into_iter().map(Into::into).collect();
        self
    }

    /// Override the hostname part of the worker id
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Override the pid part of the worker id
    #[must_use]
    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Build the worker
    pub fn build(self) -> Result<Worker> {
        let queues: Vec<String> = self
            .queues
            .into_iter()
            .map(|queue| queue.trim().to_string())
            .filter(|queue| !queue.is_empty())
            .collect();

        if queues.is_empty() {
            return Err(Error::Config("worker needs at least one queue".into()));
        }

        let hostname = self.hostname.unwrap_or_else(|| {
            std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
        });
        let pid = self.pid.unwrap_or_else(std::process::id);
        let id = format!("{}:{}:{}", hostname, pid, queues.join(","));

        Ok(Worker {
            id,
            queues,
            client: self.client,
            state: WorkerState::Idle,
            current: None,
        })
    }
}
