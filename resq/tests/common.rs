//! Common test utilities
//!
//! Sample job classes and client fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use resq::processor::{HandlerFn, JobClass, JobResult, Performable, Registry};
use resq::status::StatusSink;
use resq::storage::MemoryStore;
use resq::{BoxError, Client, Job};
use serde_json::{json, Value};

/// Install a fmt subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Instance job constructed from its argument list
pub struct SomeMethodJob {
    args: Vec<Value>,
}

#[async_trait]
impl Performable for SomeMethodJob {
    async fn perform(&mut self) -> JobResult {
        Ok(json!({ "method": self.args }))
    }
}

/// Job without a declared queue or arguments
pub struct JobWithoutArgs;

#[async_trait]
impl Performable for JobWithoutArgs {
    async fn perform(&mut self) -> JobResult {
        Ok(json!("no args"))
    }
}

/// Job constructed from the whole job, reporting status while it runs
pub struct PerformWithJob {
    queue: String,
    args: Vec<Value>,
    status: Option<StatusSink>,
}

#[async_trait]
impl Performable for PerformWithJob {
    async fn perform(&mut self) -> JobResult {
        if let Some(status) = &self.status {
            status.set("I'm working!").await?;
        }
        Ok(json!({ "queue": self.queue, "args": self.args }))
    }

    fn bind_status(&mut self, status: StatusSink) {
        self.status = Some(status);
    }
}

/// Archive job for the `file_serve` queue
pub struct Archive {
    repo_id: Value,
    branch: Value,
}

#[async_trait]
impl Performable for Archive {
    async fn perform(&mut self) -> JobResult {
        if self.repo_id.is_null() {
            return Err("repo id required".into());
        }
        Ok(json!({ "archived": self.repo_id, "branch": self.branch }))
    }
}

/// Registry holding every sample job class
pub fn sample_registry() -> Registry {
    Registry::from_classes([
        JobClass::new("SomeJob").queue("jobs").perform(HandlerFn::new(|args| async move {
            Ok::<Value, BoxError>(json!({ "some": args }))
        })),
        JobClass::new("SomeMethodJob")
            .queue("jobs")
            .construct(|args| Ok(SomeMethodJob { args: args.to_vec() })),
        JobClass::new("BadJob").queue("jobs").perform(HandlerFn::new(|_args| async move {
            Err::<Value, BoxError>("Bad job!".into())
        })),
        JobClass::new("GoodJob").queue("jobs").perform(HandlerFn::new(|args| async move {
            let name = args.first().and_then(Value::as_str).unwrap_or("nobody").to_string();
            Ok::<Value, BoxError>(json!(format!("Good job, {}", name)))
        })),
        JobClass::new("JobWithoutArgs").construct(|_args| Ok(JobWithoutArgs)),
        JobClass::new("PerformWithJob").queue("jobs").construct_with_job(|job: &Job| {
            Ok(PerformWithJob {
                queue: job.queue().to_string(),
                args: job.args().to_vec(),
                status: None,
            })
        }),
        JobClass::new("Archive").queue("file_serve").construct(|args| {
            Ok(Archive {
                repo_id: args.first().cloned().unwrap_or(Value::Null),
                branch: args.get(1).cloned().unwrap_or(Value::Null),
            })
        }),
    ])
    .expect("sample registry")
}

/// Client over a fresh in-memory store with the sample registry
pub async fn memory_client() -> Client {
    init_tracing();
    Client::builder()
        .store(MemoryStore::new())
        .registry(sample_registry())
        .build()
        .await
        .expect("Failed to create client")
}

/// Client on Redis (`REDIS_URL`), isolated under its own namespace
pub async fn redis_client(test_name: &str) -> Client {
    init_tracing();
    let redis_url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let namespace = format!("test-{}-{}", test_name, uuid::Uuid::new_v4().simple());

    Client::builder()
        .redis_url(&redis_url)
        .namespace(namespace)
        .registry(sample_registry())
        .build()
        .await
        .expect("Failed to create client")
}

/// Delete every key a Redis test wrote under its namespace
pub async fn cleanup(client: &Client) {
    let prefix = client.layout().prefix();
    if let Ok(keys) = client.store().keys(&prefix).await {
        for key in keys {
            let _ = client.store().delete(&key).await;
        }
    }
}
