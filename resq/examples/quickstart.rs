//! Resq quickstart example
//!
//! Demonstrates enqueueing jobs, tracking status and working them off.
//! Requires a Redis server (`REDIS_URL`, default `redis://localhost:6379`).

use resq::processor::{JobResult, Performable};
use resq::status::StatusSink;
use resq::{async_trait, Client, ResqConfig};
use resq_macros::{job, register_jobs};
use serde_json::{json, Value};

#[job(queue = "mail", name = "SendEmail")]
async fn send_email(args: Vec<Value>) -> JobResult {
    let to = args.first().and_then(Value::as_str).unwrap_or("nobody");
    println!("   Sending email to {}", to);
    Ok(json!({ "sent": to }))
}

/// Archive job reporting progress through its status sink
struct Archive {
    repo_id: Value,
    status: Option<StatusSink>,
}

#[async_trait]
impl Performable for Archive {
    async fn perform(&mut self) -> JobResult {
        if let Some(status) = &self.status {
            status.set(json!({ "archiving": self.repo_id })).await?;
        }
        Ok(json!({ "archived": self.repo_id }))
    }

    fn bind_status(&mut self, status: StatusSink) {
        self.status = Some(status);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut registry = register_jobs!(send_email)?;
    registry.register(resq::processor::JobClass::new("Archive").queue("file_serve").construct(
        |args| {
            Ok(Archive {
                repo_id: args.first().cloned().unwrap_or(Value::Null),
                status: None,
            })
        },
    ))?;

    let client = Client::builder()
        .config(ResqConfig::from_env()?)
        .registry(registry)
        .metrics(true)
        .build()
        .await?;

    println!("Resq Quickstart Example\n");

    // 1. Enqueue by class
    println!("1. Enqueueing jobs...");
    let email_id = client.enqueue("SendEmail", vec![json!("user@example.com")]).await?;
    let archive_id = client
        .enqueue("Archive", vec![json!(44), json!("masterbrew")])
        .await?;
    println!("   Enqueued {} and {}\n", email_id, archive_id);

    // 2. Inspect
    let info = client.info().await?;
    println!("2. Pending jobs: {} across {} queues\n", info.pending, info.queues);

    // 3. Work off every queue
    println!("3. Working...");
    let mut worker = client.worker(["*"])?;
    worker.register_worker().await?;
    let count = worker.work_off().await?;
    worker.unregister_worker().await?;
    println!("   Worked {} jobs\n", count);

    // 4. Status and stats
    println!("4. Archive status: {:?}", client.get_status(&archive_id).await?);
    let info = client.info().await?;
    println!("   Processed: {}, failed: {}", info.processed, info.failed);

    if let Some(metrics) = client.metrics() {
        println!("\n{}", metrics.gather());
    }

    Ok(())
}
