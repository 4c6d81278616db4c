//! Job macro tests
//!
//! Tests `#[job]`, `register_jobs!` and `job_class!`.

mod common;

use resq::processor::JobResult;
use resq::storage::MemoryStore;
use resq::{BoxError, Client};
use resq_macros::{job, job_class, register_jobs};
use serde_json::{json, Value};

#[job(queue = "file_serve", name = "Archive")]
async fn archive(args: Vec<Value>) -> JobResult {
    Ok(json!({ "archived": args }))
}

#[job(queue = "mail")]
async fn send_email(args: Vec<Value>) -> JobResult {
    match args.first().and_then(Value::as_str) {
        Some(to) => Ok(json!(format!("sent to {}", to))),
        None => Err(BoxError::from("missing recipient")),
    }
}

#[job]
async fn cleanup_tmp(_args: Vec<Value>) -> JobResult {
    Ok(Value::Null)
}

#[test]
fn test_job_class_attributes() {
    let class = archiveWrapper::class();
    assert_eq!(class.name(), "Archive");
    assert_eq!(class.default_queue(), Some("file_serve"));

    let class = send_emailWrapper::class();
    assert_eq!(class.name(), "SendEmail");
    assert_eq!(class.default_queue(), Some("mail"));

    assert_eq!(job_class!(cleanup_tmp).default_queue(), None);
}

#[tokio::test]
async fn test_registered_jobs_perform() {
    common::init_tracing();
    let registry = register_jobs!(archive, send_email, cleanup_tmp).unwrap();
    assert_eq!(registry.class_names(), vec!["Archive", "CleanupTmp", "SendEmail"]);

    let client = Client::builder()
        .store(MemoryStore::new())
        .registry(registry)
        .build()
        .await
        .unwrap();

    client.enqueue("Archive", vec![json!(44)]).await.unwrap();
    client.enqueue("send_email", vec![json!("bob@example.com")]).await.unwrap();
    client.enqueue("SendEmail", vec![]).await.unwrap();

    let job = client.reserve("file_serve").await.unwrap().unwrap();
    assert_eq!(job.perform(&client).await.unwrap(), json!({"archived": [44]}));

    let mut worker = client.worker(["mail"]).unwrap();
    assert_eq!(worker.process().await.unwrap(), Some(json!("sent to bob@example.com")));
    assert!(worker.process().await.unwrap_err().is_job_failure());
}
