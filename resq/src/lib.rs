//! # Resq
//!
//! Resq is a durable job queue on Redis. Producers push jobs onto named FIFO
//! queues; workers reserve and perform them, at most one worker per job.
//!
//! ## Features
//!
//! - Named FIFO queues with atomic pop, peek and removal
//! - Job classes resolved by name through an explicit registry
//! - Status tracking keyed by job uuid
//! - Worker bookkeeping and processed/failed counters
//! - Prometheus metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resq::processor::{HandlerFn, JobClass, Registry};
//! use resq::{BoxError, Client};
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::from_classes([JobClass::new("Archive")
//!         .queue("file_serve")
//!         .perform(HandlerFn::new(|args| async move {
//!             Ok::<Value, BoxError>(json!({ "archived": args }))
//!         }))])?;
//!
//!     let client = Client::builder()
//!         .redis_url("redis://localhost:6379")
//!         .registry(registry)
//!         .build()
//!         .await?;
//!
//!     // Producer side
//!     client.enqueue("Archive", vec![json!(44), json!("masterbrew")]).await?;
//!
//!     // Worker side
//!     let mut worker = client.worker(["file_serve"])?;
//!     worker.register_worker().await?;
//!     worker.work_off().await?;
//!     worker.unregister_worker().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Public module exports
pub mod config;
pub mod error;
pub mod payload;

// Client SDK
pub mod client;

// Jobs and queues
pub mod job;
pub mod queue;

// Processor
pub mod processor;

// Status and counters
pub mod stat;
pub mod status;

// Worker
pub mod worker;

// Storage layer
pub mod storage;

// Observability
pub mod observability;

// Re-export common types
pub use async_trait::async_trait;
pub use client::{Client, ClientBuilder, Info};
pub use config::ResqConfig;
pub use error::{BoxError, Error, Result};
pub use job::Job;
pub use payload::Payload;
pub use worker::{Worker, WorkerState};
