//! Processor module
//!
//! Provides the handler traits job classes are built from and the registry
//! that resolves class names to them.

pub mod registry;

pub use registry::{canonical_class_name, Dispatch, JobClass, Registry};

use crate::error::BoxError;
use crate::status::StatusSink;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

/// Outcome of running a job handler
pub type JobResult = std::result::Result<Value, BoxError>;

/// Class-level job handler
///
/// Invoked directly with the job's argument list.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Perform the job
    async fn perform(&self, args: &[Value]) -> JobResult;
}

/// Job instance built by a constructor at perform time
#[async_trait]
pub trait Performable: Send {
    /// Perform the job
    async fn perform(&mut self) -> JobResult;

    /// Receive the status sink for this job's uuid
    ///
    /// Called once, before [`perform`](Performable::perform). Instances that
    /// report progress keep the sink; the default ignores it.
    fn bind_status(&mut self, _status: StatusSink) {}
}

/// Handler built from an async closure
///
/// # Example
///
/// ```rust
/// use resq::processor::{HandlerFn, JobClass};
/// use resq::BoxError;
/// use serde_json::{json, Value};
///
/// let class = JobClass::new("Echo").perform(HandlerFn::new(|args| async move {
///     Ok::<Value, BoxError>(json!(args))
/// }));
/// ```
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wrap a closure taking the argument list
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync,
        Fut: Future<Output = JobResult> + Send,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = JobResult> + Send,
{
    async fn perform(&self, args: &[Value]) -> JobResult {
        (self.f)(args.to_vec()).await
    }
}
