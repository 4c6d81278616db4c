//! Error type definitions
//!
//! Provides all possible error types in the Resq engine.

/// Result type alias for Resq
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by job handler code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for the Resq engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Redis-related errors
    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::RedisError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Enqueue-by-class without a queue to put the job on
    #[error("No queue declared for job class: {0}")]
    NoQueue(String),

    /// Job creation without a class name
    #[error("Jobs must be given a class")]
    NoClass,

    /// The class name in a payload has no registered handler
    #[error("Unknown job class: {0}")]
    ClassResolution(String),

    /// The handler raised while performing a job
    #[error("Job {class} failed: {source}")]
    JobExecution {
        /// Class name of the failing job
        class: String,
        /// Error raised by the handler
        #[source]
        source: BoxError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if the error came from the backing store transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Redis(_))
    }

    /// Check if the error was raised while performing a job
    ///
    /// These are the errors that bump the global `failed` counter.
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Error::ClassResolution(_) | Error::JobExecution { .. })
    }

    /// Check if the error is surfaced to producers at enqueue time
    pub fn is_enqueue_error(&self) -> bool {
        matches!(self, Error::NoQueue(_) | Error::NoClass)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
