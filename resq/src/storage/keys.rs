//! Key manager
//!
//! Provides the key naming convention shared by every component.

/// Key manager
///
/// All keys live under `<namespace>:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    namespace: String,
}

impl Keys {
    /// Create a key manager for a namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespace prefix
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Queue Key (List)
    /// Example: resq:queue:default
    pub fn queue(&self, queue_name: &str) -> String {
        format!("{}:queue:{}", self.namespace, queue_name)
    }

    /// Registered queue names Key (Set)
    pub fn queues(&self) -> String {
        format!("{}:queues", self.namespace)
    }

    /// Job status Key (String)
    /// Example: resq:status:0a1b...
    pub fn status(&self, uuid: &str) -> String {
        format!("{}:status:{}", self.namespace, uuid)
    }

    /// Registered workers Key (Set)
    pub fn workers(&self) -> String {
        format!("{}:workers", self.namespace)
    }

    /// Worker "currently working on" Key (String)
    /// Example: resq:worker:host:42:default
    pub fn worker(&self, worker_id: &str) -> String {
        format!("{}:worker:{}", self.namespace, worker_id)
    }

    /// Global counter Key (String)
    /// Example: resq:stat:processed
    pub fn stat(&self, name: &str) -> String {
        format!("{}:stat:{}", self.namespace, name)
    }

    /// Prefix matching every key in the namespace
    pub fn prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    /// Strip the namespace from a full key
    pub fn strip<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
    }
}
