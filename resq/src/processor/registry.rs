//! Job class registry
//!
//! Maps class names to job class descriptors. Names are canonicalized so
//! `some-job`, `some_job` and `SomeJob` resolve to the same class.

use super::{Handler, Performable};
use crate::error::BoxError;
use crate::job::Job;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Constructor receiving the whole job (queue, uuid, args)
pub type JobConstructor =
    Arc<dyn Fn(&Job) -> std::result::Result<Box<dyn Performable>, BoxError> + Send + Sync>;

/// Constructor receiving only the argument list
pub type ArgsConstructor =
    Arc<dyn Fn(&[Value]) -> std::result::Result<Box<dyn Performable>, BoxError> + Send + Sync>;

/// Canonical form of a class name
///
/// Each `-` or `_` separated segment is capitalized and the separators are
/// dropped. Names already in camel case are unchanged.
pub fn canonical_class_name(name: &str) -> String {
    name.trim()
        .split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// How a job class is invoked, in precedence order
pub enum Dispatch<'a> {
    /// Class-level perform called with the argument list
    Perform(&'a dyn Handler),
    /// Instance constructed from the job, then performed
    WithJob(&'a JobConstructor),
    /// Instance constructed from the argument list, then performed
    WithArgs(&'a ArgsConstructor),
}

/// Job class descriptor
///
/// # Example
///
/// ```rust
/// use resq::processor::{JobClass, Performable, JobResult};
/// use resq::async_trait;
/// use serde_json::{json, Value};
///
/// struct Archive {
///     repo_id: Value,
/// }
///
/// #[async_trait]
/// impl Performable for Archive {
///     async fn perform(&mut self) -> JobResult {
///         Ok(json!({ "archived": self.repo_id }))
///     }
/// }
///
/// let class = JobClass::new("Archive")
///     .queue("archive")
///     .construct(|args| {
///         Ok(Archive {
///             repo_id: args.first().cloned().unwrap_or(Value::Null),
///         })
///     });
/// ```
#[derive(Clone)]
pub struct JobClass {
    name: String,
    queue: Option<String>,
    perform: Option<Arc<dyn Handler>>,
    with_job: Option<JobConstructor>,
    with_args: Option<ArgsConstructor>,
}

impl JobClass {
    /// Create a descriptor for a class name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: canonical_class_name(name.as_ref()),
            queue: None,
            perform: None,
            with_job: None,
            with_args: None,
        }
    }

    /// Set the queue used when enqueueing by class
    #[must_use]
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Set the class-level perform handler
    #[must_use]
    pub fn perform<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.perform = Some(Arc::new(handler));
        self
    }

    /// Set a constructor that receives the job
    #[must_use]
    pub fn construct_with_job<F, P>(mut self, constructor: F) -> Self
    where
        F: Fn(&Job) -> std::result::Result<P, BoxError> + Send + Sync + 'static,
        P: Performable + 'static,
    {
        self.with_job = Some(Arc::new(move |job: &Job| {
            constructor(job).map(|instance| Box::new(instance) as Box<dyn Performable>)
        }));
        self
    }

    /// Set a constructor that receives the argument list
    #[must_use]
    pub fn construct<F, P>(mut self, constructor: F) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<P, BoxError> + Send + Sync + 'static,
        P: Performable + 'static,
    {
        self.with_args = Some(Arc::new(move |args: &[Value]| {
            constructor(args).map(|instance| Box::new(instance) as Box<dyn Performable>)
        }));
        self
    }

    /// Canonical class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared queue, if any
    pub fn default_queue(&self) -> Option<&str> {
        self.queue.as_deref()
    }

    /// Pick the entry point: class-level perform, then job constructor,
    /// then argument constructor
    pub fn dispatch(&self) -> Option<Dispatch<'_>> {
        if let Some(handler) = &self.perform {
            return Some(Dispatch::Perform(handler.as_ref()));
        }

        if let Some(constructor) = &self.with_job {
            return Some(Dispatch::WithJob(constructor));
        }

        self.with_args.as_ref().map(Dispatch::WithArgs)
    }
}

impl fmt::Debug for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobClass")
            .field("name", &self.name)
            .field("queue", &self.queue)
            .field("perform", &self.perform.is_some())
            .field("construct_with_job", &self.with_job.is_some())
            .field("construct", &self.with_args.is_some())
            .finish()
    }
}

/// Registry of job classes
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: HashMap<String, Arc<JobClass>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of classes
    pub fn from_classes(classes: impl IntoIterator<Item = JobClass>) -> Result<Self> {
        let mut registry = Self::new();
        for class in classes {
            registry.register(class)?;
        }
        Ok(registry)
    }

    /// Register a job class
    ///
    /// A class must have at least one entry point. Registering a name twice
    /// replaces the earlier class.
    pub fn register(&mut self, class: JobClass) -> Result<()> {
        if class.name.is_empty() {
            return Err(Error::NoClass);
        }

        if class.dispatch().is_none() {
            return Err(Error::Config(format!(
                "job class {} has no perform handler or constructor",
                class.name
            )));
        }

        tracing::debug!("Registered job class {}", class.name);
        self.classes.insert(class.name.clone(), Arc::new(class));
        Ok(())
    }

    /// Resolve a class name
    pub fn resolve(&self, name: &str) -> Result<Arc<JobClass>> {
        self.classes
            .get(&canonical_class_name(name))
            .cloned()
            .ok_or_else(|| Error::ClassResolution(name.to_string()))
    }

    /// Check whether a class name resolves
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&canonical_class_name(name))
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
