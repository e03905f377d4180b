//! Job data model: identity, configuration, lifecycle, and the restricted
//! handle given to the run function while it executes.

use core::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::storage::Storage;
use crate::types::{JobId, JobStatus};
use crate::value::{Config, Value};

/// The user computation wrapped by a job.
///
/// It receives a fresh [`RunningJob`] per execution (consumed by the call)
/// and returns the evaluation result. Errors propagate unmodified through
/// [`Evaluator::execute`](crate::Evaluator::execute); to report "ran but
/// failed" instead, return an encoded failure value such as
/// [`Value::failure`].
pub type RunFunction = Arc<dyn Fn(RunningJob) -> Result<Value> + Send + Sync>;

/// One evaluation executed by an [`Evaluator`](crate::Evaluator).
///
/// A job carries its identity, a snapshot of the configuration it was
/// created with, the run function, and the outcome of execution: status,
/// timestamps, and result. Timestamps are seconds relative to the owning
/// evaluator's creation and stay `None` until the corresponding event
/// occurs; when all four are set they are monotonic
/// (`submit <= start <= end <= gather`).
///
/// The `other` and `budget` fields are reserved extension points logged
/// alongside the result; the engine assigns no semantics to them.
#[derive(Clone)]
pub struct Job {
    /// Unique identifier, allocated by the evaluator's storage.
    pub id: JobId,
    /// Identifier of the executing worker; `None` until a concurrent
    /// executor assigns one.
    pub rank: Option<usize>,
    /// Configuration snapshot, immutable for the job's lifetime.
    config: Config,
    /// The wrapped user computation.
    run_function: RunFunction,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// When the job was submitted.
    pub timestamp_submit: Option<f64>,
    /// When the run function started executing.
    pub timestamp_start: Option<f64>,
    /// When the run function finished executing.
    pub timestamp_end: Option<f64>,
    /// When the job was gathered.
    pub timestamp_gather: Option<f64>,
    /// The run function's return value once `Done`.
    pub result: Option<Value>,
    /// Supplementary data logged alongside the result.
    pub other: Option<Value>,
    /// Consumed-resource accounting.
    pub budget: Option<f64>,
}

impl Job {
    /// Creates a `Ready` job from an id, a configuration, and a run
    /// function.
    ///
    /// The configuration is owned by the job from this point on; later
    /// changes to whatever mapping the caller built it from cannot reach
    /// the snapshot.
    #[must_use]
    pub fn new(id: JobId, config: Config, run_function: RunFunction) -> Self {
        Self {
            id,
            rank: None,
            config,
            run_function,
            status: JobStatus::Ready,
            timestamp_submit: None,
            timestamp_start: None,
            timestamp_end: None,
            timestamp_gather: None,
            result: None,
            other: None,
            budget: None,
        }
    }

    /// Returns an independent copy of the configuration snapshot.
    ///
    /// Mutating the returned mapping never affects the job.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Returns the configuration copy paired with the result, for
    /// unpacking a completed job as `(config, result)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use evaluator::{Config, Job, JobId, Value};
    ///
    /// let id: JobId = "0.0".parse().unwrap();
    /// let config = Config::from([("x".to_string(), Value::Int(2))]);
    /// let mut job = Job::new(id, config, Arc::new(|_| Ok(Value::Int(0))));
    /// job.result = Some(Value::Float(0.5));
    ///
    /// let (config, result) = job.parts();
    /// assert_eq!(config["x"], Value::Int(2));
    /// assert_eq!(result, Some(Value::Float(0.5)));
    /// ```
    #[must_use]
    pub fn parts(&self) -> (Config, Option<Value>) {
        (self.config.clone(), self.result.clone())
    }

    pub(crate) fn run_function(&self) -> &RunFunction {
        &self.run_function
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Job");
        s.field("id", &self.id);
        if let Some(rank) = self.rank {
            s.field("rank", &rank);
        }
        s.field("status", &self.status)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The restricted view of a job handed to the run function while it
/// executes.
///
/// A running job can read its own parameters and write intermediate
/// metadata to storage, but cannot touch the owning [`Job`]'s status,
/// timestamps, or result. One is created fresh per execution and consumed
/// by the run function call.
pub struct RunningJob {
    id: JobId,
    parameters: Config,
    storage: Arc<dyn Storage>,
}

impl RunningJob {
    /// Binds an id, a parameter copy, and a storage handle.
    #[must_use]
    pub fn new(id: JobId, parameters: Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            id,
            parameters,
            storage,
        }
    }

    /// Returns the executing job's id.
    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Returns the full parameter mapping.
    #[must_use]
    pub fn parameters(&self) -> &Config {
        &self.parameters
    }

    /// Looks up one parameter by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`](crate::Error::MissingParameter)
    /// if the configuration has no such key.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.parameters
            .get(name)
            .ok_or_else(|| crate::Error::MissingParameter(name.to_string()))
    }

    /// Writes one metadata entry for this job to storage.
    ///
    /// # Errors
    ///
    /// Propagates storage lookup errors.
    pub fn store_metadata(&self, key: &str, value: Value) -> Result<()> {
        self.storage.store_job_metadata(self.id, key, value)
    }
}

impl fmt::Debug for RunningJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningJob")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
