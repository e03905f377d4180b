use std::collections::{BTreeSet, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::Evaluator;
use crate::callback::Callback;
use crate::error::Result;
use crate::job::{Job, RunFunction, RunningJob};
use crate::storage::{MemoryStorage, Storage};
use crate::types::{JobStatus, SearchId};
use crate::value::{Config, Value};

/// Runs evaluations one after the other on the calling task.
///
/// This is the reference [`Evaluator`]: no two jobs are ever in flight
/// simultaneously, so no locking is needed around job state, and jobs
/// complete in exactly their submission order. The serial evaluator also
/// instruments the run function's execution window, so
/// `timestamp_start`/`timestamp_end` are always set on gathered jobs.
///
/// # Examples
///
/// ```
/// use evaluator::prelude::*;
///
/// # async fn demo() -> evaluator::Result<()> {
/// let mut evaluator = SerialEvaluator::builder(|job: RunningJob| {
///     let x = job.get("x")?.as_f64().unwrap_or(0.0);
///     Ok(Value::Float(-(x - 3.0).powi(2)))
/// })
/// .callback(LoggerCallback::new())
/// .build();
///
/// evaluator.submit(vec![Config::from([("x".to_string(), Value::Float(1.0))])])?;
/// let jobs = evaluator.gather().await?;
/// assert_eq!(jobs.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct SerialEvaluator {
    run_function: RunFunction,
    num_workers: usize,
    callbacks: Vec<Arc<dyn Callback>>,
    storage: Arc<dyn Storage>,
    search_id: SearchId,
    /// Epoch for all of this evaluator's timestamps.
    epoch: Instant,
    pending: VecDeque<Job>,
    completed: Vec<Job>,
}

impl SerialEvaluator {
    /// Creates an evaluator with default settings: one worker, no
    /// callbacks, a fresh [`MemoryStorage`].
    #[must_use]
    pub fn new(
        run_function: impl Fn(RunningJob) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::builder(run_function).build()
    }

    /// Returns a [`SerialEvaluatorBuilder`] wrapping the given run
    /// function.
    #[must_use]
    pub fn builder(
        run_function: impl Fn(RunningJob) -> Result<Value> + Send + Sync + 'static,
    ) -> SerialEvaluatorBuilder {
        SerialEvaluatorBuilder {
            run_function: Arc::new(run_function),
            num_workers: 1,
            callbacks: Vec::new(),
            storage: None,
        }
    }

    /// Returns the search this evaluator records its jobs under.
    #[must_use]
    pub fn search_id(&self) -> SearchId {
        self.search_id
    }

    /// Returns the storage handle shared with running jobs.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Returns the number of submitted jobs not yet gathered.
    #[must_use]
    pub fn n_pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns every job gathered so far, in completion order.
    #[must_use]
    pub fn completed(&self) -> &[Job] {
        &self.completed
    }

    /// Seconds since this evaluator was created.
    fn timestamp(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Writes the completed jobs to `writer` in CSV format.
    ///
    /// Columns: `job_id`, `status`, `result`, the four timestamps, then
    /// one column per configuration key (sorted). Unset cells are empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn to_csv(&self, mut writer: impl io::Write) -> io::Result<()> {
        let mut config_columns: BTreeSet<String> = BTreeSet::new();
        for job in &self.completed {
            config_columns.extend(job.config().into_keys());
        }

        write!(
            writer,
            "job_id,status,result,timestamp_submit,timestamp_start,timestamp_end,timestamp_gather"
        )?;
        for column in &config_columns {
            write!(writer, ",{}", csv_escape(column))?;
        }
        writeln!(writer)?;

        for job in &self.completed {
            let status = match job.status {
                JobStatus::Ready => "Ready",
                JobStatus::Running => "Running",
                JobStatus::Done => "Done",
            };
            write!(writer, "{},{status}", job.id)?;

            match &job.result {
                Some(result) => write!(writer, ",{}", csv_escape(&result.to_string()))?,
                None => write!(writer, ",")?,
            }
            for timestamp in [
                job.timestamp_submit,
                job.timestamp_start,
                job.timestamp_end,
                job.timestamp_gather,
            ] {
                match timestamp {
                    Some(t) => write!(writer, ",{t}")?,
                    None => write!(writer, ",")?,
                }
            }

            let config = job.config();
            for column in &config_columns {
                match config.get(column) {
                    Some(value) => write!(writer, ",{}", csv_escape(&value.to_string()))?,
                    None => write!(writer, ",")?,
                }
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[async_trait]
impl Evaluator for SerialEvaluator {
    fn submit(&mut self, configs: Vec<Config>) -> Result<()> {
        trace_info!(n_configs = configs.len(), "submitting jobs");

        for config in configs {
            let job_id = self.storage.create_new_job(self.search_id)?;
            self.storage.store_job_in(job_id, Vec::new(), config.clone())?;

            let mut job = Job::new(job_id, config, Arc::clone(&self.run_function));
            job.timestamp_submit = Some(self.timestamp());

            for callback in &self.callbacks {
                callback.on_launch(&job);
            }
            self.pending.push_back(job);
        }
        Ok(())
    }

    async fn execute(&self, mut job: Job) -> Result<Job> {
        debug_assert_eq!(job.status, JobStatus::Ready);

        job.status = JobStatus::Running;
        job.timestamp_start = Some(self.timestamp());

        let running = RunningJob::new(job.id, job.config(), Arc::clone(&self.storage));
        let run_function = Arc::clone(job.run_function());
        let result = run_function(running)?;

        job.timestamp_end = Some(self.timestamp());
        job.result = Some(result);
        job.status = JobStatus::Done;

        trace_debug!(job_id = %job.id, "job executed");
        Ok(job)
    }

    async fn gather(&mut self) -> Result<Vec<Job>> {
        let mut gathered = Vec::new();

        while let Some(job) = self.pending.pop_front() {
            let mut job = self.execute(job).await?;
            job.timestamp_gather = Some(self.timestamp());

            // Persist the result before callbacks run so a termination
            // signal cannot lose stored state.
            if let Some(result) = &job.result {
                self.storage.store_job_out(job.id, result.clone())?;
            }
            self.completed.push(job.clone());

            for callback in &self.callbacks {
                callback.on_done(&job)?;
            }
            gathered.push(job);
        }

        trace_info!(n_jobs = gathered.len(), "gathered jobs");
        Ok(gathered)
    }

    fn num_workers(&self) -> usize {
        self.num_workers
    }
}

/// Quote a CSV field if it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Builder for [`SerialEvaluator`] with a fluent API.
///
/// ```
/// use evaluator::prelude::*;
///
/// let evaluator = SerialEvaluator::builder(|_job| Ok(Value::Float(0.0)))
///     .num_workers(1)
///     .callback(ProfilingCallback::new())
///     .storage(MemoryStorage::new())
///     .build();
/// # let _ = evaluator;
/// ```
pub struct SerialEvaluatorBuilder {
    run_function: RunFunction,
    num_workers: usize,
    callbacks: Vec<Arc<dyn Callback>>,
    storage: Option<Arc<dyn Storage>>,
}

impl SerialEvaluatorBuilder {
    /// Sets the worker-count hint (the serial evaluator still runs one job
    /// at a time).
    #[must_use]
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Registers a callback. Callbacks are notified in registration order.
    #[must_use]
    pub fn callback(mut self, callback: impl Callback + 'static) -> Self {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// Replaces the default [`MemoryStorage`] backend.
    #[must_use]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Builds the evaluator, creating a fresh search on its storage.
    #[must_use]
    pub fn build(self) -> SerialEvaluator {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let search_id = storage.create_new_search();
        trace_info!(search_id = %search_id, num_workers = self.num_workers, "serial evaluator ready");

        SerialEvaluator {
            run_function: self.run_function,
            num_workers: self.num_workers,
            callbacks: self.callbacks,
            storage,
            search_id,
            epoch: Instant::now(),
            pending: VecDeque::new(),
            completed: Vec::new(),
        }
    }
}
