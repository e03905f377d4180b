//! The evaluator contract and its sequential reference implementation.
//!
//! An evaluator owns a pool of [`Job`]s, a run function, and an ordered
//! list of [`Callback`](crate::Callback)s. Callers [`submit`](Evaluator::submit)
//! configurations and [`gather`](Evaluator::gather) completed jobs; the
//! evaluator drives the user computation in between and notifies callbacks
//! around each job's lifecycle.
//!
//! [`SerialEvaluator`] is the reference implementation: jobs run strictly
//! one after another on the calling task. Its semantics are binding for
//! any concurrent or distributed executor built against this trait.

mod serial;

use async_trait::async_trait;
pub use serial::{SerialEvaluator, SerialEvaluatorBuilder};

use crate::error::Result;
use crate::job::Job;
use crate::value::Config;

/// Contract for executing jobs and driving callback notification.
///
/// Binding semantics for every implementation:
///
/// - `submit` creates one `Ready` job per configuration, records its
///   `in` snapshot in storage, stamps `timestamp_submit`, and fires
///   `on_launch` for every callback in registration order before any work
///   starts.
/// - `execute` moves a `Ready` job through `Running` to `Done`, passing
///   the run function an independent copy of the configuration; the user
///   computation can never mutate the evaluator's retained config through
///   its argument. Errors from the run function propagate unmodified — no
///   retry, no masking. Calling `execute` on a non-`Ready` job is a
///   caller error.
/// - `gather` resolves in-flight work, stamps `timestamp_gather`, stores
///   the `out` slot, then fires `on_done` in registration order on the
///   task observing the transition. A termination signal raised by a
///   callback propagates out uncaught as
///   [`Error::SearchTerminated`](crate::Error::SearchTerminated).
/// - Each job is exclusively owned by the execution that mutates it, and
///   `on_launch` for a job always precedes its `on_done`. No callback
///   ordering is guaranteed *between* different jobs completing
///   concurrently.
///
/// `execute` and `gather` are suspension points: a sequential executor
/// runs the computation to completion on the calling task, a concurrent
/// one yields to its scheduler and may run up to
/// [`num_workers`](Evaluator::num_workers) computations at once.
/// Cancellation is cooperative — in-flight jobs finish before the loop
/// stops, and no timeout is imposed at this layer.
#[async_trait]
pub trait Evaluator: Send {
    /// Creates and enqueues one job per configuration.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from recording the job's input snapshot.
    fn submit(&mut self, configs: Vec<Config>) -> Result<()>;

    /// Runs one `Ready` job to completion and returns it `Done`.
    ///
    /// # Errors
    ///
    /// Propagates run function errors unmodified.
    async fn execute(&self, job: Job) -> Result<Job>;

    /// Resolves all pending work and returns the completed jobs.
    ///
    /// # Errors
    ///
    /// Propagates run function and storage errors, and
    /// [`Error::SearchTerminated`](crate::Error::SearchTerminated) when a
    /// callback requests termination.
    async fn gather(&mut self) -> Result<Vec<Job>>;

    /// Worker-count hint; meaningful only to concurrent executors.
    fn num_workers(&self) -> usize {
        1
    }
}
