use std::sync::Arc;

use parking_lot::Mutex;

use super::Callback;
use crate::error::SearchTerminated;
use crate::job::Job;
use crate::value::Value;

/// Prints a progress line when jobs are completed.
///
/// Tracks the running best (maximum) numeric objective across
/// completions. A result encoding a failure (see [`Value::is_failure`])
/// prints a distinct failure line and never updates the best. Clones
/// share the same counters.
#[derive(Clone, Default)]
pub struct LoggerCallback {
    state: Arc<Mutex<LoggerState>>,
}

#[derive(Default)]
struct LoggerState {
    best_objective: Option<f64>,
    n_done: u64,
    n_failures: u64,
}

impl LoggerCallback {
    /// Creates a logger with no completions seen yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the best numeric objective seen so far.
    #[must_use]
    pub fn best_objective(&self) -> Option<f64> {
        self.state.lock().best_objective
    }

    /// Returns the number of completions seen.
    #[must_use]
    pub fn n_done(&self) -> u64 {
        self.state.lock().n_done
    }

    /// Returns the number of completions carrying an encoded failure.
    #[must_use]
    pub fn n_failures(&self) -> u64 {
        self.state.lock().n_failures
    }
}

impl Callback for LoggerCallback {
    fn on_done(&self, job: &Job) -> Result<(), SearchTerminated> {
        let mut state = self.state.lock();
        state.n_done += 1;

        if let Some(objective) = job.result.as_ref().and_then(Value::as_f64) {
            let best = state
                .best_objective
                .map_or(objective, |best| best.max(objective));
            state.best_objective = Some(best);
            println!(
                "[{:05}] -- best objective: {best:.5} -- received objective: {objective:.5}",
                state.n_done
            );
        } else if let Some(result) = job.result.as_ref().filter(|r| r.is_failure()) {
            state.n_failures += 1;
            println!("[{:05}] -- received failure: {result}", state.n_done);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::job::RunFunction;
    use crate::types::{JobId, JobStatus, SearchId};
    use crate::value::Config;

    fn noop() -> RunFunction {
        Arc::new(|_| Ok(Value::Int(0)))
    }

    fn done_job(partial: u64, result: Value) -> Job {
        let mut job = Job::new(JobId::new(SearchId::new(0), partial), Config::new(), noop());
        job.status = JobStatus::Done;
        job.result = Some(result);
        job
    }

    #[test]
    fn tracks_best_and_counts_failures() {
        let logger = LoggerCallback::new();
        logger.on_done(&done_job(0, Value::Float(0.1))).unwrap();
        logger.on_done(&done_job(1, Value::failure("timeout"))).unwrap();
        logger.on_done(&done_job(2, Value::Float(0.5))).unwrap();

        assert_eq!(logger.n_done(), 3);
        assert_eq!(logger.n_failures(), 1);
        assert_eq!(logger.best_objective(), Some(0.5));
    }

    #[test]
    fn failure_never_updates_best() {
        let logger = LoggerCallback::new();
        logger.on_done(&done_job(0, Value::Float(0.1))).unwrap();
        logger.on_done(&done_job(1, Value::failure("oom"))).unwrap();

        assert_eq!(logger.best_objective(), Some(0.1));
    }

    #[test]
    fn integer_results_count_as_numeric() {
        let logger = LoggerCallback::new();
        logger.on_done(&done_job(0, Value::Int(2))).unwrap();
        assert_eq!(logger.best_objective(), Some(2.0));
    }
}
