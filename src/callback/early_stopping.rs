use parking_lot::Mutex;

use super::Callback;
use crate::error::SearchTerminated;
use crate::job::Job;
use crate::value::Value;

/// Stops the search gracefully when it does not improve for a given
/// number of completions.
///
/// On each completion the monitored objective is extracted from the job
/// (by default its numeric result, maximized). A strict improvement over
/// the running best resets the non-improvement counter; anything else —
/// including non-numeric results such as encoded failures — increments
/// it. Once the counter reaches `patience`, `on_done` raises the
/// termination signal, which the evaluator propagates to its caller as
/// [`Error::SearchTerminated`](crate::Error::SearchTerminated).
///
/// This is the sole path by which a callback halts the evaluation loop.
///
/// # Examples
///
/// ```
/// use evaluator::{SearchEarlyStopping, SerialEvaluator, Value};
///
/// let evaluator = SerialEvaluator::builder(|_job| Ok(Value::Float(0.0)))
///     .callback(SearchEarlyStopping::new(10))
///     .build();
/// # let _ = evaluator;
/// ```
pub struct SearchEarlyStopping {
    patience: usize,
    objective: Box<dyn Fn(&Job) -> Option<f64> + Send + Sync>,
    state: Mutex<MonitorState>,
}

#[derive(Default)]
struct MonitorState {
    best_objective: Option<f64>,
    n_lower: usize,
}

impl SearchEarlyStopping {
    /// Creates a monitor over the job's numeric result with the given
    /// patience.
    #[must_use]
    pub fn new(patience: usize) -> Self {
        Self::with_objective(patience, |job| {
            job.result.as_ref().and_then(Value::as_f64)
        })
    }

    /// Creates a monitor with a custom objective-extraction function, for
    /// monitoring something other than the result (a metadata entry, the
    /// consumed budget, a transformed score).
    pub fn with_objective(
        patience: usize,
        objective: impl Fn(&Job) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            patience,
            objective: Box::new(objective),
            state: Mutex::new(MonitorState::default()),
        }
    }

    /// Returns the best objective seen so far.
    #[must_use]
    pub fn best_objective(&self) -> Option<f64> {
        self.state.lock().best_objective
    }
}

impl Callback for SearchEarlyStopping {
    fn on_done(&self, job: &Job) -> Result<(), SearchTerminated> {
        let objective = (self.objective)(job);
        let mut state = self.state.lock();

        match (objective, state.best_objective) {
            (Some(value), None) => state.best_objective = Some(value),
            (Some(value), Some(best)) if value > best => {
                trace_info!(previous = best, improved = value, "objective improved");
                state.best_objective = Some(value);
                state.n_lower = 0;
            }
            _ => state.n_lower += 1,
        }

        if state.n_lower >= self.patience {
            trace_info!(
                patience = self.patience,
                "stopping the search: no improvement"
            );
            return Err(SearchTerminated);
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

    fn feed(monitor: &SearchEarlyStopping, objectives: &[f64]) -> Vec<bool> {
        objectives
            .iter()
            .enumerate()
            .map(|(i, &objective)| {
                monitor
                    .on_done(&done_job(i as u64, Value::Float(objective)))
                    .is_err()
            })
            .collect()
    }

    #[test]
    fn terminates_at_exactly_the_patience_count() {
        let monitor = SearchEarlyStopping::new(3);
        // Initial best 5, then three non-improving completions: the signal
        // fires on the fourth element overall, not earlier.
        assert_eq!(
            feed(&monitor, &[5.0, 5.0, 4.0, 3.0]),
            vec![false, false, false, true]
        );
    }

    #[test]
    fn improvement_resets_the_counter() {
        let monitor = SearchEarlyStopping::new(3);
        assert_eq!(
            feed(&monitor, &[5.0, 4.0, 4.0, 6.0, 5.0, 5.0, 5.0]),
            vec![false, false, false, false, false, false, true]
        );
        assert_eq!(monitor.best_objective(), Some(6.0));
    }

    #[test]
    fn equal_objective_is_not_an_improvement() {
        let monitor = SearchEarlyStopping::new(2);
        assert_eq!(feed(&monitor, &[1.0, 1.0, 1.0]), vec![false, false, true]);
    }

    #[test]
    fn non_numeric_results_count_as_non_improving() {
        let monitor = SearchEarlyStopping::new(2);
        monitor.on_done(&done_job(0, Value::Float(1.0))).unwrap();
        monitor.on_done(&done_job(1, Value::failure("timeout"))).unwrap();
        assert!(monitor.on_done(&done_job(2, Value::failure("oom"))).is_err());
    }

    #[test]
    fn custom_objective_reads_other_fields() {
        let monitor = SearchEarlyStopping::with_objective(1, |job| job.budget);
        let mut job = done_job(0, Value::Float(0.0));
        job.budget = Some(10.0);
        monitor.on_done(&job).unwrap();

        let mut worse = done_job(1, Value::Float(9.0));
        worse.budget = Some(5.0);
        assert!(monitor.on_done(&worse).is_err());
    }
}
