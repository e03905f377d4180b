use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use super::Callback;
use crate::error::SearchTerminated;
use crate::job::Job;
use crate::value::Value;

/// Drives a bounded progress bar as jobs complete.
///
/// Same best-objective tracking as [`LoggerCallback`](super::LoggerCallback),
/// rendered on an [`indicatif`] bar instead of printed lines. Clones share
/// the same bar and state.
#[derive(Clone)]
pub struct ProgressCallback {
    bar: ProgressBar,
    best_objective: Arc<Mutex<Option<f64>>>,
}

impl ProgressCallback {
    /// Creates a progress bar bounded at `max_evals` completions.
    #[must_use]
    pub fn new(max_evals: u64) -> Self {
        Self::with_bar(ProgressBar::new(max_evals))
    }

    /// Creates a collector over a hidden bar, keeping the best-objective
    /// tracking without terminal output.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar,
            best_objective: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the best numeric objective seen so far.
    #[must_use]
    pub fn best_objective(&self) -> Option<f64> {
        *self.best_objective.lock()
    }

    /// Finishes the bar, leaving it at its final position.
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Callback for ProgressCallback {
    fn on_done(&self, job: &Job) -> Result<(), SearchTerminated> {
        self.bar.inc(1);

        if let Some(objective) = job.result.as_ref().and_then(Value::as_f64) {
            let mut best = self.best_objective.lock();
            let improved = best.map_or(objective, |b| b.max(objective));
            *best = Some(improved);
            self.bar.set_message(format!("objective: {improved:.5}"));
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
    fn tracks_best_on_hidden_bar() {
        let progress = ProgressCallback::hidden();
        progress.on_done(&done_job(0, Value::Float(0.3))).unwrap();
        progress.on_done(&done_job(1, Value::failure("timeout"))).unwrap();
        progress.on_done(&done_job(2, Value::Float(0.7))).unwrap();

        assert_eq!(progress.best_objective(), Some(0.7));
        progress.finish();
    }
}
