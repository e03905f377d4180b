use std::sync::Arc;

use parking_lot::Mutex;

use super::Callback;
use crate::error::SearchTerminated;
use crate::job::Job;

/// Collects profiling data from completed jobs.
///
/// Each completion records the job's effective execution window as a
/// `+1`/`-1` delta pair: the fine-grained `start`/`end` timestamps when
/// the executor instrumented them, falling back to `submit`/`gather`
/// otherwise. [`profile`](ProfilingCallback::profile) folds the deltas
/// into a how-many-jobs-were-running-over-time series.
///
/// Clones share the same history, so keep one clone to read the profile
/// after handing the other to an evaluator:
///
/// ```
/// use evaluator::{ProfilingCallback, SerialEvaluator, Value};
///
/// let profiler = ProfilingCallback::new();
/// let evaluator = SerialEvaluator::builder(|_job| Ok(Value::Int(0)))
///     .callback(profiler.clone())
///     .build();
/// # let _ = evaluator;
/// // ... submit and gather ...
/// let series = profiler.profile();
/// ```
#[derive(Clone, Default)]
pub struct ProfilingCallback {
    history: Arc<Mutex<Vec<(f64, i64)>>>,
}

impl ProfilingCallback {
    /// Creates a collector with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cumulative concurrency series: `(timestamp, n_jobs)`
    /// pairs sorted by timestamp, ties keeping record order.
    #[must_use]
    pub fn profile(&self) -> Vec<(f64, i64)> {
        let mut events = self.history.lock().clone();
        events.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(core::cmp::Ordering::Equal));

        let mut n_jobs = 0;
        let mut series = Vec::with_capacity(events.len());
        for (timestamp, delta) in events {
            n_jobs += delta;
            series.push((timestamp, n_jobs));
        }
        series
    }
}

impl Callback for ProfilingCallback {
    fn on_done(&self, job: &Job) -> Result<(), SearchTerminated> {
        let window = match (job.timestamp_start, job.timestamp_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => job.timestamp_submit.zip(job.timestamp_gather),
        };
        let Some((start, end)) = window else {
            return Ok(());
        };

        let mut history = self.history.lock();
        history.push((start, 1));
        history.push((end, -1));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::job::RunFunction;
    use crate::types::{JobId, SearchId, JobStatus};
    use crate::value::{Config, Value};

    fn noop() -> RunFunction {
        Arc::new(|_| Ok(Value::Int(0)))
    }

    fn done_job(partial: u64, start: Option<f64>, end: Option<f64>) -> Job {
        let mut job = Job::new(JobId::new(SearchId::new(0), partial), Config::new(), noop());
        job.status = JobStatus::Done;
        job.timestamp_submit = start.map(|t| t - 1.0);
        job.timestamp_start = start;
        job.timestamp_end = end;
        job.timestamp_gather = end.map(|t| t + 1.0);
        job.result = Some(Value::Float(0.0));
        job
    }

    #[test]
    fn overlapping_windows_sum_concurrency() {
        let profiler = ProfilingCallback::new();
        profiler.on_done(&done_job(0, Some(0.0), Some(10.0))).unwrap();
        profiler.on_done(&done_job(1, Some(5.0), Some(15.0))).unwrap();

        assert_eq!(
            profiler.profile(),
            vec![(0.0, 1), (5.0, 2), (10.0, 1), (15.0, 0)]
        );
    }

    #[test]
    fn falls_back_to_submit_and_gather() {
        let mut job = done_job(0, None, None);
        job.timestamp_submit = Some(2.0);
        job.timestamp_gather = Some(4.0);

        let profiler = ProfilingCallback::new();
        profiler.on_done(&job).unwrap();

        assert_eq!(profiler.profile(), vec![(2.0, 1), (4.0, 0)]);
    }

    #[test]
    fn ties_keep_record_order() {
        let profiler = ProfilingCallback::new();
        // Two zero-length windows at the same instant: the series rises
        // before it falls for each pair, in record order.
        profiler.on_done(&done_job(0, Some(1.0), Some(1.0))).unwrap();
        profiler.on_done(&done_job(1, Some(1.0), Some(1.0))).unwrap();

        assert_eq!(
            profiler.profile(),
            vec![(1.0, 1), (1.0, 0), (1.0, 1), (1.0, 0)]
        );
    }
}
