//! Integration tests driving the callbacks through a real evaluator.

use std::result::Result;
use std::sync::Arc;

use evaluator::prelude::*;
use parking_lot::Mutex;

fn config_x(x: f64) -> Config {
    Config::from([("x".to_string(), Value::Float(x))])
}

#[tokio::test]
async fn profiling_a_serial_run_never_exceeds_one_job() {
    let profiler = ProfilingCallback::new();

    let mut evaluator = SerialEvaluator::builder(|_job| Ok(Value::Float(0.0)))
        .callback(profiler.clone())
        .build();

    evaluator
        .submit((0..5).map(|i| config_x(f64::from(i))).collect())
        .unwrap();
    evaluator.gather().await.unwrap();

    let series = profiler.profile();
    assert_eq!(series.len(), 10);
    assert!(series.iter().all(|&(_, n_jobs)| (0..=1).contains(&n_jobs)));
    assert_eq!(series.last().unwrap().1, 0);

    // Timestamps in the series never decrease.
    assert!(series.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[tokio::test]
async fn logger_distinguishes_failures_from_objectives() {
    let logger = LoggerCallback::new();

    let results = Arc::new(Mutex::new(vec![
        Value::Float(0.1),
        Value::failure("timeout"),
        Value::Float(0.5),
    ]));
    let mut evaluator = SerialEvaluator::builder(move |_job| Ok(results.lock().remove(0)))
        .callback(logger.clone())
        .build();

    evaluator
        .submit(vec![config_x(0.0), config_x(1.0), config_x(2.0)])
        .unwrap();
    evaluator.gather().await.unwrap();

    assert_eq!(logger.n_done(), 3);
    assert_eq!(logger.n_failures(), 1);
    assert_eq!(logger.best_objective(), Some(0.5));
}

#[tokio::test]
async fn progress_reporter_tracks_the_best_objective() {
    let progress = ProgressCallback::hidden();

    let mut evaluator = SerialEvaluator::builder(|job: RunningJob| {
        let x = job.get("x")?.as_f64().unwrap_or(0.0);
        Ok(Value::Float(x))
    })
    .callback(progress.clone())
    .build();

    evaluator
        .submit(vec![config_x(0.3), config_x(0.9), config_x(0.2)])
        .unwrap();
    evaluator.gather().await.unwrap();
    progress.finish();

    assert_eq!(progress.best_objective(), Some(0.9));
}

#[tokio::test]
async fn early_stopping_observes_improvements_across_gathers() {
    let objectives = Arc::new(Mutex::new(vec![1.0, 2.0, 2.0, 2.0]));
    let mut evaluator = SerialEvaluator::builder(move |_job| {
        Ok(Value::Float(objectives.lock().remove(0)))
    })
    .callback(SearchEarlyStopping::new(2))
    .build();

    // Improvement on the second job keeps the loop alive.
    evaluator.submit(vec![config_x(0.0), config_x(1.0)]).unwrap();
    assert_eq!(evaluator.gather().await.unwrap().len(), 2);

    // Two non-improving jobs later, the termination signal surfaces.
    evaluator.submit(vec![config_x(2.0), config_x(3.0)]).unwrap();
    let err = evaluator.gather().await.unwrap_err();
    assert!(err.is_search_terminated());
}

#[tokio::test]
async fn callbacks_fire_in_registration_order() {
    let trace = Arc::new(Mutex::new(Vec::new()));

    struct Tagged {
        tag: &'static str,
        trace: Arc<Mutex<Vec<&'static str>>>,
    }
    impl Callback for Tagged {
        fn on_done(&self, _job: &Job) -> Result<(), SearchTerminated> {
            self.trace.lock().push(self.tag);
            Ok(())
        }
    }

    let mut evaluator = SerialEvaluator::builder(|_job| Ok(Value::Int(0)))
        .callback(Tagged {
            tag: "first",
            trace: Arc::clone(&trace),
        })
        .callback(Tagged {
            tag: "second",
            trace: Arc::clone(&trace),
        })
        .build();

    evaluator.submit(vec![config_x(0.0)]).unwrap();
    evaluator.gather().await.unwrap();

    assert_eq!(*trace.lock(), vec!["first", "second"]);
}
