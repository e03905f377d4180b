//! Evaluate a small grid of configurations sequentially, with console
//! logging, a concurrency profile, and a CSV dump of the results.

use std::error::Error;
use std::result::Result;

use evaluator::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let profiler = ProfilingCallback::new();

    let mut evaluator = SerialEvaluator::builder(|job: RunningJob| {
        let x = job.get("x")?.as_f64().unwrap_or(0.0);
        let y = job.get("y")?.as_f64().unwrap_or(0.0);
        job.store_metadata("distance", Value::Float(x.hypot(y)))?;
        Ok(Value::Float(-(x * x + y * y)))
    })
    .callback(LoggerCallback::new())
    .callback(profiler.clone())
    .build();

    let mut configs = Vec::new();
    for x in -2..=2 {
        for y in -2..=2 {
            configs.push(Config::from([
                ("x".to_string(), Value::Float(f64::from(x))),
                ("y".to_string(), Value::Float(f64::from(y))),
            ]));
        }
    }
    evaluator.submit(configs)?;
    let jobs = evaluator.gather().await?;

    let best = jobs
        .iter()
        .filter_map(|job| job.result.as_ref().and_then(Value::as_f64))
        .fold(f64::NEG_INFINITY, f64::max);
    println!("\nbest objective over {} jobs: {best:.3}", jobs.len());
    println!("profile points: {:?}", profiler.profile().len());

    let mut csv = Vec::new();
    evaluator.to_csv(&mut csv)?;
    println!("\n{}", String::from_utf8(csv)?);

    Ok(())
}
