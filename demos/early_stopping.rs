//! A search loop that stops gracefully once the objective plateaus.
//!
//! The early-stopping callback raises the termination signal inside
//! `gather`; the loop catches exactly that error kind and treats it as a
//! graceful stop rather than a failure.

use std::error::Error;
use std::result::Result;

use evaluator::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut evaluator = SerialEvaluator::builder(|job: RunningJob| {
        let step = job.get("step")?.as_f64().unwrap_or(0.0);
        // Improves for the first eight steps, then plateaus.
        Ok(Value::Float((step / 8.0).min(1.0)))
    })
    .callback(LoggerCallback::new())
    .callback(SearchEarlyStopping::new(5))
    .build();

    let mut step = 0_i32;
    loop {
        let config = Config::from([("step".to_string(), Value::Float(f64::from(step)))]);
        evaluator.submit(vec![config])?;

        match evaluator.gather().await {
            Ok(_) => step += 1,
            Err(e) if e.is_search_terminated() => {
                println!("search stopped after {} evaluations", step + 1);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
