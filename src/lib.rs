#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Asynchronous job evaluation engine: submit units of work wrapping a
//! user computation over a parameter configuration, track each job's
//! lifecycle and timing, persist inputs/outputs/metadata in a
//! hierarchical search/job store, and observe creation and completion
//! through callbacks — one of which can cooperatively stop the whole
//! evaluation loop.
//!
//! # Getting Started
//!
//! ```
//! use evaluator::prelude::*;
//!
//! # async fn demo() -> evaluator::Result<()> {
//! let mut evaluator = SerialEvaluator::builder(|job: RunningJob| {
//!     let x = job.get("x")?.as_f64().unwrap_or(0.0);
//!     Ok(Value::Float(-(x - 3.0).powi(2)))
//! })
//! .callback(LoggerCallback::new())
//! .callback(SearchEarlyStopping::new(10))
//! .build();
//!
//! for x in 0..5 {
//!     let config = Config::from([("x".to_string(), Value::Float(f64::from(x)))]);
//!     evaluator.submit(vec![config])?;
//! }
//!
//! match evaluator.gather().await {
//!     Ok(jobs) => println!("{} jobs completed", jobs.len()),
//!     Err(e) if e.is_search_terminated() => println!("stopped early"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Job`] | One evaluation: identity, configuration snapshot, computation, outcome. |
//! | [`RunningJob`] | Restricted handle given to the computation while it executes. |
//! | [`Evaluator`] | Contract for executing jobs and driving callback notification. |
//! | [`SerialEvaluator`] | Reference implementation: strictly sequential execution. |
//! | [`Storage`] | Pluggable search/job persistence ([`MemoryStorage`] by default). |
//! | [`Callback`] | Observer of job launch/completion, optionally requesting termination. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on the public data model | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key evaluation points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod callback;
mod error;
pub mod evaluator;
mod job;
pub mod storage;
mod types;
mod value;

pub use callback::{
    Callback, LoggerCallback, ProfilingCallback, ProgressCallback, SearchEarlyStopping,
};
pub use error::{Error, Result, SearchTerminated};
pub use evaluator::{Evaluator, SerialEvaluator, SerialEvaluatorBuilder};
pub use job::{Job, RunFunction, RunningJob};
pub use storage::{JobRecord, MemoryStorage, Storage};
pub use types::{JobId, JobStatus, SearchId};
pub use value::{Config, FAILURE_MARKER, Value};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use evaluator::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        Callback, LoggerCallback, ProfilingCallback, ProgressCallback, SearchEarlyStopping,
    };
    pub use crate::error::{Error, Result, SearchTerminated};
    pub use crate::evaluator::{Evaluator, SerialEvaluator, SerialEvaluatorBuilder};
    pub use crate::job::{Job, RunFunction, RunningJob};
    pub use crate::storage::{JobRecord, MemoryStorage, Storage};
    pub use crate::types::{JobId, JobStatus, SearchId};
    pub use crate::value::{Config, FAILURE_MARKER, Value};
}
