//! Hierarchical job storage.
//!
//! The [`Storage`] trait defines how job inputs, outputs, and metadata are
//! persisted under a two-level namespace: a *search* (one evaluation
//! session) containing *jobs* (one record each). Every
//! [`Evaluator`](crate::Evaluator) owns an `Arc<dyn Storage>` so storage
//! can be shared with the running jobs it hands out.
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStorage`] | Nested ordered maps behind a read-write lock (the default) |
//!
//! `MemoryStorage` gives every evaluator a uniform storage interface even
//! when no persistent backend is configured; its contents do not survive
//! the process.
//!
//! # Implementing a custom backend
//!
//! Implement [`Storage`] to plug in your own backend (e.g. a database).
//! Two rules carry across every implementation: ids are never reused
//! (search ids per instance, partial ids per search), and loads return
//! deep, independent copies — mutating a returned record must never change
//! what a later load returns.

mod memory;

use std::collections::BTreeMap;

pub use memory::MemoryStorage;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{JobId, SearchId};
use crate::value::{Config, Value};

/// The stored record of one job.
///
/// All slots exist as soon as the job is created: reads never fail because
/// a slot is absent, only because an id is unknown. The `input` slot holds
/// the map written by [`store_job_in`](Storage::store_job_in) (keys `args`
/// and `kwargs`), `output` the run function's result, `metadata` an open
/// mapping written one key at a time. Keys outside the three canonical
/// slots written via [`store_job`](Storage::store_job) land in `extra`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JobRecord {
    /// The `in` slot: args/kwargs snapshot of the submitted configuration.
    pub input: Option<Value>,
    /// The `out` slot: the evaluation result.
    pub output: Option<Value>,
    /// Open metadata mapping, independent of `input`/`output`.
    pub metadata: BTreeMap<String, Value>,
    /// Non-canonical keys written via [`store_job`](Storage::store_job).
    pub extra: BTreeMap<String, Value>,
}

/// Trait for persisting job inputs, outputs, and metadata, namespaced by
/// search then job.
///
/// All write operations are last-write-wins with no merge semantics, and
/// all operations taking an id fail with a lookup error when the id is
/// unknown — never a silent default. Implementations must be
/// `Send + Sync`; operations on different job ids may run concurrently,
/// while operations on the same job id must be serialized by the backend.
pub trait Storage: Send + Sync {
    /// Allocates a fresh search: its job counter starts at zero and its
    /// data mapping empty.
    fn create_new_search(&self) -> SearchId;

    /// Allocates the next job within `search_id` and initializes its
    /// record with all slots present and empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSearch`](crate::Error::UnknownSearch) for a
    /// search this instance never created.
    fn create_new_job(&self, search_id: SearchId) -> Result<JobId>;

    /// Overwrites one slot of the job's record: `"in"` and `"out"` write
    /// the canonical slots, `"metadata"` replaces the whole metadata
    /// mapping (map values only), and any other key is stored as an extra
    /// slot.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for unknown ids, and
    /// [`Error::InvalidMetadata`](crate::Error::InvalidMetadata) when the
    /// `"metadata"` slot is written with a non-map value.
    fn store_job(&self, job_id: JobId, key: &str, value: Value) -> Result<()>;

    /// Writes one entry into the job's metadata mapping.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for unknown ids.
    fn store_job_metadata(&self, job_id: JobId, key: &str, value: Value) -> Result<()>;

    /// Stores the input arguments of the executed job in the `in` slot, as
    /// a map with keys `args` and `kwargs`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for unknown ids.
    fn store_job_in(&self, job_id: JobId, args: Vec<Value>, kwargs: Config) -> Result<()> {
        let mut input = BTreeMap::new();
        input.insert("args".to_string(), Value::List(args));
        input.insert("kwargs".to_string(), Value::Map(kwargs));
        self.store_job(job_id, "in", Value::Map(input))
    }

    /// Stores the output value of the executed job in the `out` slot.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for unknown ids.
    fn store_job_out(&self, job_id: JobId, value: Value) -> Result<()> {
        self.store_job(job_id, "out", value)
    }

    /// Enumerates the identifiers of all recorded searches.
    ///
    /// Order is backend-defined; `MemoryStorage` happens to preserve
    /// creation order, which callers must not rely on across backends.
    fn load_all_search_ids(&self) -> Vec<SearchId>;

    /// Enumerates the identifiers of all jobs recorded in the search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSearch`](crate::Error::UnknownSearch) for a
    /// search this instance never created.
    fn load_all_job_ids(&self, search_id: SearchId) -> Result<Vec<JobId>>;

    /// Loads every record of a search, keyed by partial id.
    ///
    /// The returned mapping is a deep, independent copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSearch`](crate::Error::UnknownSearch) for a
    /// search this instance never created.
    fn load_search(&self, search_id: SearchId) -> Result<BTreeMap<u64, JobRecord>>;

    /// Loads one job's record as a deep, independent copy.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for unknown ids.
    fn load_job(&self, job_id: JobId) -> Result<JobRecord>;
}
