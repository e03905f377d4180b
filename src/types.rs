//! Core types for the evaluation engine.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The state of a job in its lifecycle.
///
/// States are ordered: `Ready < Running < Done`. A job only ever moves
/// forward through them, and never skips `Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JobStatus {
    /// The job has been created and is waiting to run.
    Ready,
    /// The job's run function is executing.
    Running,
    /// The job has a result.
    Done,
}

/// Identifier of one search session, the top-level storage namespace.
///
/// Search ids are allocated by a [`Storage`](crate::Storage) instance from
/// an internally incrementing counter and are never reused within that
/// instance's lifetime. The displayed form is the stringified counter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchId(u64);

impl SearchId {
    /// Wraps a raw counter value.
    ///
    /// Intended for storage backend implementors; callers obtain ids from
    /// [`create_new_search`](crate::Storage::create_new_search).
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one job, composite over its search.
///
/// The displayed form is `"{search_id}.{partial_id}"` where the partial id
/// is a per-search, zero-based incrementing counter. Ids are allocated by
/// [`create_new_job`](crate::Storage::create_new_job); callers never build
/// them by hand. Parsing splits on the first `.` and rejects anything that
/// does not decompose into two non-negative integers.
///
/// # Examples
///
/// ```
/// use evaluator::{JobId, SearchId};
///
/// let id: JobId = "3.14".parse().unwrap();
/// assert_eq!(id.search_id(), SearchId::new(3));
/// assert_eq!(id.partial_id(), 14);
/// assert_eq!(id.to_string(), "3.14");
///
/// assert!("nodot".parse::<JobId>().is_err());
/// assert!("1.2.3".parse::<JobId>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JobId {
    search: SearchId,
    partial: u64,
}

impl JobId {
    /// Builds a composite id from its components.
    ///
    /// Intended for storage backend implementors.
    #[must_use]
    pub fn new(search: SearchId, partial: u64) -> Self {
        Self { search, partial }
    }

    /// Returns the id of the search this job belongs to.
    #[must_use]
    pub fn search_id(&self) -> SearchId {
        self.search
    }

    /// Returns the per-search partial id.
    #[must_use]
    pub fn partial_id(&self) -> u64 {
        self.partial
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.search, self.partial)
    }
}

impl FromStr for JobId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedJobId(s.to_string());
        let (search, partial) = s.split_once('.').ok_or_else(malformed)?;
        let search: u64 = search.parse().map_err(|_| malformed())?;
        let partial: u64 = partial.parse().map_err(|_| malformed())?;
        Ok(JobId::new(SearchId::new(search), partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_ordered() {
        assert!(JobStatus::Ready < JobStatus::Running);
        assert!(JobStatus::Running < JobStatus::Done);
    }

    #[test]
    fn job_id_round_trips_through_display() {
        let id = JobId::new(SearchId::new(7), 0);
        assert_eq!(id.to_string(), "7.0");
        assert_eq!("7.0".parse::<JobId>().unwrap(), id);
    }

    #[test]
    fn malformed_job_ids_are_rejected() {
        for text in ["", "7", "a.0", "0.b", "1.2.3", "-1.0"] {
            assert!(
                text.parse::<JobId>().is_err(),
                "{text:?} should not parse"
            );
        }
    }
}
