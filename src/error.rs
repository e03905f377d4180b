use crate::types::{JobId, SearchId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a storage operation names a search id that was never
    /// created on that storage instance.
    #[error("unknown search id: {0}")]
    UnknownSearch(SearchId),

    /// Returned when a storage operation names a job id that was never
    /// created within its search.
    #[error("unknown job id: {0}")]
    UnknownJob(JobId),

    /// Returned when text does not parse as a `search.partial` job id.
    #[error("malformed job id: {0:?}")]
    MalformedJobId(String),

    /// Returned when the `metadata` slot of a job record is written with a
    /// non-map value.
    #[error("metadata slot expects a map value")]
    InvalidMetadata,

    /// Returned when a running job looks up a parameter that is not part of
    /// its configuration.
    #[error("missing parameter: {0:?}")]
    MissingParameter(String),

    /// Returned by a run function that crashed (as opposed to one that
    /// returned an encoded failure value).
    #[error("run function failed: {0}")]
    RunFailed(String),

    /// Raised through a callback to request a graceful stop of the
    /// surrounding evaluation loop. Not a failure.
    #[error("search terminated")]
    SearchTerminated,
}

impl Error {
    /// Returns `true` for the termination signal.
    ///
    /// A search loop consuming an [`Evaluator`](crate::Evaluator) should
    /// catch exactly this kind at its boundary and treat it as a graceful
    /// stop rather than an unhandled failure.
    #[must_use]
    pub fn is_search_terminated(&self) -> bool {
        matches!(self, Error::SearchTerminated)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Convenience type for signalling termination from a callback's
/// [`on_done`](crate::Callback::on_done) hook.
///
/// Implements `Into<Error>` so the evaluator can propagate it with `?`
/// without converting it into an ordinary failure.
///
/// # Examples
///
/// ```
/// use evaluator::{Error, SearchTerminated};
///
/// fn hook_that_stops() -> Result<(), Error> {
///     Err(SearchTerminated)?
/// }
///
/// assert!(hook_that_stops().unwrap_err().is_search_terminated());
/// ```
#[derive(Debug)]
pub struct SearchTerminated;

impl core::fmt::Display for SearchTerminated {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "search terminated")
    }
}

impl From<SearchTerminated> for Error {
    fn from(_: SearchTerminated) -> Self {
        Error::SearchTerminated
    }
}
