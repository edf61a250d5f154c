/// Failure reading raw memory statistics from the operating system.
///
/// Carries the name of the failing query; the monitor loop only logs it.
/// Both kinds degrade the same way, only the log level differs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("kernel query `{query}` failed: {reason}")]
    KernelQueryFailed { query: &'static str, reason: String },

    /// The running kernel has no counterpart for this query; retrying cannot succeed
    #[error("kernel query `{query}` is not available on this platform")]
    Unsupported { query: &'static str },
}

impl SampleError {
    pub(crate) fn kernel<S: Into<String>>(query: &'static str, reason: S) -> Self {
        SampleError::KernelQueryFailed { query, reason: reason.into() }
    }

    pub(crate) fn unsupported(query: &'static str) -> Self {
        SampleError::Unsupported { query }
    }

    /// Name of the kernel facility that failed
    pub fn query(&self) -> &'static str {
        match self {
            SampleError::KernelQueryFailed { query, .. } | SampleError::Unsupported { query } => query,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, SampleError::Unsupported { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error("Invalid argument: {context} (got {value})")]
    InvalidArgument { context: String, value: String },

    #[error("Monitor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn invalid_argument<C: Into<String>, V: Into<String>>(context: C, value: V) -> Self {
        Error::InvalidArgument { context: context.into(), value: value.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single kernel query
pub type SampleResult<T> = std::result::Result<T, SampleError>;
