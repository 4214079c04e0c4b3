use thiserror::Error;

/// Errors surfaced by the search pipeline to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Blank query: answered with an empty result, never sent upstream.
    #[error("Search query is empty")]
    EmptyQuery,

    /// "Load more" was requested but no continuation token is held.
    #[error("No continuation token is held; start a fresh search instead")]
    ContinuationWithoutToken,

    /// A response arrived for a request that has since been superseded.
    #[error("Discarded stale response for request #{received} (latest is #{latest})")]
    StaleResponse { received: u64, latest: u64 },
}

/// Every way the upstream provider can fail to give us usable data.
///
/// All variants are recovered locally by the fallback generator; the
/// distinction only matters for logging and the advisory shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("No API key configured for the job search provider")]
    Unconfigured,

    #[error("Request to job search provider failed: {0}")]
    Transport(String),

    #[error("Job search provider returned HTTP {0}")]
    Status(u16),

    #[error("Job search provider returned an error: {0}")]
    ErrorPayload(String),

    #[error("Job search provider reported a fully empty result set")]
    FullyEmpty,

    #[error("Job search provider returned no listings")]
    NoResults,

    #[error("Failed to parse job search provider response: {0}")]
    Parse(String),
}

impl UpstreamError {
    /// True when the provider could not be reached or understood at all,
    /// as opposed to answering "nothing found".
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            UpstreamError::Unconfigured
                | UpstreamError::Transport(_)
                | UpstreamError::Status(_)
                | UpstreamError::Parse(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Unconfigured => "unconfigured",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
            UpstreamError::ErrorPayload(_) => "error_payload",
            UpstreamError::FullyEmpty => "fully_empty",
            UpstreamError::NoResults => "no_results",
            UpstreamError::Parse(_) => "parse",
        }
    }

    /// User-facing notice attached to a fallback result.
    pub fn advisory(&self) -> &'static str {
        if self.is_connectivity() {
            "We couldn't connect to the job search service. Showing sample listings instead."
        } else {
            "We couldn't find jobs matching your search. Showing similar positions instead."
        }
    }
}
