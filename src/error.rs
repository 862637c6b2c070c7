use thiserror::Error;

/// Failures surfaced by a search provider adapter.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider rate limit reached")]
    RateLimited,
    #[error("search provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("search provider reported an error: {0}")]
    Provider(String),
    #[error("request to search provider failed")]
    Transport(#[from] reqwest::Error),
    #[error("malformed search provider payload")]
    Malformed(#[from] serde_json::Error),
}

impl SearchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SearchError::RateLimited)
    }
}

/// Failures while turning a candidate into a stored lead.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("invalid lead: {0}")]
    Validation(String),
    #[error("lead persistence failed")]
    Persistence(#[from] sqlx::Error),
}
