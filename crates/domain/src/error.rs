use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Missing or oversized filter, malformed identifier.
    #[error("{0}")]
    Validation(String),

    /// The backing store was unreachable or rejected the query.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl QueryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        QueryError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, QueryError::Validation(_))
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        QueryError::Storage(err)
    }
}
