/// Domain-specific error types for greensearch
///
/// The cascade recovers from most of these internally; only terminal-stage
/// storage failures ever reach the HTTP caller, and then as a generic flag.

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stage timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for SearchError {
    fn from(e: sqlx::Error) -> Self {
        SearchError::Storage(e.to_string())
    }
}
