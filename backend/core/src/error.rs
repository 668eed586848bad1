use thiserror::Error;

/// Top-level error type for the ZeoRAG client.
#[derive(Debug, Error)]
pub enum ZeoError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("a query is already in flight for this session")]
    QueryInFlight,

    #[error("no session selected")]
    NoActiveSession,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ZeoError {
    pub fn validation(message: impl Into<String>) -> Self {
        ZeoError::Validation(message.into())
    }

    /// True for errors raised before any network call was attempted.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            ZeoError::Validation(_) | ZeoError::QueryInFlight | ZeoError::NoActiveSession
        )
    }
}
