use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("missing request body for {0}")]
    MissingBody(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid resource id: {0}")]
    InvalidId(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Duplicate resource id: {0}")]
    DuplicateId(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),
}

impl RestError {
    /// True for malformed invocations (the caller's fault), false for collaborator failures.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::MissingBody(_) | Self::InvalidBody(_) | Self::InvalidId(_))
    }
}

impl From<std::io::Error> for RestError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
