use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("Connection error: {0}")]
    NetworkFailure(String),
    #[error("Generation endpoint returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Coarse classification used by front-ends to pick a status code or message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Upstream,
    Malformed,
    Config,
}

impl ParleyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParleyError::NetworkFailure(_) => ErrorKind::Network,
            ParleyError::Upstream { .. } => ErrorKind::Upstream,
            ParleyError::MalformedResponse(_) | ParleyError::Serde(_) => ErrorKind::Malformed,
            ParleyError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Status code carried by an upstream failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ParleyError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
