use thiserror::Error;

/// Failures surfaced by the client-side calls into the managed backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The endpoint could not be reached or the exchange broke off.
    #[error("Network error: {0}")]
    Transport(String),

    /// The endpoint answered but reported an application-level failure.
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    ConversionFailed(String),

    #[error("Conversion timed out after {seconds} seconds")]
    ConversionTimeout { seconds: u64 },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid response payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
