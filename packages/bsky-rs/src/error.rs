use thiserror::Error;

/// Errors returned by [`crate::BskyClient`].
#[derive(Debug, Error)]
pub enum BskyError {
    /// Request could not be sent or the response body could not be read
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{endpoint} returned {status}: {}", .error.as_deref().unwrap_or("unknown error"))]
    Api {
        endpoint: &'static str,
        status: u16,
        error: Option<String>,
        message: Option<String>,
    },

    /// Success response did not match the expected shape
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, BskyError>;
