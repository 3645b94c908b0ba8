use thiserror::Error;

/// Convenient result alias for the waymap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure while talking to the routing service.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The routing service answered with a non-success status.
    #[error("routing service returned {status} for {endpoint}{}", format_reason(.reason))]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        reason: Option<String>,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A route was requested before both start and goal were placed.
    #[error("select a start and a goal on the map first ({markers} of 2 placed)")]
    IncompleteSelection { markers: usize },

    /// Raised when configuration values cannot be used.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures caused by the remote service or the network.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::UnexpectedStatus { .. } | Error::Decode { .. }
        )
    }
}

fn format_reason(reason: &Option<String>) -> String {
    match reason.as_deref() {
        Some(reason) if !reason.trim().is_empty() => format!(": {}", reason.trim()),
        _ => String::new(),
    }
}
