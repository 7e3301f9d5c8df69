use thiserror::Error;

/// Errors returned by the news API client.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The news API answered with a non-2xx status. Carries the status and
    /// response body for diagnostics in the job log.
    #[error("news API returned {status}: {body}")]
    SourceUnavailable { status: u16, body: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
